//! HTTP + SSE transport over a real socket.

use std::sync::Arc;
use std::time::Duration;

use census_api::MockCensusClient;
use census_mcp::{sse, ToolHandler};
use tokio::net::TcpListener;

async fn start() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(ToolHandler::new(Arc::new(MockCensusClient::new())));

    tokio::spawn(sse::serve_listener(handler, listener));
    format!("http://{}", addr)
}

/// Read from the event stream until `needle` shows up.
async fn read_until(response: &mut reqwest::Response, buffer: &mut String, needle: &str) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !buffer.contains(needle) {
            let chunk = response.chunk().await.unwrap().expect("stream ended");
            buffer.push_str(&String::from_utf8_lossy(&chunk));
        }
    })
    .await
    .expect("timed out waiting for event");
}

#[tokio::test]
async fn test_health() {
    let base = start().await;

    let body: serde_json::Value = reqwest::get(format!("{}/health", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body, serde_json::json!({"status": "ok"}));
}

#[tokio::test]
async fn test_session_round_trip() {
    let base = start().await;
    let client = reqwest::Client::new();

    let mut stream = client.get(format!("{}/sse", base)).send().await.unwrap();
    assert!(stream.status().is_success());

    let mut buffer = String::new();
    read_until(&mut stream, &mut buffer, "sessionId=").await;
    read_until(&mut stream, &mut buffer, "\n\n").await;
    assert!(buffer.contains("event: endpoint"));

    let endpoint = buffer
        .lines()
        .find_map(|line| line.strip_prefix("data: "))
        .unwrap()
        .trim()
        .to_string();
    assert!(endpoint.starts_with("/message?sessionId="));

    let status = client
        .post(format!("{}{}", base, endpoint))
        .body(r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"search_state_by_name","arguments":{"name":"texas"}}}"#)
        .send()
        .await
        .unwrap()
        .status();
    assert_eq!(status, reqwest::StatusCode::ACCEPTED);

    read_until(&mut stream, &mut buffer, "Texas (state 48)").await;
    assert!(buffer.contains("event: message"));
}

#[tokio::test]
async fn test_unknown_session() {
    let base = start().await;

    let status = reqwest::Client::new()
        .post(format!("{}/message?sessionId=nope", base))
        .body(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#)
        .send()
        .await
        .unwrap()
        .status();

    assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
}
