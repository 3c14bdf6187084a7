//! HTTP + Server-Sent Events transport.
//!
//! - `GET /sse` opens a session. The first event (`endpoint`) carries the
//!   URL the client must POST its messages to.
//! - `POST /message?sessionId=<id>` accepts one JSON-RPC message, answers
//!   `202 Accepted` and delivers the response as a `message` event on the
//!   session's stream.
//! - `GET /health` is a liveness probe.
//!
//! A session ends when its event stream is dropped.

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use census_core::{Error, Result};
use futures::channel::mpsc::{self, UnboundedSender};
use futures::{stream, Stream, StreamExt};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::handlers::ToolHandler;
use crate::protocol::{parse_message, JsonRpcResponse, RequestId};
use crate::server::McpServer;

/// One connected client.
struct Session {
    events: UnboundedSender<Event>,
    server: Mutex<McpServer>,
}

type Sessions = RwLock<HashMap<String, Arc<Session>>>;

/// Shared state of the HTTP transport.
struct AppState {
    handler: Arc<ToolHandler>,
    sessions: Sessions,
}

impl AppState {
    fn session(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions
            .read()
            .ok()
            .and_then(|sessions| sessions.get(id).cloned())
    }

    fn remove_session(&self, id: &str) {
        if let Ok(mut sessions) = self.sessions.write() {
            if sessions.remove(id).is_some() {
                info!(session = id, "SSE session closed");
            }
        }
    }
}

/// Removes its session once the event stream holding it is dropped.
struct SessionGuard {
    id: String,
    state: Arc<AppState>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.state.remove_session(&self.id);
    }
}

#[derive(Debug, Deserialize)]
struct MessageQuery {
    #[serde(rename = "sessionId")]
    session_id: String,
}

/// Build the router for the SSE transport.
pub fn router(handler: Arc<ToolHandler>) -> Router {
    let state = Arc::new(AppState {
        handler,
        sessions: RwLock::new(HashMap::new()),
    });

    Router::new()
        .route("/sse", get(open_stream))
        .route("/message", post(post_message))
        .route("/health", get(health_check))
        .with_state(state)
}

/// Bind to `addr` and serve until the process stops.
pub async fn serve(handler: Arc<ToolHandler>, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Other(e.into()))?;
    serve_listener(handler, listener).await
}

/// Serve on an already bound listener.
pub async fn serve_listener(handler: Arc<ToolHandler>, listener: TcpListener) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(address = %addr, "SSE server listening");
    }

    axum::serve(listener, router(handler))
        .await
        .map_err(|e| Error::Other(e.into()))
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn open_stream(
    State(state): State<Arc<AppState>>,
) -> std::result::Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>, StatusCode>
{
    let id = Uuid::new_v4().to_string();
    let (events, receiver) = mpsc::unbounded();

    let session = Arc::new(Session {
        events,
        server: Mutex::new(McpServer::new(state.handler.clone())),
    });
    match state.sessions.write() {
        Ok(mut sessions) => {
            sessions.insert(id.clone(), session);
        }
        Err(_) => {
            warn!(session = id.as_str(), "Session registry unavailable, refusing stream");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
    info!(session = id.as_str(), "SSE session opened");

    let endpoint = Event::default()
        .event("endpoint")
        .data(format!("/message?sessionId={}", id));
    let guard = SessionGuard {
        id,
        state: state.clone(),
    };

    let events = stream::once(async move { endpoint })
        .chain(receiver)
        .map(move |event| {
            let _ = &guard;
            Ok::<_, Infallible>(event)
        });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

async fn post_message(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MessageQuery>,
    body: String,
) -> StatusCode {
    let Some(session) = state.session(&query.session_id) else {
        warn!(session = query.session_id.as_str(), "Message for unknown session");
        return StatusCode::NOT_FOUND;
    };

    debug!(session = query.session_id.as_str(), message = body.as_str(), "Received");

    let response = match parse_message(&body) {
        Ok(message) => session.server.lock().await.handle_message(message).await,
        Err(e) => Some(JsonRpcResponse::error(RequestId::Null, e)),
    };

    if let Some(response) = response {
        let event = match serde_json::to_string(&response) {
            Ok(json) => Event::default().event("message").data(json),
            Err(e) => {
                warn!(error = %e, "Failed to serialize response");
                return StatusCode::INTERNAL_SERVER_ERROR;
            }
        };

        if session.events.unbounded_send(event).is_err() {
            state.remove_session(&query.session_id);
            return StatusCode::NOT_FOUND;
        }
    }

    StatusCode::ACCEPTED
}
