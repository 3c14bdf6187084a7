//! Stdio transport for MCP JSON-RPC communication.
//!
//! One JSON document per line on stdin; responses are written the same way
//! to stdout. Nothing else may be written to stdout while serving.

use std::io::{self, BufRead, Write};

use tracing::{debug, warn};

use crate::protocol::{parse_message, IncomingMessage, JsonRpcError, JsonRpcResponse};

/// What was read from the transport.
#[derive(Debug)]
pub enum ReadOutcome {
    /// A well-formed message.
    Message(IncomingMessage),
    /// A line that is not a JSON-RPC message; answer with this error.
    Invalid(JsonRpcError),
    /// A blank line.
    Empty,
    /// End of input.
    Eof,
}

/// Transport for reading/writing JSON-RPC messages.
pub struct StdioTransport {
    reader: Box<dyn BufRead + Send>,
    writer: Box<dyn Write + Send>,
}

impl StdioTransport {
    /// Create a transport using stdin/stdout.
    pub fn stdio() -> Self {
        Self {
            reader: Box::new(io::BufReader::new(io::stdin())),
            writer: Box::new(io::stdout()),
        }
    }

    /// Create a transport with a custom reader and writer.
    pub fn new(reader: Box<dyn BufRead + Send>, writer: Box<dyn Write + Send>) -> Self {
        Self { reader, writer }
    }

    /// Read a single line and parse it.
    pub fn read_message(&mut self) -> io::Result<ReadOutcome> {
        let mut line = String::new();

        if self.reader.read_line(&mut line)? == 0 {
            return Ok(ReadOutcome::Eof);
        }

        let line = line.trim();
        if line.is_empty() {
            return Ok(ReadOutcome::Empty);
        }

        debug!(message = line, "Received");

        match parse_message(line) {
            Ok(message) => Ok(ReadOutcome::Message(message)),
            Err(e) => {
                warn!(error = e.message.as_str(), "Failed to parse message");
                Ok(ReadOutcome::Invalid(e))
            }
        }
    }

    /// Write a JSON-RPC response as one line.
    pub fn write_response(&mut self, response: &JsonRpcResponse) -> io::Result<()> {
        let json = serde_json::to_string(response).map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("Serialization error: {}", e))
        })?;

        debug!(message = json.as_str(), "Sending");

        writeln!(self.writer, "{}", json)?;
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::RequestId;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    struct SharedWriter(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn transport_for(input: &str) -> StdioTransport {
        StdioTransport::new(
            Box::new(Cursor::new(input.to_string())),
            Box::new(Vec::new()),
        )
    }

    #[test]
    fn test_read_request() {
        let mut transport =
            transport_for("{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"tools/list\"}\n");

        match transport.read_message().unwrap() {
            ReadOutcome::Message(IncomingMessage::Request(req)) => {
                assert_eq!(req.method, "tools/list");
                assert_eq!(req.id, RequestId::Number(1));
            }
            other => panic!("Expected request, got {:?}", other),
        }
    }

    #[test]
    fn test_read_blank_invalid_and_eof() {
        let mut transport = transport_for("\n{oops\n");

        assert!(matches!(transport.read_message().unwrap(), ReadOutcome::Empty));
        match transport.read_message().unwrap() {
            ReadOutcome::Invalid(err) => assert_eq!(err.code, JsonRpcError::PARSE_ERROR),
            other => panic!("Expected invalid, got {:?}", other),
        }
        assert!(matches!(transport.read_message().unwrap(), ReadOutcome::Eof));
    }

    #[test]
    fn test_write_response_is_one_line() {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let mut transport = StdioTransport::new(
            Box::new(Cursor::new(Vec::new())),
            Box::new(SharedWriter(buffer.clone())),
        );

        let response =
            JsonRpcResponse::success(RequestId::Number(7), serde_json::json!({"ok": true}));
        transport.write_response(&response).unwrap();

        let output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(output.ends_with('\n'));
        assert_eq!(output.lines().count(), 1);
        assert!(output.contains("\"id\":7"));
    }
}
