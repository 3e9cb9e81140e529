//! MCP Transport Implementations
//!
//! Transports handle the I/O for MCP communication.

use super::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId};
use crate::error::CtxforgeError;
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};

/// Transport trait for MCP communication
#[async_trait]
pub trait Transport: Send + Sync {
    /// Receive a request from the transport
    async fn receive(&mut self) -> crate::error::Result<Option<JsonRpcRequest>>;

    /// Send a response through the transport
    async fn send(&mut self, response: JsonRpcResponse) -> crate::error::Result<()>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for &mut T {
    async fn receive(&mut self) -> crate::error::Result<Option<JsonRpcRequest>> {
        (**self).receive().await
    }

    async fn send(&mut self, response: JsonRpcResponse) -> crate::error::Result<()> {
        (**self).send(response).await
    }
}

/// Stdio transport (used by Claude Desktop and other MCP clients)
///
/// Messages are sent as newline-delimited JSON on the reader/writer pair,
/// which defaults to stdin/stdout. Logging must go to stderr or it corrupts
/// the stream.
pub struct StdioTransport<R = BufReader<Stdin>, W = Stdout> {
    reader: R,
    writer: W,
}

impl StdioTransport {
    /// Create a transport over stdin/stdout
    pub fn new() -> Self {
        Self {
            reader: BufReader::new(tokio::io::stdin()),
            writer: tokio::io::stdout(),
        }
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, W> StdioTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send + Sync,
    W: AsyncWrite + Unpin + Send + Sync,
{
    /// Create a transport over an arbitrary reader/writer pair
    pub fn from_parts(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

#[async_trait]
impl<R, W> Transport for StdioTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send + Sync,
    W: AsyncWrite + Unpin + Send + Sync,
{
    async fn receive(&mut self) -> crate::error::Result<Option<JsonRpcRequest>> {
        loop {
            let mut line = String::new();

            match self.reader.read_line(&mut line).await {
                Ok(0) => return Ok(None), // EOF
                Ok(_) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    match serde_json::from_str(trimmed) {
                        Ok(request) => return Ok(Some(request)),
                        Err(e) => {
                            // Report the parse error on the wire, then keep
                            // reading; a bad line must not kill the session.
                            let error_response = JsonRpcResponse::error(
                                RequestId::Null,
                                JsonRpcError::parse_error(),
                            );
                            self.send(error_response).await?;
                            tracing::warn!("discarding unparseable request line: {}", e);
                        }
                    }
                }
                Err(e) => {
                    return Err(CtxforgeError::Transport(format!(
                        "Failed to read request: {}",
                        e
                    )));
                }
            }
        }
    }

    async fn send(&mut self, response: JsonRpcResponse) -> crate::error::Result<()> {
        let json = serde_json::to_string(&response).map_err(|e| {
            CtxforgeError::Transport(format!("Failed to serialize response: {}", e))
        })?;

        self.writer
            .write_all(format!("{}\n", json).as_bytes())
            .await
            .map_err(|e| CtxforgeError::Transport(format!("Failed to write response: {}", e)))?;

        self.writer
            .flush()
            .await
            .map_err(|e| CtxforgeError::Transport(format!("Failed to flush response: {}", e)))?;

        Ok(())
    }
}

/// In-memory transport for testing
pub struct MemoryTransport {
    requests: std::collections::VecDeque<JsonRpcRequest>,
    responses: Vec<JsonRpcResponse>,
}

impl MemoryTransport {
    /// Create a new memory transport
    pub fn new() -> Self {
        Self {
            requests: std::collections::VecDeque::new(),
            responses: Vec::new(),
        }
    }

    /// Add a request to be received
    pub fn push_request(&mut self, request: JsonRpcRequest) {
        self.requests.push_back(request);
    }

    /// Get all sent responses
    pub fn responses(&self) -> &[JsonRpcResponse] {
        &self.responses
    }

    /// Take the last response
    pub fn pop_response(&mut self) -> Option<JsonRpcResponse> {
        self.responses.pop()
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn receive(&mut self) -> crate::error::Result<Option<JsonRpcRequest>> {
        Ok(self.requests.pop_front())
    }

    async fn send(&mut self, response: JsonRpcResponse) -> crate::error::Result<()> {
        self.responses.push(response);
        Ok(())
    }
}
