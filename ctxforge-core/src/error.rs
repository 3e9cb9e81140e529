//! Error types for ctxforge operations

/// Result type for ctxforge operations
pub type Result<T> = std::result::Result<T, CtxforgeError>;

/// Error types for the ctxforge server
///
/// Command-level failures (unknown command, unknown window, bad arguments)
/// never surface here; the dispatcher converts them into error envelopes.
/// This type covers the transport and configuration edges.
#[derive(Debug, thiserror::Error)]
pub enum CtxforgeError {
    /// Transport-level I/O or framing error
    #[error("Transport error: {0}")]
    Transport(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for CtxforgeError {
    fn from(s: String) -> Self {
        CtxforgeError::Other(s)
    }
}

impl From<&str> for CtxforgeError {
    fn from(s: &str) -> Self {
        CtxforgeError::Other(s.to_string())
    }
}

impl From<anyhow::Error> for CtxforgeError {
    fn from(err: anyhow::Error) -> Self {
        CtxforgeError::Other(err.to_string())
    }
}
