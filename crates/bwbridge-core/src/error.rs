//! Error types for bwbridge

use thiserror::Error;

/// Result type for bwbridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// bwbridge error types
#[derive(Debug, Error)]
pub enum BridgeError {
    /// A protocol line violated the expected shape. Fatal to the session,
    /// never to the server process.
    #[error("malformed protocol line: {0}")]
    MalformedProtocol(String),

    /// The engine closed or reset the connection. A normal session end.
    #[error("engine disconnected")]
    Disconnect,

    /// Transport-level I/O failure. Treated like a disconnect for cleanup.
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog file could not be read or parsed.
    #[error("catalog error: {0}")]
    Catalog(String),
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::Catalog(err.to_string())
    }
}
