//! Error types for protocol operations

use thiserror::Error;

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors that can occur while decoding lpac messages
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A line or payload was not valid JSON for the expected shape
    #[error("malformed lpac message: {0}")]
    Json(#[from] serde_json::Error),

    /// An APDU parameter was not a valid hex string
    #[error("invalid APDU hex: {0}")]
    Hex(#[from] hex::FromHexError),

    /// An APDU function that carries bytes arrived without them
    #[error("missing parameter for APDU function `{0}`")]
    MissingParam(String),
}
