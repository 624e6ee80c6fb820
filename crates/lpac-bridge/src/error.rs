//! Error types for the bridge
//!
//! Every way a command can end badly maps to one variant here. Only
//! [`BridgeError::Lpa`] is a failure reported by lpac itself; the rest are
//! failures of the plumbing around it.

use lpac_protocol::ProtocolError;
use lpac_transport::TransportError;
use thiserror::Error;

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Error a progress callback returns to abort the command
pub type ProgressError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can end an lpac session
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The subprocess could not be started
    #[error("failed to start lpac: {0}")]
    Spawn(#[source] TransportError),

    /// lpac printed something that is not a valid protocol message
    #[error("lpac protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The card transport or a pipe to lpac failed
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// lpac finished with a nonzero status code
    ///
    /// Displays as the bare message so callers can show it unchanged.
    #[error("{message}")]
    Lpa {
        /// Status code reported by lpac
        code: i64,
        /// Detail string, or the status message when no detail was given
        message: String,
    },

    /// The result payload did not fit the caller's destination type
    #[error("failed to decode lpac result: {0}")]
    Destination(#[source] serde_json::Error),

    /// The progress callback asked to stop
    #[error("progress callback aborted: {0}")]
    Progress(#[source] ProgressError),

    /// A typed query ended without result data
    #[error("lpac exited without a result")]
    MissingResponse,

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl BridgeError {
    /// Status code for failures reported by lpac itself
    pub fn lpa_code(&self) -> Option<i64> {
        match self {
            Self::Lpa { code, .. } => Some(*code),
            _ => None,
        }
    }
}
