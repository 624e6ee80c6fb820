//! Wire types for the lpac stdio protocol
//!
//! `lpac` running with `LPAC_APDU=stdio` talks to its host over standard
//! input/output using newline-delimited JSON. Every line it prints is an
//! [`Envelope`] carrying one of three kinds of message:
//!
//! - **apdu**: a request for the host to perform a card operation ([`ApduRequest`])
//! - **lpa**: the terminal result of the command ([`LpaResponse`])
//! - **progress**: an intermediate step notification ([`ProgressUpdate`])
//!
//! The only thing the host ever writes back is an [`ApduReply`].
//!
//! # Design Principles
//!
//! - **Zero I/O**: All types are pure data structures
//! - **Lazy payloads**: An envelope keeps its payload as raw JSON so a consumer
//!   only pays for decoding the kinds it actually handles
//!
//! # Usage
//!
//! ```
//! use lpac_protocol::{Envelope, MessageKind};
//!
//! let line = r#"{"type":"progress","payload":{"message":"es10b_prepare_download"}}"#;
//! let envelope = Envelope::decode(line).unwrap();
//! assert_eq!(envelope.kind, MessageKind::Progress);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod apdu;
pub mod envelope;
pub mod error;
pub mod lpa;
pub mod progress;

// Re-export commonly used types at crate level
pub use apdu::{ApduFunction, ApduReply, ApduRequest};
pub use envelope::{Envelope, MessageKind};
pub use error::{ProtocolError, Result};
pub use lpa::LpaResponse;
pub use progress::{HUMAN_READABLE_STEPS, ProgressUpdate, human_readable_step};
