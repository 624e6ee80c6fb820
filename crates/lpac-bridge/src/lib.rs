//! Run lpac over stdio, relaying its APDU traffic to a card transport
//!
//! [lpac](https://github.com/estkme-group/lpac) implements the eSIM Local
//! Profile Assistant. Started with `LPAC_APDU=stdio` it does not touch a card
//! reader itself; instead it prints JSON requests on stdout and waits for the
//! answers on stdin. This crate is the host side of that conversation.
//!
//! # Key Features
//!
//! - **Exclusive transport**: a session holds the reader's lock from spawn to
//!   return, so two commands never interleave APDUs
//! - **Synchronous relay**: each `transmit` request is answered before the next
//!   line of output is read
//! - **Typed results**: the terminal `lpa` payload deserializes into any
//!   `serde` type
//! - **Progress**: download steps are reported with readable labels, and the
//!   callback may abort the command by returning an error
//! - **Cancellation**: [`Cmder::terminate`] interrupts a running command
//!
//! # Architecture
//!
//! 1. **Protocol Layer** (`lpac-protocol`): envelope and payload types
//! 2. **Transport Layer** (`lpac-transport`): `Apdu` trait, process spawning,
//!    line framing
//! 3. **Bridge Layer** (this crate): [`Cmder`] supervisor and message handlers
//!
//! # Usage Example
//!
//! ```ignore
//! use lpac_bridge::{BridgeConfig, Cmder};
//! use std::sync::Arc;
//! use tokio::sync::Mutex;
//!
//! let reader = Arc::new(Mutex::new(MyReader::open()?));
//! let cmder = Cmder::new(reader, BridgeConfig::from_env()?);
//!
//! let info: serde_json::Value = cmder.query(["chip", "info"], None).await?;
//! println!("{info}");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod cmder;
pub mod config;
pub mod error;
pub mod handlers;
pub mod session;
pub mod testing;

// Re-export commonly used types
pub use cmder::{Cmder, Terminator};
pub use config::BridgeConfig;
pub use error::{BridgeError, ProgressError, Result};
pub use session::{ProgressCallback, Session};

pub use lpac_protocol::{HUMAN_READABLE_STEPS, human_readable_step};
pub use lpac_transport::{Apdu, TransportError};
