//! APDU transport seam and lpac subprocess plumbing
//!
//! This crate holds the two I/O boundaries of the bridge:
//!
//! - **[`Apdu`] trait**: the hardware side, anything able to exchange one
//!   command APDU for one response APDU
//! - **Subprocess**: spawning lpac, framing JSON lines over its stdin/stdout,
//!   and the platform specific bits of signalling it
//!
//! Exclusive use of a card reader is expressed by wrapping the transport in a
//! `tokio::sync::Mutex`; holding the guard is holding the reader.
//!
//! # Usage
//!
//! ```ignore
//! use lpac_transport::{ProcessConfig, ProcessHandle};
//!
//! let config = ProcessConfig::new("/var/lib/lpac/lpac")
//!     .with_arg("chip")
//!     .with_arg("info")
//!     .with_env("LPAC_APDU", "stdio");
//! let mut spawned = ProcessHandle::spawn(config).await?;
//! while let Some(line) = spawned.stdout.next_line().await? {
//!     println!("{line}");
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod subprocess;
pub mod traits;

// Re-export commonly used types
pub use error::{Result, TransportError};
pub use subprocess::{LineReader, LineWriter, ProcessConfig, ProcessHandle, SpawnedProcess};
pub use traits::Apdu;
