//! Subprocess transport for lpac
//!
//! Spawns lpac and exchanges newline-delimited JSON with it over
//! stdin/stdout.

pub mod platform;
pub mod process;
pub mod stdio;

pub use process::{ProcessConfig, ProcessHandle, SpawnedProcess};
pub use stdio::{LineReader, LineWriter};
