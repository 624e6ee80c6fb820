//! Testing utilities
//!
//! Provides a scriptable card transport so sessions can be exercised without a
//! reader.

use async_trait::async_trait;
use lpac_transport::{Apdu, TransportError};
use std::collections::VecDeque;

/// Status word returned when no response has been queued
pub const SW_OK: [u8; 2] = [0x90, 0x00];

/// Mock card transport
///
/// Answers `transmit` from a queue of scripted outcomes, falling back to a
/// bare `9000` once the queue is empty, and records every command it was sent.
#[derive(Debug, Default)]
pub struct MockApdu {
    /// Scripted outcomes, consumed front to back
    outcomes: VecDeque<Result<Vec<u8>, String>>,

    /// Commands received so far
    commands: Vec<Vec<u8>>,
}

impl MockApdu {
    /// Create a mock that answers every command with `9000`
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response APDU
    pub fn with_response(mut self, response: &[u8]) -> Self {
        self.outcomes.push_back(Ok(response.to_vec()));
        self
    }

    /// Queue a transport failure
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.outcomes.push_back(Err(message.into()));
        self
    }

    /// Commands received so far, in order
    pub fn commands(&self) -> &[Vec<u8>] {
        &self.commands
    }

    /// Number of scripted outcomes not yet consumed
    pub fn pending(&self) -> usize {
        self.outcomes.len()
    }
}

#[async_trait]
impl Apdu for MockApdu {
    async fn transmit(&mut self, command: &[u8]) -> lpac_transport::Result<Vec<u8>> {
        self.commands.push(command.to_vec());
        match self.outcomes.pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(TransportError::Apdu(message)),
            None => Ok(SW_OK.to_vec()),
        }
    }
}
