//! Card transport trait
//!
//! Defines the interface a hardware reader exposes to the bridge.

use crate::error::Result;
use async_trait::async_trait;

/// A transport able to exchange APDUs with a SIM/eUICC
///
/// `transmit` takes `&mut self`: callers reach it through a
/// `tokio::sync::Mutex` guard, so one lpac session owns the reader from spawn
/// to exit.
#[async_trait]
pub trait Apdu: Send {
    /// Send one command APDU and return the card's response APDU
    ///
    /// # Errors
    ///
    /// Implementations should report reader failures as
    /// [`TransportError::Apdu`](crate::TransportError::Apdu).
    async fn transmit(&mut self, command: &[u8]) -> Result<Vec<u8>>;
}

#[async_trait]
impl<A: Apdu + ?Sized> Apdu for Box<A> {
    async fn transmit(&mut self, command: &[u8]) -> Result<Vec<u8>> {
        (**self).transmit(command).await
    }
}
