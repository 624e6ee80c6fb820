//! The dispatch loop of one lpac invocation
//!
//! A [`Session`] reads lpac's output line by line and routes each envelope to
//! its handler. It is independent of process management so the loop can be
//! driven by any reader/writer pair.

use crate::error::{ProgressError, Result};
use crate::handlers::{handle_apdu, handle_lpa, handle_progress};
use lpac_protocol::{Envelope, MessageKind};
use lpac_transport::{Apdu, LineReader, LineWriter};
use serde::de::DeserializeOwned;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, trace};

/// Progress callback; returning an error aborts the command
pub type ProgressCallback<'a> =
    &'a mut (dyn FnMut(&str) -> std::result::Result<(), ProgressError> + Send);

/// State borrowed for the duration of one command
///
/// The transport borrow usually comes from a lock guard local to the caller,
/// so it gets its own lifetime, independent of the destination and callback.
pub struct Session<'t, 'd, 'p, A: ?Sized, T> {
    transport: &'t mut A,
    dst: Option<&'d mut T>,
    progress: Option<ProgressCallback<'p>>,
}

impl<'t, 'd, 'p, A, T> Session<'t, 'd, 'p, A, T>
where
    A: Apdu + ?Sized,
    T: DeserializeOwned,
{
    /// Create a session over an already locked transport
    pub fn new(
        transport: &'t mut A,
        dst: Option<&'d mut T>,
        progress: Option<ProgressCallback<'p>>,
    ) -> Self {
        Self {
            transport,
            dst,
            progress,
        }
    }

    /// Process output until EOF or the first error
    ///
    /// Each line is fully handled, including any reply to lpac, before the
    /// next one is read.
    pub async fn drive<R, W>(
        &mut self,
        output: &mut LineReader<R>,
        input: &mut LineWriter<W>,
    ) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        while let Some(line) = output.next_line().await? {
            self.dispatch(&line, input).await?;
        }
        debug!("lpac output closed");
        Ok(())
    }

    /// Decode and handle a single output line
    pub async fn dispatch<W>(&mut self, line: &str, input: &mut LineWriter<W>) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let envelope = Envelope::decode(line)?;
        trace!(kind = %envelope.kind, "lpac message");

        match envelope.kind {
            MessageKind::Apdu => handle_apdu(&envelope, &mut *self.transport, input).await,
            MessageKind::Lpa => handle_lpa(&envelope, self.dst.as_deref_mut()),
            MessageKind::Progress => match self.progress.as_deref_mut() {
                Some(callback) => handle_progress(&envelope, callback),
                None => Ok(()),
            },
            MessageKind::Unknown => {
                debug!(line, "ignoring unknown lpac message");
                Ok(())
            }
        }
    }
}
