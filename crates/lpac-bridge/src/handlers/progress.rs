//! Progress translation

use crate::error::{BridgeError, ProgressError, Result};
use lpac_protocol::{Envelope, ProgressUpdate};
use tracing::trace;

/// Forward a `progress` envelope to the caller's callback
///
/// Known step codes are replaced with their label; unknown ones are passed
/// through unchanged. An error from the callback ends the session.
pub fn handle_progress<F>(envelope: &Envelope, callback: &mut F) -> Result<()>
where
    F: FnMut(&str) -> std::result::Result<(), ProgressError> + ?Sized,
{
    let update: ProgressUpdate = envelope.payload()?;
    trace!(code = %update.message, "lpac progress");
    callback(update.step()).map_err(BridgeError::Progress)
}
