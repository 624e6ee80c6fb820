//! APDU relay
//!
//! lpac blocks on its stdin after printing an `apdu` request, so the reply is
//! written and flushed before this handler returns.

use crate::error::{BridgeError, Result};
use lpac_protocol::{ApduFunction, ApduReply, ApduRequest, Envelope};
use lpac_transport::{Apdu, LineWriter};
use tokio::io::AsyncWrite;
use tracing::{debug, trace, warn};

/// Answer one `apdu` request
///
/// `transmit` performs exactly one exchange on `transport` and writes the
/// response back. Every other function is acknowledged with `ecode` 0 and no
/// transport I/O.
///
/// # Errors
///
/// A failed exchange is reported to lpac with `ecode` -1 and then returned as
/// [`BridgeError::Transport`], ending the session.
pub async fn handle_apdu<A, W>(
    envelope: &Envelope,
    transport: &mut A,
    input: &mut LineWriter<W>,
) -> Result<()>
where
    A: Apdu + ?Sized,
    W: AsyncWrite + Unpin,
{
    let request: ApduRequest = envelope.payload()?;

    let reply = match request.func {
        ApduFunction::Transmit => {
            let command = request.command()?;
            trace!(command = %hex_preview(&command), "transmitting APDU");

            match transport.transmit(&command).await {
                Ok(response) => {
                    trace!(response = %hex_preview(&response), "received APDU response");
                    ApduReply::with_data(&response)
                }
                Err(e) => {
                    warn!(error = %e, "APDU transmit failed");
                    if let Err(write_err) = input.send(&ApduReply::failure().frame()).await {
                        debug!(error = %write_err, "could not report transmit failure to lpac");
                    }
                    return Err(BridgeError::Transport(e));
                }
            }
        }
        other => {
            debug!(func = %other, "acknowledging APDU function");
            ApduReply::ack()
        }
    };

    input.send(&reply.frame()).await?;
    Ok(())
}

fn hex_preview(bytes: &[u8]) -> String {
    const LIMIT: usize = 32;
    if bytes.len() > LIMIT {
        format!("{}… ({} bytes)", hex::encode_upper(&bytes[..LIMIT]), bytes.len())
    } else {
        hex::encode_upper(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockApdu;
    use lpac_protocol::ProtocolError;

    fn envelope(line: &str) -> Envelope {
        Envelope::decode(line).unwrap()
    }

    #[tokio::test]
    async fn test_transmit_writes_response() {
        let mut transport = MockApdu::new().with_response(&[0xBF, 0x20, 0x90, 0x00]);
        let mock = tokio_test::io::Builder::new()
            .write(b"{\"type\":\"apdu\",\"payload\":{\"ecode\":0,\"data\":\"BF209000\"}}\n")
            .build();
        let mut input = LineWriter::new(mock);

        handle_apdu(
            &envelope(r#"{"type":"apdu","payload":{"func":"transmit","param":"80E2910003BF2000"}}"#),
            &mut transport,
            &mut input,
        )
        .await
        .unwrap();

        assert_eq!(
            transport.commands().to_vec(),
            vec![vec![0x80, 0xE2, 0x91, 0x00, 0x03, 0xBF, 0x20, 0x00]]
        );
    }

    #[tokio::test]
    async fn test_other_functions_are_acknowledged() {
        for func in ["connect", "logic_channel_open", "logic_channel_close", "disconnect", "reset"] {
            let mut transport = MockApdu::new();
            let mut input = LineWriter::new(Vec::new());
            let line = format!(r#"{{"type":"apdu","payload":{{"func":"{func}","param":"A0000005591010FFFFFFFF8900000100"}}}}"#);

            handle_apdu(&envelope(&line), &mut transport, &mut input)
                .await
                .unwrap();

            assert!(transport.commands().is_empty(), "{func} must not transmit");
            assert_eq!(
                input.get_ref().as_slice(),
                b"{\"type\":\"apdu\",\"payload\":{\"ecode\":0}}\n"
            );
        }
    }

    #[tokio::test]
    async fn test_transmit_failure_reports_and_aborts() {
        let mut transport = MockApdu::new().with_failure("reader unplugged");
        let mut input = LineWriter::new(Vec::new());

        let err = handle_apdu(
            &envelope(r#"{"type":"apdu","payload":{"func":"transmit","param":"00"}}"#),
            &mut transport,
            &mut input,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, BridgeError::Transport(_)));
        assert!(err.to_string().contains("reader unplugged"));
        assert_eq!(
            input.get_ref().as_slice(),
            b"{\"type\":\"apdu\",\"payload\":{\"ecode\":-1}}\n"
        );
    }

    #[tokio::test]
    async fn test_bad_param_writes_nothing() {
        let mut transport = MockApdu::new();
        let mut input = LineWriter::new(Vec::new());

        let err = handle_apdu(
            &envelope(r#"{"type":"apdu","payload":{"func":"transmit","param":"ZZ"}}"#),
            &mut transport,
            &mut input,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, BridgeError::Protocol(ProtocolError::Hex(_))));
        assert!(transport.commands().is_empty());
        assert!(input.get_ref().is_empty());
    }

    #[test]
    fn test_hex_preview_truncates() {
        assert_eq!(hex_preview(&[0x90, 0x00]), "9000");
        let long = vec![0xAB; 40];
        let preview = hex_preview(&long);
        assert!(preview.starts_with(&"AB".repeat(32)));
        assert!(preview.ends_with("(40 bytes)"));
    }
}
