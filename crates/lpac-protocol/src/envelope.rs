//! Line framing for the lpac stdio protocol
//!
//! Every message in either direction is a single JSON object of the form
//! `{"type": <kind>, "payload": <kind-specific>}` followed by a newline.

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Discriminator carried in the `type` field of an envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Card operation request (from lpac) or its reply (to lpac)
    Apdu,

    /// Terminal command result
    Lpa,

    /// Intermediate step notification
    Progress,

    /// Any kind this crate does not know about
    #[serde(other)]
    Unknown,
}

impl MessageKind {
    /// Wire name of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Apdu => "apdu",
            Self::Lpa => "lpa",
            Self::Progress => "progress",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded line of lpac output
///
/// The payload is kept as raw JSON; use [`Envelope::payload`] to decode it into
/// the type matching [`Envelope::kind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Message kind
    #[serde(rename = "type")]
    pub kind: MessageKind,

    /// Kind-specific payload, undecoded
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Envelope {
    /// Decode a single output line
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Json`](crate::ProtocolError::Json) if the line is
    /// not a JSON object with a string `type` field.
    pub fn decode(line: &str) -> Result<Self> {
        // A derived struct also accepts the array form, which lpac never prints
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(line)?;
        Ok(Self::deserialize(serde_json::Value::Object(object))?)
    }

    /// Decode the payload into a concrete message type
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(T::deserialize(&self.payload)?)
    }
}

/// An outbound line, serialized with the payload fields in declaration order
#[derive(Debug, Serialize)]
pub struct Frame<'a, P> {
    /// Message kind
    #[serde(rename = "type")]
    pub kind: MessageKind,

    /// Payload to embed
    pub payload: &'a P,
}

impl<P: Serialize> Frame<'_, P> {
    /// Serialize to a single line without the trailing newline
    pub fn to_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProtocolError;
    use rstest::rstest;

    #[rstest]
    #[case(r#"{"type":"apdu","payload":{"func":"connect"}}"#, MessageKind::Apdu)]
    #[case(r#"{"type":"lpa","payload":{"code":0}}"#, MessageKind::Lpa)]
    #[case(r#"{"type":"progress","payload":{"message":"x"}}"#, MessageKind::Progress)]
    #[case(r#"{"type":"telemetry","payload":{}}"#, MessageKind::Unknown)]
    fn test_decode_kind(#[case] line: &str, #[case] expected: MessageKind) {
        let envelope = Envelope::decode(line).unwrap();
        assert_eq!(envelope.kind, expected);
    }

    #[rstest]
    #[case("")]
    #[case("not json")]
    #[case(r#"{"payload":{}}"#)]
    #[case(r#"{"type":7,"payload":{}}"#)]
    #[case(r#"["apdu"]"#)]
    #[case(r#"["lpa",{"code":0,"message":"success","data":null}]"#)]
    #[case("null")]
    fn test_decode_malformed(#[case] line: &str) {
        let err = Envelope::decode(line).unwrap_err();
        assert!(matches!(err, ProtocolError::Json(_)));
    }

    #[test]
    fn test_missing_payload_defaults_to_null() {
        let envelope = Envelope::decode(r#"{"type":"lpa"}"#).unwrap();
        assert!(envelope.payload.is_null());
    }

    #[test]
    fn test_frame_field_order() {
        #[derive(Serialize)]
        struct Payload {
            b: u8,
            a: u8,
        }

        let frame = Frame {
            kind: MessageKind::Apdu,
            payload: &Payload { b: 1, a: 2 },
        };
        assert_eq!(
            frame.to_line().unwrap(),
            r#"{"type":"apdu","payload":{"b":1,"a":2}}"#
        );
    }
}
