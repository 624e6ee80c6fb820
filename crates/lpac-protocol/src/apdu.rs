//! APDU request/reply messages
//!
//! lpac asks its host to perform card operations through `apdu` envelopes.
//! Only `transmit` moves bytes; the remaining functions are acknowledged with a
//! zero `ecode` since the host transport manages the channel itself.

use crate::envelope::{Frame, MessageKind};
use crate::error::{ProtocolError, Result};
use serde::{Deserialize, Serialize};

/// `ecode` value lpac treats as success
pub const ECODE_OK: i32 = 0;

/// `ecode` value reported when the host transport failed
pub const ECODE_FAILURE: i32 = -1;

/// Card operation requested by lpac
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApduFunction {
    /// Open the reader
    Connect,

    /// Close the reader
    Disconnect,

    /// Open a logical channel to an applet
    LogicChannelOpen,

    /// Close a logical channel
    LogicChannelClose,

    /// Exchange one command APDU for one response APDU
    Transmit,

    /// A function this crate does not know about
    #[serde(other)]
    Unknown,
}

impl ApduFunction {
    /// Wire name of this function
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Disconnect => "disconnect",
            Self::LogicChannelOpen => "logic_channel_open",
            Self::LogicChannelClose => "logic_channel_close",
            Self::Transmit => "transmit",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ApduFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of an `apdu` envelope sent by lpac
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApduRequest {
    /// Requested function
    pub func: ApduFunction,

    /// Function parameter; a hex string for `transmit`
    #[serde(default)]
    pub param: serde_json::Value,
}

impl ApduRequest {
    /// Decode the command bytes of a `transmit` request
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MissingParam`] if `param` is not a string and
    /// [`ProtocolError::Hex`] if it is not valid hex.
    pub fn command(&self) -> Result<Vec<u8>> {
        match &self.param {
            serde_json::Value::String(hex) => Ok(hex::decode(hex)?),
            _ => Err(ProtocolError::MissingParam(self.func.to_string())),
        }
    }
}

/// Payload of the `apdu` envelope written back to lpac
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApduReply {
    /// Zero on success
    pub ecode: i32,

    /// Response APDU as uppercase hex, present only for `transmit`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl ApduReply {
    /// Reply carrying a response APDU
    pub fn with_data(response: &[u8]) -> Self {
        Self {
            ecode: ECODE_OK,
            data: Some(hex::encode_upper(response)),
        }
    }

    /// Bare acknowledgement with no data
    pub fn ack() -> Self {
        Self {
            ecode: ECODE_OK,
            data: None,
        }
    }

    /// Reply telling lpac the host transport failed
    pub fn failure() -> Self {
        Self {
            ecode: ECODE_FAILURE,
            data: None,
        }
    }

    /// Wrap this reply in an outbound envelope
    pub fn frame(&self) -> Frame<'_, Self> {
        Frame {
            kind: MessageKind::Apdu,
            payload: self,
        }
    }
}
