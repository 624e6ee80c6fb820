//! Terminal command result

use serde::{Deserialize, Serialize};

/// Payload of the `lpa` envelope that ends every lpac command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LpaResponse {
    /// Zero on success
    pub code: i64,

    /// Short status text, e.g. `"success"` or the name of the failing step
    #[serde(default)]
    pub message: String,

    /// Command result on success; often a detail string on failure
    #[serde(default)]
    pub data: serde_json::Value,
}

impl LpaResponse {
    /// Whether the command succeeded
    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// Best available description of a failure
    ///
    /// Prefers `data` when it is a non-empty string and falls back to `message`.
    pub fn error_text(&self) -> &str {
        match &self.data {
            serde_json::Value::String(detail) if !detail.is_empty() => detail,
            _ => &self.message,
        }
    }
}
