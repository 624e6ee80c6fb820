//! Progress notifications
//!
//! lpac reports each step of a long operation (profile download in particular)
//! by the name of the ES9+/ES10 function it is about to call. Those names are
//! mapped to short labels fit for showing to a user.

use serde::{Deserialize, Serialize};

/// Step code → user-facing label
pub static HUMAN_READABLE_STEPS: &[(&str, &str)] = &[
    ("es10b_get_euicc_challenge_and_info", "Getting eUICC challenge"),
    ("es9p_initiate_authentication", "Initiating authentication"),
    ("es10b_authenticate_server", "Authenticating server"),
    ("es9p_authenticate_client", "Authenticating client"),
    ("es10b_prepare_download", "Preparing download"),
    ("es9p_get_bound_profile_package", "Fetching profile package"),
    ("es8p_meatadata_parse", "Parsing profile metadata"),
    ("es10b_load_bound_profile_package", "Installing profile"),
    ("es10b_cancel_session", "Cancelling session"),
    ("es9p_cancel_session", "Cancelling session with server"),
    ("es9p_handle_notification", "Sending notification"),
    ("es10b_remove_notification_from_list", "Removing notification"),
];

/// Look up the label for a step code
pub fn human_readable_step(code: &str) -> Option<&'static str> {
    HUMAN_READABLE_STEPS
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, label)| *label)
}

/// Payload of a `progress` envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Raw step code
    pub message: String,

    /// Optional step detail
    #[serde(default)]
    pub data: serde_json::Value,
}

impl ProgressUpdate {
    /// Label for this step, or the raw code when the step is not known
    pub fn step(&self) -> &str {
        match human_readable_step(&self.message) {
            Some(label) => label,
            None => &self.message,
        }
    }
}
