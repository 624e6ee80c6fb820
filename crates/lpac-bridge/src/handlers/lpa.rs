//! Terminal result handling

use crate::error::{BridgeError, Result};
use lpac_protocol::{Envelope, LpaResponse};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Resolve the `lpa` envelope that ends a command
///
/// On success the result data is deserialized into `dst` when one is given;
/// commands run for their side effect pass `None`. On failure the error text
/// is the detail string in `data` when present, else the status message.
pub fn handle_lpa<T: DeserializeOwned>(envelope: &Envelope, dst: Option<&mut T>) -> Result<()> {
    let response: LpaResponse = envelope.payload()?;

    if !response.is_success() {
        debug!(code = response.code, message = %response.message, "lpac reported failure");
        return Err(BridgeError::Lpa {
            code: response.code,
            message: response.error_text().to_string(),
        });
    }

    if let Some(dst) = dst {
        *dst = serde_json::from_value(response.data).map_err(BridgeError::Destination)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Deserialize)]
    struct Profile {
        iccid: String,
        #[serde(rename = "profileState")]
        state: String,
    }

    fn lpa(payload: &str) -> Envelope {
        Envelope::decode(&format!(r#"{{"type":"lpa","payload":{payload}}}"#)).unwrap()
    }

    #[test]
    fn test_success_fills_destination() {
        let mut profiles: Vec<Profile> = Vec::new();
        handle_lpa(
            &lpa(r#"{"code":0,"message":"success","data":[{"iccid":"8944","profileState":"enabled"}]}"#),
            Some(&mut profiles),
        )
        .unwrap();

        assert_eq!(
            profiles,
            vec![Profile {
                iccid: "8944".to_string(),
                state: "enabled".to_string(),
            }]
        );
    }

    #[test]
    fn test_success_without_destination() {
        handle_lpa::<serde_json::Value>(&lpa(r#"{"code":0,"message":"success","data":{}}"#), None)
            .unwrap();
    }

    #[test]
    fn test_destination_mismatch() {
        let mut profile = Profile::default();
        let err = handle_lpa(
            &lpa(r#"{"code":0,"message":"success","data":"not a profile"}"#),
            Some(&mut profile),
        )
        .unwrap_err();
        assert!(matches!(err, BridgeError::Destination(_)));
    }

    #[rstest]
    #[case(r#"{"code":1,"message":"failed","data":"bad profile"}"#, "bad profile")]
    #[case(r#"{"code":1,"message":"failed","data":null}"#, "failed")]
    #[case(r#"{"code":-1,"message":"es10c_delete_profile","data":""}"#, "es10c_delete_profile")]
    fn test_failure_text(#[case] payload: &str, #[case] expected: &str) {
        let mut untouched = Profile::default();
        let err = handle_lpa(&lpa(payload), Some(&mut untouched)).unwrap_err();

        assert_eq!(err.to_string(), expected);
        assert!(err.lpa_code().is_some());
        assert_eq!(untouched, Profile::default());
    }

    #[test]
    fn test_malformed_payload() {
        let err = handle_lpa::<serde_json::Value>(&lpa(r#"{"message":"no code"}"#), None).unwrap_err();
        assert!(matches!(err, BridgeError::Protocol(_)));
    }
}
