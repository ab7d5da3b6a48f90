//! Double-encoded response envelope handling.
//!
//! The payout provider wraps response payloads as a JSON string inside an
//! outer JSON object: `{"body": "<json>"}`. Decoding is an explicit
//! two-stage step so each stage fails with its own error and can be tested
//! on its own.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::domain::WireError;

/// Outer response envelope; `body` is itself JSON-encoded.
#[derive(Debug, Deserialize)]
pub struct ServiceEnvelope {
    pub body: String,
}

/// Decode a double-encoded response into `T`.
///
/// Stage one parses the outer envelope, stage two re-parses the `body`
/// string.
pub fn decode_envelope<T: DeserializeOwned>(raw: &[u8]) -> Result<T, WireError> {
    let outer: ServiceEnvelope = serde_json::from_slice(raw).map_err(WireError::Outer)?;
    serde_json::from_str(&outer.body).map_err(WireError::Inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        value: i32,
    }

    #[test]
    fn test_decode_envelope_two_stages() {
        let raw = serde_json::to_vec(&json!({
            "body": "{\"value\": 7}"
        }))
        .unwrap();

        let payload: Payload = decode_envelope(&raw).unwrap();
        assert_eq!(payload, Payload { value: 7 });
    }

    #[test]
    fn test_decode_envelope_outer_failure() {
        let result: Result<Payload, _> = decode_envelope(b"not json at all");
        assert!(matches!(result, Err(WireError::Outer(_))));
    }

    #[test]
    fn test_decode_envelope_inner_failure() {
        let raw = serde_json::to_vec(&json!({ "body": "{ truncated" })).unwrap();
        let result: Result<Payload, _> = decode_envelope(&raw);
        assert!(matches!(result, Err(WireError::Inner(_))));
    }

    #[test]
    fn test_decode_envelope_missing_body_is_outer_failure() {
        let raw = serde_json::to_vec(&json!({ "payload": "{}" })).unwrap();
        let result: Result<Payload, _> = decode_envelope(&raw);
        assert!(matches!(result, Err(WireError::Outer(_))));
    }
}
