//! Domain types with validation support.

use std::fmt;
use std::sync::LazyLock;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::error::DecodeError;

/// Recipient names must consist of letters, spaces, apostrophes and hyphens
/// over their entire span. Anchored so a partial match never passes.
static RECIPIENT_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z '-]+$").expect("recipient name pattern is valid"));

/// Result of the local recipient-name check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub valid: bool,
}

/// Check a recipient name against the payout format rule.
///
/// Pure and local; the caller decides whether a failure is terminal.
/// An absent name is invalid.
#[must_use]
pub fn validate_recipient_name(name: Option<&str>) -> ValidationOutcome {
    let valid = name.is_some_and(|n| RECIPIENT_NAME_PATTERN.is_match(n));
    ValidationOutcome { valid }
}

/// Opaque encrypted payment credential from the external wallet provider.
///
/// Write-once: consumed by envelope decoding, never persisted.
#[derive(Clone)]
pub struct PaymentCredential(Vec<u8>);

impl PaymentCredential {
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for PaymentCredential {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for PaymentCredential {
    // Encrypted payloads stay out of logs; only the length is shown.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PaymentCredential({} bytes)", self.0.len())
    }
}

/// Credential header variant, keyed by the wallet provider's protocol
/// version. Exactly one wrapping key is populated per variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialHeader {
    /// EC-based protocol versions carry an ephemeral public key.
    EllipticCurve {
        ephemeral_public_key: String,
        public_key_hash: String,
        transaction_id: String,
    },
    /// RSA-based protocol versions carry a wrapped symmetric key.
    Rsa {
        wrapped_key: String,
        public_key_hash: String,
        transaction_id: String,
    },
}

impl CredentialHeader {
    #[must_use]
    pub fn public_key_hash(&self) -> &str {
        match self {
            Self::EllipticCurve { public_key_hash, .. } | Self::Rsa { public_key_hash, .. } => {
                public_key_hash
            }
        }
    }

    #[must_use]
    pub fn transaction_id(&self) -> &str {
        match self {
            Self::EllipticCurve { transaction_id, .. } | Self::Rsa { transaction_id, .. } => {
                transaction_id
            }
        }
    }
}

/// Raw wire shape of the credential payload, prior to variant checks.
#[derive(Debug, Deserialize)]
struct WireEnvelope {
    version: String,
    data: String,
    signature: String,
    header: WireHeader,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireHeader {
    ephemeral_public_key: Option<String>,
    wrapped_key: Option<String>,
    public_key_hash: String,
    transaction_id: String,
}

/// Decrypted payment credential envelope, decoded from raw wallet bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptedCredentialEnvelope {
    pub version: String,
    /// Base64-encoded encrypted payload, forwarded verbatim to the provider.
    pub data: String,
    pub signature: String,
    pub header: CredentialHeader,
}

impl DecryptedCredentialEnvelope {
    /// Decode raw credential bytes into a typed envelope.
    ///
    /// Fails fatally on malformed input: there is no fallback path for a
    /// credential that cannot be decoded.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let wire: WireEnvelope =
            serde_json::from_slice(bytes).map_err(|e| DecodeError::Malformed(e.to_string()))?;

        for (field, value) in [("data", &wire.data), ("signature", &wire.signature)] {
            if value.is_empty() || BASE64.decode(value).is_err() {
                return Err(DecodeError::Payload { field });
            }
        }

        let header = if wire.version.starts_with("EC_") {
            match (wire.header.ephemeral_public_key, wire.header.wrapped_key) {
                (Some(ephemeral_public_key), None) => CredentialHeader::EllipticCurve {
                    ephemeral_public_key,
                    public_key_hash: wire.header.public_key_hash,
                    transaction_id: wire.header.transaction_id,
                },
                (Some(_), Some(_)) => {
                    return Err(DecodeError::ConflictingHeaderKeys {
                        version: wire.version,
                    });
                }
                _ => {
                    return Err(DecodeError::MissingHeaderKey {
                        version: wire.version,
                    });
                }
            }
        } else if wire.version.starts_with("RSA_") {
            match (wire.header.wrapped_key, wire.header.ephemeral_public_key) {
                (Some(wrapped_key), None) => CredentialHeader::Rsa {
                    wrapped_key,
                    public_key_hash: wire.header.public_key_hash,
                    transaction_id: wire.header.transaction_id,
                },
                (Some(_), Some(_)) => {
                    return Err(DecodeError::ConflictingHeaderKeys {
                        version: wire.version,
                    });
                }
                _ => {
                    return Err(DecodeError::MissingHeaderKey {
                        version: wire.version,
                    });
                }
            }
        } else {
            return Err(DecodeError::UnsupportedVersion {
                version: wire.version,
            });
        };

        Ok(Self {
            version: wire.version,
            data: wire.data,
            signature: wire.signature,
            header,
        })
    }
}

/// Short-lived opaque token returned by the tokenization service.
///
/// Obtained once per attempt, used immediately, never reused across runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderToken(String);

impl ProviderToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderToken {
    // Truncated so a logged token is never usable.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.chars().count() > 8 {
            let prefix: String = self.0.chars().take(8).collect();
            write!(f, "{prefix}…")
        } else {
            f.write_str(&self.0)
        }
    }
}

/// Payout eligibility classification for a recipient card.
///
/// The provider defines an open string set; unrecognized values land in
/// `Other` so new classifications are handled by an explicit default branch
/// instead of being silently misclassified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayoutEligibility {
    FastFunds,
    Standard,
    Unknown,
    Ineligible,
    Other(String),
}

impl PayoutEligibility {
    #[must_use]
    pub fn from_wire(value: &str) -> Self {
        match value {
            "fast_funds" => Self::FastFunds,
            "standard" => Self::Standard,
            "unknown" => Self::Unknown,
            "ineligible" => Self::Ineligible,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::FastFunds => "fast_funds",
            Self::Standard => "standard",
            Self::Unknown => "unknown",
            Self::Ineligible => "ineligible",
            Self::Other(value) => value,
        }
    }

    /// Business rule: only these classifications allow the payout to
    /// proceed to the balance check.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::FastFunds | Self::Standard | Self::Unknown)
    }
}

impl fmt::Display for PayoutEligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Terminal status of an authorization attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationStatus {
    Approved,
    Declined,
}

impl AuthorizationStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Declined => "declined",
        }
    }
}

impl std::str::FromStr for AuthorizationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(Self::Approved),
            "declined" => Ok(Self::Declined),
            _ => Err(format!("Invalid authorization status: {}", s)),
        }
    }
}

impl fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured error attached to a declined decision.
///
/// Carries no raw payloads or token material; diagnostic detail stays in
/// operator logs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuthorizationError {
    InvalidRecipientName { message: String },
    UnsupportedRecipientCard { eligibility: String },
    InsufficientFunds { available: Decimal, required: Decimal },
    CredentialDecode { message: String },
    TokenExchange { message: String },
    Eligibility { message: String },
    Balance { message: String },
    InvalidRequest { message: String },
}

impl fmt::Display for AuthorizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRecipientName { message } => write!(f, "invalid recipient name: {message}"),
            Self::UnsupportedRecipientCard { eligibility } => {
                write!(f, "unsupported recipient card: {eligibility}")
            }
            Self::InsufficientFunds { available, required } => {
                write!(f, "insufficient funds: {available} available, {required} required")
            }
            Self::CredentialDecode { message } => write!(f, "credential decode: {message}"),
            Self::TokenExchange { message } => write!(f, "token exchange: {message}"),
            Self::Eligibility { message } => write!(f, "eligibility: {message}"),
            Self::Balance { message } => write!(f, "balance: {message}"),
            Self::InvalidRequest { message } => write!(f, "invalid request: {message}"),
        }
    }
}

/// Final accept/reject decision for one transaction attempt.
///
/// Produced exactly once per attempt; every error the attempt accumulated is
/// attached in the order it was recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationDecision {
    pub status: AuthorizationStatus,
    pub errors: Vec<AuthorizationError>,
    pub decided_at: DateTime<Utc>,
}

impl AuthorizationDecision {
    #[must_use]
    pub fn approved() -> Self {
        Self {
            status: AuthorizationStatus::Approved,
            errors: Vec::new(),
            decided_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn declined(errors: Vec<AuthorizationError>) -> Self {
        Self {
            status: AuthorizationStatus::Declined,
            errors,
            decided_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.status == AuthorizationStatus::Approved
    }
}

/// Input bundle for a single payout authorization attempt.
///
/// Created fresh per attempt and discarded at decision time.
#[derive(Debug, Clone, Validate)]
pub struct PayoutRequest {
    pub recipient_given_name: Option<String>,
    pub recipient_family_name: Option<String>,
    /// Raw encrypted credential from the wallet provider.
    pub credential: PaymentCredential,
    /// Merchant funding account the payout is drawn from.
    #[validate(length(min = 1, message = "Funding account id is required"))]
    pub funding_account_id: String,
    /// Payout scenario key, e.g. a domestic transfer method.
    #[validate(length(min = 1, message = "Payout scenario is required"))]
    pub scenario: String,
    /// Fixed transaction amount for this attempt.
    pub amount: Decimal,
}

impl PayoutRequest {
    /// Concatenated given and family name, or `None` when both are absent.
    #[must_use]
    pub fn recipient_name(&self) -> Option<String> {
        let parts: Vec<&str> = [
            self.recipient_given_name.as_deref(),
            self.recipient_family_name.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn ec_credential_json() -> serde_json::Value {
        json!({
            "version": "EC_v1",
            "data": "cGF5bG9hZA==",
            "signature": "c2lnbmF0dXJl",
            "header": {
                "ephemeralPublicKey": "a2V5",
                "publicKeyHash": "aGFzaA==",
                "transactionId": "abc123"
            }
        })
    }

    #[test]
    fn test_recipient_name_validation_accepts_full_span_matches() {
        for name in ["Jane Doe", "O'Brien", "Anne-Marie", "d'Arcy Smith-Jones"] {
            assert!(validate_recipient_name(Some(name)).valid, "{name}");
        }
    }

    #[test]
    fn test_recipient_name_validation_rejects_partial_and_invalid() {
        for name in ["J4ne", "Jane Doe!", "", "名前", "Jane\nDoe"] {
            assert!(!validate_recipient_name(Some(name)).valid, "{name:?}");
        }
        assert!(!validate_recipient_name(None).valid);
    }

    #[test]
    fn test_envelope_decode_ec_variant() {
        let bytes = serde_json::to_vec(&ec_credential_json()).unwrap();
        let envelope = DecryptedCredentialEnvelope::from_bytes(&bytes).unwrap();

        assert_eq!(envelope.version, "EC_v1");
        assert_eq!(envelope.header.transaction_id(), "abc123");
        assert!(matches!(
            envelope.header,
            CredentialHeader::EllipticCurve { .. }
        ));
    }

    #[test]
    fn test_envelope_decode_rsa_variant() {
        let payload = json!({
            "version": "RSA_v1",
            "data": "cGF5bG9hZA==",
            "signature": "c2lnbmF0dXJl",
            "header": {
                "wrappedKey": "d3JhcHBlZA==",
                "publicKeyHash": "aGFzaA==",
                "transactionId": "def456"
            }
        });
        let envelope =
            DecryptedCredentialEnvelope::from_bytes(&serde_json::to_vec(&payload).unwrap())
                .unwrap();

        assert!(matches!(envelope.header, CredentialHeader::Rsa { .. }));
        assert_eq!(envelope.header.public_key_hash(), "aGFzaA==");
    }

    #[test]
    fn test_envelope_decode_rejects_wrong_header_key() {
        let mut payload = ec_credential_json();
        payload["header"] = json!({
            "wrappedKey": "d3JhcHBlZA==",
            "publicKeyHash": "aGFzaA==",
            "transactionId": "abc123"
        });
        let result =
            DecryptedCredentialEnvelope::from_bytes(&serde_json::to_vec(&payload).unwrap());
        assert!(matches!(result, Err(DecodeError::MissingHeaderKey { .. })));
    }

    #[test]
    fn test_envelope_decode_rejects_both_header_keys() {
        let mut payload = ec_credential_json();
        payload["header"]["wrappedKey"] = json!("d3JhcHBlZA==");
        let result =
            DecryptedCredentialEnvelope::from_bytes(&serde_json::to_vec(&payload).unwrap());
        assert!(matches!(
            result,
            Err(DecodeError::ConflictingHeaderKeys { .. })
        ));
    }

    #[test]
    fn test_envelope_decode_rejects_unknown_version() {
        let mut payload = ec_credential_json();
        payload["version"] = json!("DES_v0");
        let result =
            DecryptedCredentialEnvelope::from_bytes(&serde_json::to_vec(&payload).unwrap());
        assert!(matches!(
            result,
            Err(DecodeError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn test_envelope_decode_rejects_non_base64_payload() {
        let mut payload = ec_credential_json();
        payload["data"] = json!("not base64!!!");
        let result =
            DecryptedCredentialEnvelope::from_bytes(&serde_json::to_vec(&payload).unwrap());
        assert!(matches!(result, Err(DecodeError::Payload { field: "data" })));
    }

    #[test]
    fn test_envelope_decode_rejects_garbage_bytes() {
        let result = DecryptedCredentialEnvelope::from_bytes(b"not an envelope");
        assert!(matches!(result, Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn test_eligibility_wire_parsing() {
        let cases = vec![
            ("fast_funds", PayoutEligibility::FastFunds, true),
            ("standard", PayoutEligibility::Standard, true),
            ("unknown", PayoutEligibility::Unknown, true),
            ("ineligible", PayoutEligibility::Ineligible, false),
            (
                "prepaid_only",
                PayoutEligibility::Other("prepaid_only".to_string()),
                false,
            ),
        ];

        for (wire, expected, supported) in cases {
            let parsed = PayoutEligibility::from_wire(wire);
            assert_eq!(parsed, expected);
            assert_eq!(parsed.as_str(), wire);
            assert_eq!(parsed.is_supported(), supported);
        }
    }

    #[test]
    fn test_authorization_status_display_and_parsing() {
        for (status, string) in [
            (AuthorizationStatus::Approved, "approved"),
            (AuthorizationStatus::Declined, "declined"),
        ] {
            assert_eq!(status.as_str(), string);
            assert_eq!(status.to_string(), string);
            assert_eq!(AuthorizationStatus::from_str(string).unwrap(), status);
        }
        assert!(AuthorizationStatus::from_str("pending").is_err());
    }

    #[test]
    fn test_provider_token_display_is_truncated() {
        let token = ProviderToken::new("tok_1234567890abcdef");
        let shown = token.to_string();
        assert!(shown.starts_with("tok_1234"));
        assert!(!shown.contains("abcdef"));
    }

    #[test]
    fn test_payment_credential_debug_hides_contents() {
        let credential = PaymentCredential::new(vec![1, 2, 3]);
        assert_eq!(format!("{credential:?}"), "PaymentCredential(3 bytes)");
    }

    #[test]
    fn test_recipient_name_concatenation() {
        let mut request = PayoutRequest {
            recipient_given_name: Some("Jane".to_string()),
            recipient_family_name: Some("Doe".to_string()),
            credential: PaymentCredential::new(vec![]),
            funding_account_id: "acct_1".to_string(),
            scenario: "domestic_money_transfer".to_string(),
            amount: Decimal::ONE,
        };
        assert_eq!(request.recipient_name().as_deref(), Some("Jane Doe"));

        request.recipient_family_name = None;
        assert_eq!(request.recipient_name().as_deref(), Some("Jane"));

        request.recipient_given_name = None;
        assert_eq!(request.recipient_name(), None);
    }

    #[test]
    fn test_payout_request_structural_validation() {
        let request = PayoutRequest {
            recipient_given_name: None,
            recipient_family_name: None,
            credential: PaymentCredential::new(vec![]),
            funding_account_id: String::new(),
            scenario: "domestic_money_transfer".to_string(),
            amount: Decimal::ONE,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_decision_serialization_roundtrip() {
        let decision = AuthorizationDecision::declined(vec![
            AuthorizationError::InvalidRecipientName {
                message: "bad characters".to_string(),
            },
            AuthorizationError::InsufficientFunds {
                available: Decimal::new(500, 2),
                required: Decimal::new(999, 2),
            },
        ]);

        let json = serde_json::to_string(&decision).unwrap();
        let deserialized: AuthorizationDecision = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.status, AuthorizationStatus::Declined);
        assert_eq!(deserialized.errors, decision.errors);
    }
}
