//! Error taxonomy for the payout authorization pipeline.
//!
//! Each pipeline stage owns a dedicated error enum; `AppError` is the
//! top-level sum that crosses the trait boundaries. Remote-call errors are
//! converted into the attempt's terminal decision at the orchestrator, never
//! retried.

use thiserror::Error;

/// Local recipient-format validation failures.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid field {field}: {message}")]
    InvalidField { field: String, message: String },

    #[error("Validation failed: {0}")]
    Multiple(String),

    #[error("Recipient name is missing")]
    MissingName,

    #[error("Recipient name {name:?} contains unsupported characters")]
    MalformedName { name: String },
}

/// Malformed credential envelope. Fatal for the attempt, no recovery path.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Credential payload is not a valid envelope: {0}")]
    Malformed(String),

    #[error("Unsupported credential version {version:?}")]
    UnsupportedVersion { version: String },

    #[error("Credential header is missing the wrapping key required by {version}")]
    MissingHeaderKey { version: String },

    #[error("Credential header carries conflicting wrapping keys for {version}")]
    ConflictingHeaderKeys { version: String },

    #[error("Credential field {field} is not base64-encoded")]
    Payload { field: &'static str },
}

/// Failures of the double-encoded response envelope, by decode stage.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("Malformed response envelope: {0}")]
    Outer(#[source] serde_json::Error),

    #[error("Malformed envelope body: {0}")]
    Inner(#[source] serde_json::Error),
}

/// Token-exchange failures.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token exchange request failed: {0}")]
    Network(String),

    #[error("Token service returned {status_code}: {message}")]
    Api { status_code: u16, message: String },

    #[error("Token response could not be parsed: {0}")]
    Parse(String),

    #[error("Token response is missing the token field")]
    MissingToken,
}

/// Card eligibility lookup failures.
#[derive(Debug, Error)]
pub enum EligibilityError {
    #[error("Eligibility request failed: {0}")]
    Network(String),

    #[error("Eligibility service returned {status_code}: {message}")]
    Api { status_code: u16, message: String },

    #[error("Eligibility response could not be decoded: {0}")]
    Envelope(#[from] WireError),

    #[error("Eligibility response is missing {path}")]
    MissingPath { path: String },
}

/// Funding-balance lookup failures.
#[derive(Debug, Error)]
pub enum BalanceError {
    #[error("Balance request failed: {0}")]
    Network(String),

    #[error("Balance service returned {status_code}: {message}")]
    Api { status_code: u16, message: String },

    #[error("Balance response could not be decoded: {0}")]
    Envelope(#[from] WireError),

    #[error("No funding account matches id {0}")]
    AccountNotFound(String),

    #[error("Funding account {account_id} has a malformed available balance")]
    MalformedRecord { account_id: String },
}

/// Missing or invalid runner configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    Missing(String),

    #[error("Invalid configuration value for {name}: {message}")]
    Invalid { name: String, message: String },
}

/// Top-level application error.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Credential decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Token exchange error: {0}")]
    Token(#[from] TokenError),

    #[error("Eligibility error: {0}")]
    Eligibility(#[from] EligibilityError),

    #[error("Balance error: {0}")]
    Balance(#[from] BalanceError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
