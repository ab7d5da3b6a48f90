//! Domain layer containing core business types, traits, and error definitions.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{
    AppError, BalanceError, ConfigError, DecodeError, EligibilityError, TokenError,
    ValidationError, WireError,
};
pub use traits::{BalanceProvider, EligibilityProvider, TokenProvider};
pub use types::{
    AuthorizationDecision, AuthorizationError, AuthorizationStatus, CredentialHeader,
    DecryptedCredentialEnvelope, PaymentCredential, PayoutEligibility, PayoutRequest,
    ProviderToken, ValidationOutcome, validate_recipient_name,
};
