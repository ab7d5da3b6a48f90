//! Payout authorization orchestration.
//!
//! Drives a single transaction attempt through the full chain: local
//! recipient validation, credential decode, token exchange, card
//! eligibility, funding balance, terminal decision. Each step depends on
//! the previous one's output, so the chain is strictly sequential.

use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::domain::{
    AppError, AuthorizationDecision, AuthorizationError, BalanceProvider,
    DecryptedCredentialEnvelope, EligibilityProvider, PayoutRequest, TokenProvider,
    ValidationError, validate_recipient_name,
};

/// How a failed recipient-name check affects the rest of the chain.
///
/// `RecordAndContinue` (the default) keeps the error, still runs the
/// network chain, and reports every accumulated error at decision time.
/// `FailFast` declines immediately without touching the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameCheckPolicy {
    #[default]
    RecordAndContinue,
    FailFast,
}

/// Orchestrates one payout authorization attempt over the provider
/// contracts.
///
/// Holds no attempt state: providers are shared, everything about an
/// attempt lives inside a single `authorize` call.
pub struct PayoutOrchestrator {
    token_provider: Arc<dyn TokenProvider>,
    eligibility_provider: Arc<dyn EligibilityProvider>,
    balance_provider: Arc<dyn BalanceProvider>,
    name_check_policy: NameCheckPolicy,
}

impl PayoutOrchestrator {
    #[must_use]
    pub fn new(
        token_provider: Arc<dyn TokenProvider>,
        eligibility_provider: Arc<dyn EligibilityProvider>,
        balance_provider: Arc<dyn BalanceProvider>,
    ) -> Self {
        Self {
            token_provider,
            eligibility_provider,
            balance_provider,
            name_check_policy: NameCheckPolicy::default(),
        }
    }

    /// Select the name-check policy (builder pattern).
    #[must_use]
    pub fn with_name_check_policy(mut self, policy: NameCheckPolicy) -> Self {
        self.name_check_policy = policy;
        self
    }

    /// Drive one attempt to its terminal decision.
    ///
    /// Consumes the request: an attempt is decided exactly once, and every
    /// branch terminates in the single decision constructor. No retries, no
    /// partial success; the first terminal-class condition reached fixes the
    /// final status.
    #[instrument(skip(self, request), fields(scenario = %request.scenario, amount = %request.amount))]
    pub async fn authorize(&self, request: PayoutRequest) -> AuthorizationDecision {
        let attempt = Uuid::new_v4();
        let mut errors: Vec<AuthorizationError> = Vec::new();

        if let Err(e) = request.validate() {
            warn!(attempt = %attempt, error = %e, "Request failed structural validation");
            return Self::decide(
                attempt,
                vec![AuthorizationError::InvalidRequest {
                    message: ValidationError::Multiple(e.to_string()).to_string(),
                }],
            );
        }

        let name = request.recipient_name();
        if !validate_recipient_name(name.as_deref()).valid {
            let cause = match name {
                Some(name) => ValidationError::MalformedName { name },
                None => ValidationError::MissingName,
            };
            warn!(attempt = %attempt, error = %cause, "Recipient name failed format check");
            let error = AuthorizationError::InvalidRecipientName {
                message: cause.to_string(),
            };
            match self.name_check_policy {
                NameCheckPolicy::FailFast => return Self::decide(attempt, vec![error]),
                NameCheckPolicy::RecordAndContinue => errors.push(error),
            }
        }

        let envelope = match DecryptedCredentialEnvelope::from_bytes(request.credential.as_bytes())
        {
            Ok(envelope) => envelope,
            Err(e) => {
                let e = AppError::from(e);
                warn!(attempt = %attempt, error = %e, "Credential decode failed");
                errors.push(decision_error(&e));
                return Self::decide(attempt, errors);
            }
        };

        let token = match self.token_provider.exchange(&envelope).await {
            Ok(token) => token,
            Err(e) => {
                warn!(attempt = %attempt, error = %e, "Token exchange failed");
                errors.push(decision_error(&e));
                return Self::decide(attempt, errors);
            }
        };

        let eligibility = match self
            .eligibility_provider
            .check_eligibility(&token, &request.scenario)
            .await
        {
            Ok(eligibility) => eligibility,
            Err(e) => {
                warn!(attempt = %attempt, error = %e, "Eligibility check failed");
                errors.push(decision_error(&e));
                return Self::decide(attempt, errors);
            }
        };

        if !eligibility.is_supported() {
            warn!(
                attempt = %attempt,
                eligibility = %eligibility,
                "Recipient card is not supported for this payout"
            );
            errors.push(AuthorizationError::UnsupportedRecipientCard {
                eligibility: eligibility.to_string(),
            });
            return Self::decide(attempt, errors);
        }

        let available = match self
            .balance_provider
            .available_balance(&request.funding_account_id)
            .await
        {
            Ok(available) => available,
            Err(e) => {
                warn!(attempt = %attempt, error = %e, "Balance lookup failed");
                errors.push(decision_error(&e));
                return Self::decide(attempt, errors);
            }
        };

        if available < request.amount {
            warn!(
                attempt = %attempt,
                available = %available,
                required = %request.amount,
                "Funding account balance is insufficient"
            );
            errors.push(AuthorizationError::InsufficientFunds {
                available,
                required: request.amount,
            });
        }

        Self::decide(attempt, errors)
    }

    /// Single decision point; every `authorize` branch funnels through here.
    fn decide(attempt: Uuid, errors: Vec<AuthorizationError>) -> AuthorizationDecision {
        if errors.is_empty() {
            info!(attempt = %attempt, "Payout authorization approved");
            AuthorizationDecision::approved()
        } else {
            warn!(
                attempt = %attempt,
                error_count = errors.len(),
                "Payout authorization declined"
            );
            AuthorizationDecision::declined(errors)
        }
    }
}

/// Map an upstream error into the structured decision error attached to a
/// declined attempt. Diagnostic payloads stay in the logs.
fn decision_error(error: &AppError) -> AuthorizationError {
    match error {
        AppError::Decode(e) => AuthorizationError::CredentialDecode {
            message: e.to_string(),
        },
        AppError::Token(e) => AuthorizationError::TokenExchange {
            message: e.to_string(),
        },
        AppError::Eligibility(e) => AuthorizationError::Eligibility {
            message: e.to_string(),
        },
        AppError::Balance(e) => AuthorizationError::Balance {
            message: e.to_string(),
        },
        AppError::Validation(e) => AuthorizationError::InvalidRequest {
            message: e.to_string(),
        },
        AppError::Config(e) => AuthorizationError::InvalidRequest {
            message: e.to_string(),
        },
    }
}
