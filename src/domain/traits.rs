//! Domain traits defining contracts for the external payout provider.

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::error::AppError;
use super::types::{DecryptedCredentialEnvelope, PayoutEligibility, ProviderToken};

/// Exchanges a decrypted payment credential for a provider token.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Exchange the envelope for a short-lived provider token.
    ///
    /// The single suspension point gating all subsequent steps: eligibility
    /// depends on the returned token, so nothing can run in parallel with it.
    async fn exchange(
        &self,
        envelope: &DecryptedCredentialEnvelope,
    ) -> Result<ProviderToken, AppError>;
}

/// Classifies a tokenized recipient card for a payout scenario.
#[async_trait]
pub trait EligibilityProvider: Send + Sync {
    async fn check_eligibility(
        &self,
        token: &ProviderToken,
        scenario: &str,
    ) -> Result<PayoutEligibility, AppError>;
}

/// Looks up the available balance of a merchant funding account.
#[async_trait]
pub trait BalanceProvider: Send + Sync {
    /// Absence of a matching account is an error, not a zero balance.
    async fn available_balance(&self, account_id: &str) -> Result<Decimal, AppError>;
}
