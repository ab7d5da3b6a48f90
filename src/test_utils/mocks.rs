//! Mock implementations for testing.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{
    AppError, BalanceError, BalanceProvider, DecryptedCredentialEnvelope, EligibilityError,
    EligibilityProvider, PayoutEligibility, ProviderToken, TokenError, TokenProvider,
};

/// Configuration for mock behavior
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    pub should_fail: bool,
    pub error_message: Option<String>,
}

impl MockConfig {
    #[must_use]
    pub fn success() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            should_fail: true,
            error_message: Some(message.into()),
        }
    }

    fn message(&self) -> String {
        self.error_message
            .clone()
            .unwrap_or_else(|| "Mock error".to_string())
    }
}

/// Mock token provider for testing
pub struct MockTokenProvider {
    token: String,
    config: MockConfig,
    exchanges: Arc<Mutex<Vec<String>>>,
}

impl MockTokenProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MockConfig::success())
    }

    #[must_use]
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            token: "tok_mock_7f3a".to_string(),
            config,
            exchanges: Arc::new(Mutex::new(Vec::new())),
        }
    }

    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Self::new()
        }
    }

    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_config(MockConfig::failure(message))
    }

    /// Transaction ids of every envelope exchanged (for testing)
    pub fn exchanges(&self) -> Vec<String> {
        self.exchanges.lock().unwrap().clone()
    }
}

impl Default for MockTokenProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenProvider for MockTokenProvider {
    async fn exchange(
        &self,
        envelope: &DecryptedCredentialEnvelope,
    ) -> Result<ProviderToken, AppError> {
        if self.config.should_fail {
            return Err(TokenError::Network(self.config.message()).into());
        }
        self.exchanges
            .lock()
            .unwrap()
            .push(envelope.header.transaction_id().to_string());
        Ok(ProviderToken::new(self.token.clone()))
    }
}

/// Mock eligibility provider for testing
pub struct MockEligibilityProvider {
    eligibility: PayoutEligibility,
    config: MockConfig,
    checks: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockEligibilityProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::with_eligibility(PayoutEligibility::Standard)
    }

    #[must_use]
    pub fn with_eligibility(eligibility: PayoutEligibility) -> Self {
        Self {
            eligibility,
            config: MockConfig::success(),
            checks: Arc::new(Mutex::new(Vec::new())),
        }
    }

    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            eligibility: PayoutEligibility::Standard,
            config: MockConfig::failure(message),
            checks: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// (token, scenario) pairs of every check performed (for testing)
    pub fn checks(&self) -> Vec<(String, String)> {
        self.checks.lock().unwrap().clone()
    }
}

impl Default for MockEligibilityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EligibilityProvider for MockEligibilityProvider {
    async fn check_eligibility(
        &self,
        token: &ProviderToken,
        scenario: &str,
    ) -> Result<PayoutEligibility, AppError> {
        if self.config.should_fail {
            return Err(EligibilityError::Network(self.config.message()).into());
        }
        self.checks
            .lock()
            .unwrap()
            .push((token.as_str().to_string(), scenario.to_string()));
        Ok(self.eligibility.clone())
    }
}

/// Mock balance provider for testing
pub struct MockBalanceProvider {
    available: Decimal,
    config: MockConfig,
    lookups: Arc<Mutex<Vec<String>>>,
}

impl MockBalanceProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::with_available(Decimal::ONE_HUNDRED)
    }

    #[must_use]
    pub fn with_available(available: Decimal) -> Self {
        Self {
            available,
            config: MockConfig::success(),
            lookups: Arc::new(Mutex::new(Vec::new())),
        }
    }

    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            available: Decimal::ZERO,
            config: MockConfig::failure(message),
            lookups: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Account ids of every lookup performed (for testing)
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

impl Default for MockBalanceProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BalanceProvider for MockBalanceProvider {
    async fn available_balance(&self, account_id: &str) -> Result<Decimal, AppError> {
        if self.config.should_fail {
            return Err(BalanceError::Network(self.config.message()).into());
        }
        self.lookups.lock().unwrap().push(account_id.to_string());
        Ok(self.available)
    }
}
