//! Application entry point.
//!
//! Wires environment configuration to the real provider clients and drives
//! one payout authorization attempt to its decision.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use rust_decimal::Decimal;
use secrecy::SecretString;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use payout_authorizer::app::{NameCheckPolicy, PayoutOrchestrator};
use payout_authorizer::domain::{PaymentCredential, PayoutRequest};
use payout_authorizer::infra::{CardMetadataClient, FundingBalanceClient, TokenExchangeClient};

/// Application configuration
struct Config {
    token_service_url: String,
    metadata_service_url: String,
    balances_service_url: String,
    api_key: SecretString,
    /// Merchant identifier, logged for traceability only
    merchant_id: String,
    funding_account_id: String,
    scenario: String,
    amount: Decimal,
    currency: String,
    region: String,
    supported_networks: Vec<String>,
    /// Path to the raw encrypted credential captured from the wallet
    credential_path: PathBuf,
    recipient_given_name: Option<String>,
    recipient_family_name: Option<String>,
    fail_fast_name_check: bool,
}

impl Config {
    fn from_env() -> Result<Self> {
        let token_service_url =
            env::var("TOKEN_SERVICE_URL").context("TOKEN_SERVICE_URL not set")?;
        let metadata_service_url =
            env::var("METADATA_SERVICE_URL").context("METADATA_SERVICE_URL not set")?;
        let balances_service_url =
            env::var("BALANCES_SERVICE_URL").context("BALANCES_SERVICE_URL not set")?;
        let api_key = Self::load_api_key()?;
        let funding_account_id =
            env::var("FUNDING_ACCOUNT_ID").context("FUNDING_ACCOUNT_ID not set")?;

        let merchant_id =
            env::var("MERCHANT_ID").unwrap_or_else(|_| "merchant.demo.payout".to_string());
        let scenario = env::var("PAYOUT_SCENARIO")
            .unwrap_or_else(|_| "domestic_money_transfer".to_string());
        let amount = match env::var("TRANSACTION_AMOUNT") {
            Ok(raw) => raw
                .parse::<Decimal>()
                .context("TRANSACTION_AMOUNT is not a valid decimal amount")?,
            Err(_) => Decimal::new(999, 2),
        };
        let currency = env::var("PAYOUT_CURRENCY").unwrap_or_else(|_| "USD".to_string());
        let region = env::var("PAYOUT_REGION").unwrap_or_else(|_| "US".to_string());
        let supported_networks = env::var("SUPPORTED_CARD_NETWORKS")
            .unwrap_or_else(|_| "visa,mastercard".to_string())
            .split(',')
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();

        let credential_path: PathBuf = env::var("CREDENTIAL_PATH")
            .unwrap_or_else(|_| "payment-credential.json".to_string())
            .into();
        let recipient_given_name = env::var("RECIPIENT_GIVEN_NAME")
            .ok()
            .filter(|s| !s.is_empty());
        let recipient_family_name = env::var("RECIPIENT_FAMILY_NAME")
            .ok()
            .filter(|s| !s.is_empty());
        let fail_fast_name_check = env::var("NAME_CHECK_FAIL_FAST")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Ok(Self {
            token_service_url,
            metadata_service_url,
            balances_service_url,
            api_key,
            merchant_id,
            funding_account_id,
            scenario,
            amount,
            currency,
            region,
            supported_networks,
            credential_path,
            recipient_given_name,
            recipient_family_name,
            fail_fast_name_check,
        })
    }

    fn load_api_key() -> Result<SecretString> {
        let key = env::var("PAYOUT_API_KEY").context("PAYOUT_API_KEY not set")?;
        if key.is_empty() {
            anyhow::bail!("PAYOUT_API_KEY environment variable is empty");
        }
        Ok(SecretString::from(key))
    }
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_tracing();

    info!("Payout authorizer v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    info!(
        merchant = %config.merchant_id,
        region = %config.region,
        currency = %config.currency,
        networks = ?config.supported_networks,
        "Merchant profile loaded"
    );

    let credential = tokio::fs::read(&config.credential_path)
        .await
        .with_context(|| {
            format!(
                "Failed to read payment credential from {}",
                config.credential_path.display()
            )
        })?;

    let token_provider = Arc::new(TokenExchangeClient::new(
        &config.token_service_url,
        config.api_key,
    ));
    let eligibility_provider = Arc::new(CardMetadataClient::new(&config.metadata_service_url));
    let balance_provider = Arc::new(FundingBalanceClient::new(&config.balances_service_url));

    let policy = if config.fail_fast_name_check {
        NameCheckPolicy::FailFast
    } else {
        NameCheckPolicy::RecordAndContinue
    };
    let orchestrator =
        PayoutOrchestrator::new(token_provider, eligibility_provider, balance_provider)
            .with_name_check_policy(policy);

    let request = PayoutRequest {
        recipient_given_name: config.recipient_given_name,
        recipient_family_name: config.recipient_family_name,
        credential: PaymentCredential::new(credential),
        funding_account_id: config.funding_account_id,
        scenario: config.scenario,
        amount: config.amount,
    };

    let decision = orchestrator.authorize(request).await;

    if decision.is_approved() {
        info!(status = %decision.status, "Payout authorized");
        Ok(())
    } else {
        for error in &decision.errors {
            warn!(error = %error, "Authorization error");
        }
        anyhow::bail!("payout declined with {} error(s)", decision.errors.len())
    }
}
