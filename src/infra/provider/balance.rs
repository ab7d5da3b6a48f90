//! Funding-account balance client.
//!
//! Fetches the merchant's account list and scans for the configured funding
//! account. The scan tolerates malformed records: a broken unrelated entry
//! must not block finding a later valid match.

use std::str::FromStr;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, error, instrument, warn};

use crate::domain::{AppError, BalanceError, BalanceProvider};

use super::{DEFAULT_REQUEST_TIMEOUT, decode_envelope};

/// HTTP client for the provider's balances endpoint.
pub struct FundingBalanceClient {
    http_client: Client,
    endpoint: String,
}

impl FundingBalanceClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_timeout(endpoint, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout: std::time::Duration) -> Self {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http_client,
            endpoint: endpoint.into(),
        }
    }
}

/// Inner payload of the balances response after the double decode.
///
/// Records stay untyped: each one is inspected individually so a malformed
/// entry only affects itself.
#[derive(Debug, Deserialize)]
struct BalancesBody {
    data: Vec<serde_json::Value>,
}

/// Extract a decimal from a JSON number without a float round trip.
fn decimal_from_json(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    }
}

#[async_trait]
impl BalanceProvider for FundingBalanceClient {
    #[instrument(skip(self))]
    async fn available_balance(&self, account_id: &str) -> Result<Decimal, AppError> {
        let response = self.http_client.get(&self.endpoint).send().await.map_err(|e| {
            error!(error = %e, "Balance request failed");
            BalanceError::Network(e.to_string())
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Balance service returned error");
            return Err(BalanceError::Api {
                status_code: status.as_u16(),
                message: body,
            }
            .into());
        }

        let raw = response
            .bytes()
            .await
            .map_err(|e| BalanceError::Network(e.to_string()))?;
        let body: BalancesBody = decode_envelope(&raw).map_err(BalanceError::from)?;

        let mut matched_malformed = false;
        for record in &body.data {
            let id = record.get("currency_account_id").and_then(|v| v.as_str());
            if id != Some(account_id) {
                continue;
            }

            match record
                .get("balances")
                .and_then(|b| b.get("available"))
                .and_then(decimal_from_json)
            {
                Some(available) => {
                    debug!(available = %available, "Funding account balance resolved");
                    return Ok(available);
                }
                None => {
                    warn!(
                        account_id = %account_id,
                        "Matching account record has a malformed available balance, continuing scan"
                    );
                    matched_malformed = true;
                }
            }
        }

        if matched_malformed {
            Err(BalanceError::MalformedRecord {
                account_id: account_id.to_string(),
            }
            .into())
        } else {
            Err(BalanceError::AccountNotFound(account_id.to_string()).into())
        }
    }
}
