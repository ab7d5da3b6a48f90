//! Card payout eligibility client.
//!
//! Posts a provider token to the metadata endpoint and resolves the payout
//! classification for one scenario from the double-encoded response.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::domain::{
    AppError, EligibilityError, EligibilityProvider, PayoutEligibility, ProviderToken,
};

use super::{DEFAULT_REQUEST_TIMEOUT, decode_envelope};

/// HTTP client for the provider's card-metadata endpoint.
pub struct CardMetadataClient {
    http_client: Client,
    endpoint: String,
}

impl CardMetadataClient {
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

#[derive(Debug, Serialize)]
struct EligibilityRequest<'a> {
    token: &'a str,
}

/// Inner payload of the metadata response after the double decode.
#[derive(Debug, Deserialize)]
struct CardMetadata {
    card_payouts: Option<HashMap<String, serde_json::Value>>,
}

#[async_trait]
impl EligibilityProvider for CardMetadataClient {
    #[instrument(skip(self, token), fields(scenario = %scenario))]
    async fn check_eligibility(
        &self,
        token: &ProviderToken,
        scenario: &str,
    ) -> Result<PayoutEligibility, AppError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&EligibilityRequest {
                token: token.as_str(),
            })
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Eligibility request failed");
                EligibilityError::Network(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Eligibility service returned error");
            return Err(EligibilityError::Api {
                status_code: status.as_u16(),
                message: body,
            }
            .into());
        }

        let raw = response
            .bytes()
            .await
            .map_err(|e| EligibilityError::Network(e.to_string()))?;
        let metadata: CardMetadata = decode_envelope(&raw).map_err(EligibilityError::from)?;

        let payouts = metadata.card_payouts.ok_or_else(|| EligibilityError::MissingPath {
            path: "card_payouts".to_string(),
        })?;
        let value = payouts
            .get(scenario)
            .and_then(|v| v.as_str())
            .ok_or_else(|| EligibilityError::MissingPath {
                path: format!("card_payouts.{scenario}"),
            })?;

        let eligibility = PayoutEligibility::from_wire(value);
        debug!(eligibility = %eligibility, "Card eligibility resolved");
        Ok(eligibility)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let _client = CardMetadataClient::new("https://payouts.test/card/metadata");
    }

    #[test]
    fn test_card_metadata_inner_shape() {
        let metadata: CardMetadata = serde_json::from_str(
            r#"{"card_payouts": {"domestic_money_transfer": "fast_funds"}, "network": "visa"}"#,
        )
        .unwrap();

        let payouts = metadata.card_payouts.unwrap();
        assert_eq!(
            payouts["domestic_money_transfer"].as_str(),
            Some("fast_funds")
        );
    }

    #[test]
    fn test_card_metadata_tolerates_missing_map() {
        let metadata: CardMetadata = serde_json::from_str(r#"{"network": "visa"}"#).unwrap();
        assert!(metadata.card_payouts.is_none());
    }
}
