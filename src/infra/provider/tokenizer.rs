//! Token-exchange client.
//!
//! Exchanges a decrypted wallet credential for a short-lived provider token
//! via an authenticated POST to the token service.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::domain::{
    AppError, CredentialHeader, DecryptedCredentialEnvelope, ProviderToken, TokenError,
    TokenProvider,
};

use super::DEFAULT_REQUEST_TIMEOUT;

/// HTTP client for the provider's token-exchange endpoint.
pub struct TokenExchangeClient {
    http_client: Client,
    endpoint: String,
    api_key: SecretString,
}

impl TokenExchangeClient {
    /// Create a client for the given endpoint, authenticating with the
    /// merchant's public API key.
    pub fn new(endpoint: impl Into<String>, api_key: SecretString) -> Self {
        Self::with_timeout(endpoint, api_key, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        endpoint: impl Into<String>,
        api_key: SecretString,
        timeout: std::time::Duration,
    ) -> Self {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http_client,
            endpoint: endpoint.into(),
            api_key,
        }
    }
}

#[derive(Debug, Serialize)]
struct TokenExchangeRequest<'a> {
    r#type: &'static str,
    token_data: TokenData<'a>,
}

#[derive(Debug, Serialize)]
struct TokenData<'a> {
    version: &'a str,
    data: &'a str,
    signature: &'a str,
    header: HeaderData<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HeaderData<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    ephemeral_public_key: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    wrapped_key: Option<&'a str>,
    public_key_hash: &'a str,
    transaction_id: &'a str,
}

impl<'a> TokenExchangeRequest<'a> {
    fn from_envelope(envelope: &'a DecryptedCredentialEnvelope) -> Self {
        let header = match &envelope.header {
            CredentialHeader::EllipticCurve {
                ephemeral_public_key,
                public_key_hash,
                transaction_id,
            } => HeaderData {
                ephemeral_public_key: Some(ephemeral_public_key),
                wrapped_key: None,
                public_key_hash,
                transaction_id,
            },
            CredentialHeader::Rsa {
                wrapped_key,
                public_key_hash,
                transaction_id,
            } => HeaderData {
                ephemeral_public_key: None,
                wrapped_key: Some(wrapped_key),
                public_key_hash,
                transaction_id,
            },
        };

        Self {
            r#type: "applepay",
            token_data: TokenData {
                version: &envelope.version,
                data: &envelope.data,
                signature: &envelope.signature,
                header,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenExchangeResponse {
    token: Option<String>,
}

#[async_trait]
impl TokenProvider for TokenExchangeClient {
    #[instrument(skip(self, envelope), fields(transaction_id = %envelope.header.transaction_id()))]
    async fn exchange(
        &self,
        envelope: &DecryptedCredentialEnvelope,
    ) -> Result<ProviderToken, AppError> {
        let request = TokenExchangeRequest::from_envelope(envelope);

        let response = self
            .http_client
            .post(&self.endpoint)
            .header("Authorization", self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Token exchange request failed");
                TokenError::Network(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Token service returned error");
            return Err(TokenError::Api {
                status_code: status.as_u16(),
                message: body,
            }
            .into());
        }

        let decoded: TokenExchangeResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse token exchange response");
            TokenError::Parse(e.to_string())
        })?;

        let token = ProviderToken::new(decoded.token.ok_or(TokenError::MissingToken)?);
        debug!(token = %token, "Token exchange complete");
        Ok(token)
    }
}
