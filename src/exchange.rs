use std::time::Duration;

use reqwest::{Client, header::ACCEPT};
use serde::Deserialize;

use crate::error::EXCHANGE_FALLBACK_MESSAGE;
use crate::{HelperError, ProviderConfig, TokenResult, ValidationError};

const GRANT_TYPE: &str = "authorization_code";

/// Inputs of one authorization-code exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct ExchangeRequest {
    pub code: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl ExchangeRequest {
    pub fn new(
        code: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let missing: Vec<&'static str> = [
            ("authorization code", &self.code),
            ("client ID", &self.client_id),
            ("client secret", &self.client_secret),
            ("redirect URI", &self.redirect_uri),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingFields(missing))
        }
    }

    /// Form fields in the order the token endpoint receives them.
    pub fn form_pairs(&self) -> [(&'static str, &str); 5] {
        [
            ("grant_type", GRANT_TYPE),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("code", &self.code),
            ("redirect_uri", &self.redirect_uri),
        ]
    }

    pub fn form_body(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.form_pairs())
            .finish()
    }
}

impl std::fmt::Debug for ExchangeRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeRequest")
            .field("client_id", &self.client_id)
            .field("redirect_uri", &self.redirect_uri)
            .finish_non_exhaustive()
    }
}

/// Posts authorization codes to the provider's token endpoint.
#[derive(Debug, Clone)]
pub struct TokenExchanger {
    provider: ProviderConfig,
    http: Client,
}

impl TokenExchanger {
    pub fn new(provider: ProviderConfig) -> Result<Self, HelperError> {
        Self::with_timeout(provider, None)
    }

    pub fn with_timeout(
        provider: ProviderConfig,
        timeout: Option<Duration>,
    ) -> Result<Self, HelperError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self { provider, http })
    }

    pub fn with_http_client(provider: ProviderConfig, http: Client) -> Self {
        Self { provider, http }
    }

    pub fn provider(&self) -> &ProviderConfig {
        &self.provider
    }

    /// Performs exactly one exchange attempt. Validation failures return
    /// before any request is built.
    pub async fn exchange(&self, request: &ExchangeRequest) -> Result<TokenResult, HelperError> {
        request.validate()?;

        tracing::info!(token_url = %self.provider.token_url, "exchanging authorization code");
        let response = self
            .http
            .post(&self.provider.token_url)
            .header(ACCEPT, "application/json")
            .form(&request.form_pairs()[..])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message_from_body(&body);
            tracing::warn!(status = status.as_u16(), %message, "token endpoint rejected exchange");
            return Err(HelperError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let token: TokenResult =
            serde_json::from_str(&body).map_err(|err| HelperError::InvalidResponse {
                message: err.to_string(),
                body,
            })?;

        tracing::info!(
            token_type = %token.token_type,
            expires_in = token.expires_in,
            has_refresh_token = token.refresh_token.is_some(),
            "token exchange succeeded"
        );
        Ok(token)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<serde_json::Value>,
    error_description: Option<serde_json::Value>,
}

/// `error_description`, then `error`, then a fixed fallback.
pub fn error_message_from_body(body: &str) -> String {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    [parsed.error_description, parsed.error]
        .into_iter()
        .flatten()
        .find_map(|value| match value {
            serde_json::Value::String(text) if !text.is_empty() => Some(text),
            _ => None,
        })
        .unwrap_or_else(|| EXCHANGE_FALLBACK_MESSAGE.to_string())
}
