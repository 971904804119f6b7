use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{HelperError, ValidationError};

/// Credentials from the StockX developer portal, held for the lifetime of the
/// helper process only.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub api_key: String,
}

impl Credentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            api_key: api_key.into(),
        }
    }

    /// Overlays non-empty fields of `other` onto `self`.
    ///
    /// Forms re-submit every field, but the secret input is never echoed back
    /// into the page, so an empty submission keeps what is already stored.
    pub fn merge(&self, other: &Credentials) -> Self {
        let pick = |new: &str, old: &str| {
            if new.trim().is_empty() {
                old.to_string()
            } else {
                new.trim().to_string()
            }
        };
        Self {
            client_id: pick(&other.client_id, &self.client_id),
            client_secret: pick(&other.client_secret, &self.client_secret),
            api_key: pick(&other.api_key, &self.api_key),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &redacted(&self.client_secret))
            .field("api_key", &redacted(&self.api_key))
            .finish()
    }
}

fn redacted(value: &str) -> &'static str {
    if value.is_empty() { "<empty>" } else { "<redacted>" }
}

#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub authorization_url: String,
    pub state: String,
    pub redirect_uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackParams {
    Code { code: String, state: Option<String> },
    Denied { error: String, description: Option<String> },
    Empty,
}

impl CallbackParams {
    pub fn from_url(url: &Url) -> Self {
        let mut code = None;
        let mut state = None;
        let mut error = None;
        let mut description = None;

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" => code = Some(value.into_owned()),
                "state" => state = Some(value.into_owned()),
                "error" => error = Some(value.into_owned()),
                "error_description" => description = Some(value.into_owned()),
                _ => {}
            }
        }

        match (code, error) {
            (Some(code), _) if !code.is_empty() => Self::Code { code, state },
            (_, Some(error)) => Self::Denied { error, description },
            _ => Self::Empty,
        }
    }

    pub fn parse(callback_url: &str) -> Result<Self, HelperError> {
        Ok(Self::from_url(&Url::parse(callback_url)?))
    }

    /// The authorization code, or why there is none.
    pub fn into_code(self) -> Result<String, HelperError> {
        match self {
            Self::Code { code, .. } => Ok(code),
            Self::Denied { error, description } => Err(HelperError::Denied(
                description.filter(|text| !text.is_empty()).unwrap_or(error),
            )),
            Self::Empty => Err(ValidationError::NoAuthorizationCode.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResult {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}
