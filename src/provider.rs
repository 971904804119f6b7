const AUTHORIZE_URL: &str = "https://accounts.stockx.com/authorize";
const TOKEN_URL: &str = "https://accounts.stockx.com/oauth/token";
const CATALOG_URL: &str = "https://api.stockx.com/v2/catalog/products";

const DEFAULT_SCOPE: &str = "offline_access openid";
const DEFAULT_AUDIENCE: &str = "gateway.stockx.com";
const DEFAULT_STATE_PREFIX: &str = "stockx-auth-";

/// Endpoints and fixed parameters of the StockX identity provider.
///
/// The overrides exist for pointing the helper at a staging tenant or a mock
/// server; the defaults are what the production gateway expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub authorize_url: String,
    pub token_url: String,
    pub scope: String,
    pub audience: String,
    pub state_prefix: String,
    pub catalog_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            authorize_url: AUTHORIZE_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            audience: DEFAULT_AUDIENCE.to_string(),
            state_prefix: DEFAULT_STATE_PREFIX.to_string(),
            catalog_url: CATALOG_URL.to_string(),
        }
    }
}

impl ProviderConfig {
    pub fn stockx() -> Self {
        Self::default()
    }

    pub fn with_authorize_url(mut self, authorize_url: impl Into<String>) -> Self {
        self.authorize_url = authorize_url.into();
        self
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }

    pub fn with_state_prefix(mut self, state_prefix: impl Into<String>) -> Self {
        self.state_prefix = state_prefix.into();
        self
    }

    pub fn with_catalog_url(mut self, catalog_url: impl Into<String>) -> Self {
        self.catalog_url = catalog_url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::ProviderConfig;

    #[test]
    fn defaults_target_stockx_gateway() {
        let provider = ProviderConfig::stockx();
        assert_eq!(provider.authorize_url, "https://accounts.stockx.com/authorize");
        assert_eq!(provider.token_url, "https://accounts.stockx.com/oauth/token");
        assert_eq!(provider.scope, "offline_access openid");
        assert_eq!(provider.audience, "gateway.stockx.com");
    }

    #[test]
    fn overrides_replace_only_the_named_field() {
        let provider = ProviderConfig::stockx().with_token_url("http://127.0.0.1:9999/oauth/token");
        assert_eq!(provider.token_url, "http://127.0.0.1:9999/oauth/token");
        assert_eq!(provider.authorize_url, ProviderConfig::default().authorize_url);
    }
}
