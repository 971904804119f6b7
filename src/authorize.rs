use url::Url;

use crate::nonce::generate_state;
use crate::{AuthorizationRequest, HelperError, Navigator, ProviderConfig, ValidationError};

/// Builds the authorization-endpoint URL for `client_id`.
pub fn authorization_request(
    provider: &ProviderConfig,
    client_id: &str,
    redirect_uri: &str,
) -> Result<AuthorizationRequest, HelperError> {
    let client_id = client_id.trim();
    if client_id.is_empty() {
        return Err(ValidationError::MissingClientId.into());
    }

    let state = generate_state(&provider.state_prefix);
    let mut url = Url::parse(&provider.authorize_url)?;
    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("scope", &provider.scope)
        .append_pair("audience", &provider.audience)
        .append_pair("state", &state);

    Ok(AuthorizationRequest {
        authorization_url: url.to_string(),
        state,
        redirect_uri: redirect_uri.to_string(),
    })
}

/// Builds the authorization URL and sends the browsing context there.
///
/// Nothing is navigated when validation fails.
pub fn start_authorization<N: Navigator + ?Sized>(
    provider: &ProviderConfig,
    client_id: &str,
    redirect_uri: &str,
    navigator: &mut N,
) -> Result<AuthorizationRequest, HelperError> {
    let request = authorization_request(provider, client_id, redirect_uri)?;
    let url = Url::parse(&request.authorization_url)?;
    navigator.assign(&url)?;
    tracing::info!(
        authorize_url = %provider.authorize_url,
        redirect_uri,
        "redirecting to authorization endpoint"
    );
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PageNavigator;

    #[test]
    fn authorization_url_includes_required_params_in_order() {
        let provider = ProviderConfig::stockx();
        let request =
            authorization_request(&provider, "client-id", "http://localhost:3000").unwrap();

        let url = Url::parse(&request.authorization_url).unwrap();
        assert_eq!(url.host_str(), Some("accounts.stockx.com"));
        assert_eq!(url.path(), "/authorize");

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let keys: Vec<&str> = pairs.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(
            keys,
            [
                "response_type",
                "client_id",
                "redirect_uri",
                "scope",
                "audience",
                "state"
            ]
        );
        assert_eq!(pairs[0].1, "code");
        assert_eq!(pairs[1].1, "client-id");
        assert_eq!(pairs[2].1, "http://localhost:3000");
        assert_eq!(pairs[3].1, "offline_access openid");
        assert_eq!(pairs[4].1, "gateway.stockx.com");
        assert_eq!(pairs[5].1, request.state);
        assert!(request.state.starts_with("stockx-auth-"));
    }

    #[test]
    fn each_request_gets_a_fresh_state() {
        let provider = ProviderConfig::stockx();
        let first = authorization_request(&provider, "id", "http://localhost:3000").unwrap();
        let second = authorization_request(&provider, "id", "http://localhost:3000").unwrap();
        assert_ne!(first.state, second.state);
    }

    #[test]
    fn empty_client_id_never_navigates() {
        let provider = ProviderConfig::stockx();
        for client_id in ["", "   ", "\t"] {
            let mut navigator = PageNavigator::new();
            let result =
                start_authorization(&provider, client_id, "http://localhost:3000", &mut navigator);
            assert!(matches!(
                result,
                Err(HelperError::Validation(ValidationError::MissingClientId))
            ));
            assert!(navigator.directives().is_empty());
        }
    }

    #[test]
    fn start_authorization_assigns_the_built_url() {
        let provider = ProviderConfig::stockx();
        let mut navigator = PageNavigator::new();
        let request =
            start_authorization(&provider, "id1", "http://localhost:3000", &mut navigator).unwrap();
        assert_eq!(
            navigator.assigned(),
            Some(request.authorization_url.as_str())
        );
    }
}
