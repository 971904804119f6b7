use url::Url;

use crate::{CallbackParams, HelperError, Navigator, ValidationError};

/// Query parameters that never stay in the visible address.
const STRIPPED_PARAMS: &[&str] = &["code", "state", "error", "error_description"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedCode {
    pub code: String,
    pub state: Option<String>,
}

/// One-shot capture of the authorization code from the URL a page was loaded
/// with.
#[derive(Debug, Default)]
pub struct CodeReceiver {
    consumed: bool,
}

impl CodeReceiver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Inspects `current` once. Returns the code when one is present and asks
    /// the navigator to drop it from the address bar. Later calls on the same
    /// receiver return `None` without touching the navigator.
    pub fn receive<N: Navigator + ?Sized>(
        &mut self,
        current: &Url,
        navigator: &mut N,
    ) -> Result<Option<CapturedCode>, HelperError> {
        if self.consumed {
            return Ok(None);
        }
        self.consumed = true;

        match CallbackParams::from_url(current) {
            CallbackParams::Code { code, state } => {
                navigator.replace(&stripped_location(current))?;
                tracing::info!("authorization code received");
                Ok(Some(CapturedCode { code, state }))
            }
            _ => Ok(None),
        }
    }
}

/// Path plus remaining query of `url` with the callback parameters removed.
pub fn stripped_location(url: &Url) -> String {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .into_owned()
        .filter(|(key, _)| !STRIPPED_PARAMS.contains(&key.as_str()))
        .collect();

    if kept.is_empty() {
        return url.path().to_string();
    }

    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(kept)
        .finish();
    format!("{}?{query}", url.path())
}

/// Compares the returned state with the one generated when authorization
/// started. Only called when verification is switched on.
pub fn verify_state(expected: Option<&str>, received: Option<&str>) -> Result<(), HelperError> {
    match (expected, received) {
        (Some(expected), Some(received)) if expected == received => Ok(()),
        (expected, received) => Err(ValidationError::StateMismatch {
            expected: expected.unwrap_or_default().to_string(),
            received: received.unwrap_or_default().to_string(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PageNavigator;

    #[test]
    fn captures_code_once_and_strips_it() {
        let url = Url::parse("http://localhost:3000/?code=ABC123").unwrap();
        let mut receiver = CodeReceiver::new();
        let mut navigator = PageNavigator::new();

        let captured = receiver.receive(&url, &mut navigator).unwrap();
        assert_eq!(
            captured,
            Some(CapturedCode {
                code: "ABC123".to_string(),
                state: None,
            })
        );
        assert_eq!(navigator.replaced(), Some("/"));

        let again = receiver.receive(&url, &mut navigator).unwrap();
        assert_eq!(again, None);
        assert_eq!(navigator.directives().len(), 1);
    }

    #[test]
    fn no_code_leaves_the_address_alone() {
        let url = Url::parse("http://localhost:3000/?tab=tokens").unwrap();
        let mut receiver = CodeReceiver::new();
        let mut navigator = PageNavigator::new();

        assert_eq!(receiver.receive(&url, &mut navigator).unwrap(), None);
        assert!(navigator.directives().is_empty());
        assert!(receiver.is_consumed());
    }

    #[test]
    fn stripping_keeps_unrelated_params() {
        let url = Url::parse("http://localhost:3000/?code=c&state=s&tab=tokens").unwrap();
        assert_eq!(stripped_location(&url), "/?tab=tokens");
    }

    #[test]
    fn state_verification_requires_exact_match() {
        assert!(verify_state(Some("s1"), Some("s1")).is_ok());
        assert!(matches!(
            verify_state(Some("s1"), Some("s2")),
            Err(HelperError::Validation(ValidationError::StateMismatch { .. }))
        ));
        assert!(verify_state(Some("s1"), None).is_err());
        assert!(verify_state(None, Some("s1")).is_err());
    }

    #[test]
    fn helpers_are_reachable_from_the_crate_root() {
        let url = Url::parse("http://localhost:3000/?error=access_denied").unwrap();
        assert_eq!(crate::stripped_location(&url), "/");
        assert!(crate::verify_state(Some("s1"), Some("s1")).is_ok());
    }
}
