use url::Url;

use crate::HelperError;

/// The loopback origin the helper page is served from. It doubles as the
/// OAuth redirect URI, so the code always comes back to the same place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct HelperOrigin {
    pub(super) scheme: String,
    pub(super) host: String,
    pub(super) port: u16,
}

impl HelperOrigin {
    pub(super) fn parse(origin: &str) -> Result<Self, HelperError> {
        let url = Url::parse(origin)?;
        if url.scheme() != "http" {
            return Err(HelperError::InvalidRedirectUri(
                "helper origin must use http scheme".to_string(),
            ));
        }

        let host = url.host_str().ok_or_else(|| {
            HelperError::InvalidRedirectUri("helper origin is missing host".to_string())
        })?;

        let port = url.port_or_known_default().ok_or_else(|| {
            HelperError::InvalidRedirectUri("helper origin is missing port".to_string())
        })?;

        if url.path() != "/" || url.query().is_some() {
            return Err(HelperError::InvalidRedirectUri(
                "helper origin must not carry a path or query".to_string(),
            ));
        }

        Ok(Self {
            scheme: url.scheme().to_string(),
            host: host.to_string(),
            port,
        })
    }

    /// `scheme://host:port` without a trailing slash.
    pub(super) fn serialize(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    /// Rebuilds the absolute URL a page was requested with.
    pub(super) fn page_url(&self, path: &str, query: &str) -> Result<Url, HelperError> {
        let base = format!("{}{path}", self.serialize());
        if query.is_empty() {
            return Ok(Url::parse(&base)?);
        }
        Ok(Url::parse(&format!("{base}?{query}"))?)
    }
}

#[cfg(test)]
mod tests {
    use super::HelperOrigin;

    #[test]
    fn parses_helper_origin() {
        let origin = HelperOrigin::parse("http://localhost:3000").unwrap();
        assert_eq!(origin.host, "localhost");
        assert_eq!(origin.port, 3000);
        assert_eq!(origin.serialize(), "http://localhost:3000");
    }

    #[test]
    fn rejects_paths_and_tls() {
        assert!(HelperOrigin::parse("http://localhost:3000/callback").is_err());
        assert!(HelperOrigin::parse("https://localhost:3000").is_err());
    }

    #[test]
    fn page_url_keeps_query() {
        let origin = HelperOrigin::parse("http://127.0.0.1:3000").unwrap();
        let url = origin.page_url("/", "code=ABC123&state=s").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:3000/?code=ABC123&state=s");
    }
}
