use std::fmt;

/// A ready-to-copy request against the catalog API, authenticated with the
/// freshly issued token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiExample {
    pub url: String,
    pub access_token: String,
    pub api_key: String,
}

impl ApiExample {
    pub fn new(
        url: impl Into<String>,
        access_token: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            access_token: access_token.into(),
            api_key: api_key.into(),
        }
    }

    pub fn headers(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Content-Type", "application/json".to_string()),
            ("Authorization", format!("Bearer {}", self.access_token)),
            ("x-api-key", self.api_key.clone()),
        ]
    }

    pub fn curl(&self) -> String {
        let mut lines = vec![format!(
            "curl --location --request GET '{}'",
            shell_quote_inner(&self.url)
        )];
        for (name, value) in self.headers() {
            lines.push(format!(
                "--header '{name}: {}'",
                shell_quote_inner(&value)
            ));
        }
        lines.join(" \\\n  ")
    }
}

impl fmt::Display for ApiExample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.curl())
    }
}

// Escapes for use inside a single-quoted shell word.
fn shell_quote_inner(value: &str) -> String {
    value.replace('\'', r"'\''")
}
