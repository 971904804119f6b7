use std::fmt::Write as _;

use crate::{ApiExample, Phase, Session};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; background: #f5f5f5; margin: 0; }
main { max-width: 760px; margin: 0 auto; padding: 2rem 1rem; }
h1 { text-align: center; }
.card { background: #fff; border-radius: 8px; padding: 1.5rem; margin-bottom: 1.5rem; box-shadow: 0 1px 3px rgba(0,0,0,.1); }
.form-group { margin-bottom: 1rem; display: flex; flex-direction: column; }
.form-group input, textarea { padding: .5rem; font-family: monospace; }
.note { font-size: .85rem; color: #a15c00; }
.code-box, .api-example { background: #eef3f8; padding: 1rem; border-radius: 4px; overflow-wrap: anywhere; }
.error { background: #fdecea; color: #8a1c13; padding: 1rem; border-radius: 4px; margin-bottom: 1.5rem; }
button { padding: .6rem 1.2rem; margin-right: .5rem; cursor: pointer; }
pre { white-space: pre-wrap; margin: 0; }
"#;

/// What the page needs besides the session itself.
pub(super) struct PageView<'a> {
    pub(super) redirect_uri: &'a str,
    pub(super) catalog_url: &'a str,
    /// Set on the load that captured a code; rewrites the address bar.
    pub(super) replace_location: Option<&'a str>,
}

pub(super) fn render(session: &Session, view: &PageView<'_>) -> String {
    let mut html = String::with_capacity(4096);
    let credentials = &session.credentials;

    let _ = write!(
        html,
        r#"<!doctype html>
<html>
  <head>
    <meta charset="utf-8" />
    <title>StockX OAuth Helper</title>
    <style>{STYLE}</style>
  </head>
  <body>
    <main>
      <h1>StockX OAuth Helper</h1>
      <form method="post" action="/authorize">
        <div class="card">
          <h2>Step 1: Enter Your Credentials</h2>
          <p>Enter the credentials from your StockX developer account:</p>
          <div class="form-group">
            <label for="client_id">Client ID:</label>
            <input id="client_id" name="client_id" type="text" value="{client_id}" placeholder="Your StockX Client ID" />
          </div>
          <div class="form-group">
            <label for="client_secret">Client Secret:</label>
            <input id="client_secret" name="client_secret" type="password" placeholder="{secret_placeholder}" />
          </div>
          <div class="form-group">
            <label for="api_key">API Key:</label>
            <input id="api_key" name="api_key" type="text" value="{api_key}" placeholder="Your StockX API Key" />
          </div>
          <div class="form-group">
            <label for="redirect_uri">Redirect URI (automatically set):</label>
            <input id="redirect_uri" type="text" value="{redirect_uri}" readonly />
            <p class="note">Important: Add this exact URL to your StockX application's allowed redirect URIs.</p>
          </div>
        </div>
        <div class="card">
          <h2>Step 2: Authenticate with StockX</h2>
          <button type="submit" formaction="/authorize">Start Authentication</button>
"#,
        client_id = escape(&credentials.client_id),
        api_key = escape(&credentials.api_key),
        redirect_uri = escape(view.redirect_uri),
        secret_placeholder = if credentials.client_secret.is_empty() {
            "Your StockX Client Secret"
        } else {
            "Stored for this session"
        },
    );

    if session.phase == Phase::AwaitingCode {
        html.push_str("          <p>Waiting for StockX to redirect back with an authorization code.</p>\n");
    }

    if let Some(code) = &session.code {
        let _ = write!(
            html,
            r#"          <div class="code-box">
            <p>Authorization Code Received:</p>
            <code>{}</code>
          </div>
"#,
            escape(code)
        );
    }
    html.push_str("        </div>\n");

    if session.code.is_some() {
        let label = if session.is_exchanging() {
            "Exchanging..."
        } else {
            "Get Access Token"
        };
        let _ = write!(
            html,
            r#"        <div class="card">
          <h2>Step 3: Exchange Code for Tokens</h2>
          <button type="submit" formaction="/exchange"{disabled}>{label}</button>
        </div>
"#,
            disabled = if session.can_exchange() { "" } else { " disabled" },
        );
    }
    html.push_str("      </form>\n");

    if let Some(error) = &session.error {
        let _ = write!(
            html,
            "      <div class=\"error\"><p>Error: {}</p></div>\n",
            escape(error)
        );
    }

    if let Some(tokens) = &session.tokens {
        let example = ApiExample::new(
            view.catalog_url,
            tokens.access_token.as_str(),
            credentials.api_key.as_str(),
        );
        let _ = write!(
            html,
            r#"      <div class="card">
        <h2>Your Tokens</h2>
        <h3>Access Token:</h3>
        <textarea readonly rows="3">{access_token}</textarea>
        <h3>Refresh Token:</h3>
        <textarea readonly rows="3">{refresh_token}</textarea>
        <h3>Token Type:</h3>
        <p>{token_type}</p>
        <h3>Expires In:</h3>
        <p>{expires_in} seconds</p>
        <div class="api-example">
          <h3>API Request Example:</h3>
          <pre><code>{curl}</code></pre>
        </div>
      </div>
"#,
            access_token = escape(&tokens.access_token),
            refresh_token = escape(
                tokens
                    .refresh_token
                    .as_deref()
                    .unwrap_or("No refresh token provided")
            ),
            token_type = escape(&tokens.token_type),
            expires_in = tokens.expires_in,
            curl = escape(&example.curl()),
        );
    }

    html.push_str("    </main>\n");
    if let Some(location) = view.replace_location {
        let _ = write!(
            html,
            "    <script>history.replaceState(null, \"\", {});</script>\n",
            js_string(location)
        );
    }
    html.push_str("  </body>\n</html>\n");
    html
}

pub(super) fn not_found() -> String {
    r#"<!doctype html>
<html>
  <head><meta charset="utf-8" /><title>Not found</title></head>
  <body>
    <p>Nothing here. <a href="/">Back to the helper</a>.</p>
  </body>
</html>
"#
    .to_string()
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// JSON string literals are valid JS; `<` is escaped so `</script>` can't end
// the block early.
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string())
        .to_string()
        .replace('<', "\\u003c")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::{Action, Credentials, TokenResult};

    fn view(replace_location: Option<&str>) -> PageView<'_> {
        PageView {
            redirect_uri: "http://localhost:3000",
            catalog_url: "https://api.stockx.com/v2/catalog/products",
            replace_location,
        }
    }

    #[test]
    fn fresh_session_hides_exchange_step() {
        let html = render(&Session::default(), &view(None));
        assert!(html.contains("Start Authentication"));
        assert!(!html.contains("Step 3"));
        assert!(!html.contains("history.replaceState"));
        assert!(html.contains(r#"value="http://localhost:3000""#));
    }

    #[test]
    fn secret_is_never_echoed() {
        let session = Session::new(Credentials::new("id1", "secret1", "key1"));
        let html = render(&session, &view(None));
        assert!(html.contains(r#"value="id1""#));
        assert!(!html.contains("secret1"));
    }

    #[test]
    fn captured_code_renders_exchange_step_and_replace_script() {
        let session = Session::default().reduce(Action::CodeReceived {
            code: "ABC123".to_string(),
            state: None,
        });
        let html = render(&session, &view(Some("/")));
        assert!(html.contains("<code>ABC123</code>"));
        assert!(html.contains("Get Access Token"));
        assert!(html.contains(r#"history.replaceState(null, "", "/");"#));
    }

    #[test]
    fn tokens_render_with_example_request() {
        let session = Session::new(Credentials::new("id1", "secret1", "key1"))
            .reduce(Action::CodeReceived {
                code: "c".to_string(),
                state: None,
            })
            .reduce(Action::ExchangeStarted)
            .reduce(Action::ExchangeSucceeded(TokenResult {
                access_token: "tok<1>".to_string(),
                refresh_token: None,
                token_type: "Bearer".to_string(),
                expires_in: 43200,
                extra: HashMap::new(),
            }));
        let html = render(&session, &view(None));
        assert!(html.contains("tok&lt;1&gt;"));
        assert!(html.contains("No refresh token provided"));
        assert!(html.contains("43200 seconds"));
        assert!(html.contains("Authorization: Bearer tok&lt;1&gt;"));
        assert!(html.contains("x-api-key: key1"));
    }

    #[test]
    fn errors_are_escaped() {
        let session =
            Session::default().reduce(Action::Rejected("<script>alert(1)</script>".to_string()));
        let html = render(&session, &view(None));
        assert!(html.contains("Error: &lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn replace_location_cannot_close_the_script() {
        assert_eq!(js_string("/</script>"), r#""/\u003c/script>""#);
    }
}
