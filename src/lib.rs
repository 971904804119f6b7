//! OAuth 2.0 authorization-code helper for the StockX API.
//!
//! Builds the authorization redirect, captures the returned code, exchanges it
//! for a bearer token and renders a ready-to-copy catalog request. Tokens and
//! credentials live in memory only; refresh and storage are left to the
//! caller.

mod authorize;
mod callback;
mod error;
mod exchange;
#[cfg(feature = "local-server")]
mod local_server;
mod navigation;
mod nonce;
mod provider;
mod session;
mod snippet;
mod types;

pub use authorize::{authorization_request, start_authorization};
pub use callback::{CapturedCode, CodeReceiver, stripped_location, verify_state};
pub use error::{ErrorKind, HelperError, ValidationError};
pub use exchange::{ExchangeRequest, TokenExchanger, error_message_from_body};
#[cfg(feature = "local-server")]
pub use local_server::{DEFAULT_HOST, DEFAULT_PORT, HelperServer, LocalServerConfig};
#[cfg(feature = "cli")]
pub use navigation::BrowserNavigator;
pub use navigation::{NavigationDirective, Navigator, PageNavigator};
pub use provider::ProviderConfig;
pub use session::{Action, Phase, Session};
pub use snippet::ApiExample;
pub use types::{AuthorizationRequest, CallbackParams, Credentials, TokenResult};
