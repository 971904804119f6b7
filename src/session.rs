//! The helper's in-memory session and its transitions.
//!
//! A [`Session`] is never mutated in place; [`Session::reduce`] consumes it and
//! returns the next one.

use crate::{Credentials, TokenResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    AwaitingCode,
    CodeReceived,
    Exchanging,
    TokenReceived,
    Error,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingCode => "awaiting_code",
            Self::CodeReceived => "code_received",
            Self::Exchanging => "exchanging",
            Self::TokenReceived => "token_received",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    CredentialsEntered(Credentials),
    AuthorizationStarted { state: String },
    CodeReceived { code: String, state: Option<String> },
    ExchangeStarted,
    ExchangeSucceeded(TokenResult),
    ExchangeFailed(String),
    /// A local failure that leaves the phase untouched.
    Rejected(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub phase: Phase,
    pub credentials: Credentials,
    pub code: Option<String>,
    pub pending_state: Option<String>,
    pub returned_state: Option<String>,
    pub tokens: Option<TokenResult>,
    pub error: Option<String>,
}

impl Session {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            ..Self::default()
        }
    }

    pub fn is_exchanging(&self) -> bool {
        self.phase == Phase::Exchanging
    }

    pub fn can_exchange(&self) -> bool {
        matches!(self.phase, Phase::CodeReceived | Phase::Error) && self.code.is_some()
    }

    pub fn reduce(self, action: Action) -> Self {
        match action {
            Action::CredentialsEntered(credentials) => Self {
                credentials,
                ..self
            },
            Action::AuthorizationStarted { state } => Self {
                phase: Phase::AwaitingCode,
                pending_state: Some(state),
                error: None,
                ..self
            },
            // A reload of the callback URL must not reopen the exchange gate.
            Action::CodeReceived { .. } if self.is_exchanging() => self,
            Action::CodeReceived { code, state } => Self {
                phase: Phase::CodeReceived,
                code: Some(code),
                returned_state: state,
                tokens: None,
                error: None,
                ..self
            },
            Action::ExchangeStarted if self.can_exchange() => Self {
                phase: Phase::Exchanging,
                error: None,
                ..self
            },
            Action::ExchangeStarted => self,
            Action::ExchangeSucceeded(tokens) if self.is_exchanging() => Self {
                phase: Phase::TokenReceived,
                tokens: Some(tokens),
                error: None,
                ..self
            },
            Action::ExchangeFailed(message) if self.is_exchanging() => Self {
                phase: Phase::Error,
                error: Some(message),
                ..self
            },
            Action::ExchangeSucceeded(_) | Action::ExchangeFailed(_) => self,
            Action::Rejected(message) => Self {
                error: Some(message),
                ..self
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn token(access_token: &str) -> TokenResult {
        TokenResult {
            access_token: access_token.to_string(),
            refresh_token: None,
            token_type: "Bearer".to_string(),
            expires_in: 3600,
            extra: HashMap::new(),
        }
    }

    fn with_code() -> Session {
        Session::default()
            .reduce(Action::AuthorizationStarted {
                state: "s".to_string(),
            })
            .reduce(Action::CodeReceived {
                code: "ABC123".to_string(),
                state: Some("s".to_string()),
            })
    }

    #[test]
    fn happy_path_walks_every_phase() {
        let session = Session::default();
        assert_eq!(session.phase, Phase::Idle);

        let session = session.reduce(Action::AuthorizationStarted {
            state: "s".to_string(),
        });
        assert_eq!(session.phase, Phase::AwaitingCode);
        assert_eq!(session.pending_state.as_deref(), Some("s"));

        let session = session.reduce(Action::CodeReceived {
            code: "ABC123".to_string(),
            state: Some("s".to_string()),
        });
        assert_eq!(session.phase, Phase::CodeReceived);
        assert_eq!(session.code.as_deref(), Some("ABC123"));

        let session = session.reduce(Action::ExchangeStarted);
        assert_eq!(session.phase, Phase::Exchanging);

        let session = session.reduce(Action::ExchangeSucceeded(token("at")));
        assert_eq!(session.phase, Phase::TokenReceived);
        assert_eq!(session.tokens.unwrap().access_token, "at");
    }

    #[test]
    fn error_allows_retry_with_same_code() {
        let session = with_code()
            .reduce(Action::ExchangeStarted)
            .reduce(Action::ExchangeFailed("invalid_grant".to_string()));
        assert_eq!(session.phase, Phase::Error);
        assert_eq!(session.error.as_deref(), Some("invalid_grant"));
        assert!(session.can_exchange());

        let session = session.reduce(Action::ExchangeStarted);
        assert_eq!(session.phase, Phase::Exchanging);
        assert_eq!(session.error, None);
        assert_eq!(session.code.as_deref(), Some("ABC123"));
    }

    #[test]
    fn exchange_needs_a_code() {
        let session = Session::default().reduce(Action::ExchangeStarted);
        assert_eq!(session.phase, Phase::Idle);
    }

    #[test]
    fn results_outside_an_exchange_are_ignored() {
        let session = with_code().reduce(Action::ExchangeSucceeded(token("late")));
        assert_eq!(session.phase, Phase::CodeReceived);
        assert_eq!(session.tokens, None);
    }

    #[test]
    fn code_arriving_mid_exchange_is_ignored() {
        let session = with_code().reduce(Action::ExchangeStarted);
        let session = session.reduce(Action::CodeReceived {
            code: "OTHER".to_string(),
            state: None,
        });
        assert_eq!(session.phase, Phase::Exchanging);
        assert_eq!(session.code.as_deref(), Some("ABC123"));
        assert!(!session.can_exchange());
    }

    #[test]
    fn local_rejection_keeps_phase() {
        let session = with_code().reduce(Action::Rejected("Client ID is required".to_string()));
        assert_eq!(session.phase, Phase::CodeReceived);
        assert_eq!(session.error.as_deref(), Some("Client ID is required"));
    }

    #[test]
    fn credentials_survive_transitions() {
        let credentials = Credentials::new("id1", "secret1", "key1");
        let session = Session::new(credentials.clone())
            .reduce(Action::AuthorizationStarted {
                state: "s".to_string(),
            })
            .reduce(Action::CodeReceived {
                code: "c".to_string(),
                state: None,
            });
        assert_eq!(session.credentials, credentials);
    }
}
