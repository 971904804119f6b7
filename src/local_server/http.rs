use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    Form,
    extract::{RawQuery, State},
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::callback::{CodeReceiver, stripped_location, verify_state};
use crate::{
    Action, CallbackParams, Credentials, ExchangeRequest, HelperError, Navigator, PageNavigator,
    ProviderConfig, Session, TokenExchanger, ValidationError, start_authorization,
};

use super::page::{self, PageView};
use super::target::HelperOrigin;

pub(super) type SharedSession = Arc<Mutex<Session>>;

#[derive(Clone)]
pub(super) struct HelperState {
    pub(super) origin: HelperOrigin,
    pub(super) provider: ProviderConfig,
    pub(super) exchanger: TokenExchanger,
    pub(super) verify_state: bool,
    pub(super) session: SharedSession,
}

impl HelperState {
    fn redirect_uri(&self) -> String {
        self.origin.serialize()
    }
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct CredentialsForm {
    #[serde(default)]
    client_id: String,
    #[serde(default)]
    client_secret: String,
    #[serde(default)]
    api_key: String,
}

impl From<CredentialsForm> for Credentials {
    fn from(form: CredentialsForm) -> Self {
        Credentials::new(form.client_id, form.client_secret, form.api_key)
    }
}

/// Applies `action` and returns a snapshot of the resulting session.
pub(super) fn dispatch(session: &SharedSession, action: Action) -> Session {
    let mut guard = session.lock().unwrap_or_else(PoisonError::into_inner);
    let current = std::mem::take(&mut *guard);
    *guard = current.reduce(action);
    guard.clone()
}

pub(super) fn snapshot(session: &SharedSession) -> Session {
    session
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

fn submit_credentials(state: &HelperState, form: CredentialsForm) -> Session {
    let submitted = Credentials::from(form);
    let mut guard = state.session.lock().unwrap_or_else(PoisonError::into_inner);
    let merged = guard.credentials.merge(&submitted);
    let current = std::mem::take(&mut *guard);
    *guard = current.reduce(Action::CredentialsEntered(merged));
    guard.clone()
}

fn reject(state: &HelperState, error: &HelperError) {
    tracing::debug!(kind = ?error.kind(), %error, "request refused");
    dispatch(&state.session, Action::Rejected(error.to_string()));
}

pub(super) async fn index_handler(
    State(state): State<HelperState>,
    uri: Uri,
    RawQuery(query): RawQuery,
) -> Response {
    let query = query.unwrap_or_default();
    let current = match state.origin.page_url(uri.path(), &query) {
        Ok(url) => url,
        Err(error) => {
            reject(&state, &error);
            return render_page(&state, None).into_response();
        }
    };

    let mut navigator = PageNavigator::new();
    let mut receiver = CodeReceiver::new();
    match receiver.receive(&current, &mut navigator) {
        Ok(Some(captured)) => {
            let pending = snapshot(&state.session).pending_state;
            let verified = if state.verify_state {
                verify_state(pending.as_deref(), captured.state.as_deref())
            } else {
                Ok(())
            };
            match verified {
                Ok(()) => {
                    dispatch(
                        &state.session,
                        Action::CodeReceived {
                            code: captured.code,
                            state: captured.state,
                        },
                    );
                }
                Err(error) => reject(&state, &error),
            }
        }
        Ok(None) => {
            if let denied @ CallbackParams::Denied { .. } = CallbackParams::from_url(&current) {
                if let Err(error) = denied.into_code() {
                    tracing::warn!(%error, "provider denied authorization");
                    reject(&state, &error);
                }
                if let Err(error) = navigator.replace(&stripped_location(&current)) {
                    reject(&state, &error);
                }
            }
        }
        Err(error) => reject(&state, &error),
    }

    render_page(&state, navigator.replaced()).into_response()
}

pub(super) async fn authorize_handler(
    State(state): State<HelperState>,
    Form(form): Form<CredentialsForm>,
) -> Redirect {
    let session = submit_credentials(&state, form);
    let mut navigator = PageNavigator::new();

    match start_authorization(
        &state.provider,
        &session.credentials.client_id,
        &state.redirect_uri(),
        &mut navigator,
    ) {
        Ok(request) => {
            dispatch(
                &state.session,
                Action::AuthorizationStarted {
                    state: request.state,
                },
            );
            match navigator.assigned() {
                Some(url) => Redirect::to(url),
                None => Redirect::to("/"),
            }
        }
        Err(error) => {
            reject(&state, &error);
            Redirect::to("/")
        }
    }
}

pub(super) async fn exchange_handler(
    State(state): State<HelperState>,
    Form(form): Form<CredentialsForm>,
) -> Redirect {
    let request = match begin_exchange(&state, form.into()) {
        Ok(request) => request,
        Err(error) => {
            reject(&state, &error);
            return Redirect::to("/");
        }
    };

    match state.exchanger.exchange(&request).await {
        Ok(tokens) => {
            dispatch(&state.session, Action::ExchangeSucceeded(tokens));
        }
        Err(error) => {
            tracing::debug!(kind = ?error.kind(), "token exchange failed");
            dispatch(&state.session, Action::ExchangeFailed(error.to_string()));
        }
    }
    Redirect::to("/")
}

/// Checks and enters `Exchanging` under one lock so overlapping triggers
/// cannot both pass. The lock is released before the network call.
fn begin_exchange(
    state: &HelperState,
    submitted: Credentials,
) -> Result<ExchangeRequest, HelperError> {
    let mut guard = state.session.lock().unwrap_or_else(PoisonError::into_inner);
    let credentials = guard.credentials.merge(&submitted);
    let current = std::mem::take(&mut *guard);
    *guard = current.reduce(Action::CredentialsEntered(credentials));

    if guard.is_exchanging() {
        return Err(ValidationError::ExchangeInFlight.into());
    }
    let code = guard
        .code
        .clone()
        .ok_or(ValidationError::NoAuthorizationCode)?;
    let request = ExchangeRequest::new(
        code,
        guard.credentials.client_id.as_str(),
        guard.credentials.client_secret.as_str(),
        state.redirect_uri(),
    );
    request.validate()?;

    let current = std::mem::take(&mut *guard);
    *guard = current.reduce(Action::ExchangeStarted);
    Ok(request)
}

pub(super) async fn fallback_handler() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Html(page::not_found()))
}

fn render_page(state: &HelperState, replace_location: Option<&str>) -> Html<String> {
    let session = snapshot(&state.session);
    let redirect_uri = state.redirect_uri();
    Html(page::render(
        &session,
        &PageView {
            redirect_uri: &redirect_uri,
            catalog_url: &state.provider.catalog_url,
            replace_location,
        },
    ))
}
