use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;

use crate::{Credentials, HelperError, ProviderConfig, Session, TokenExchanger};

use super::config::LocalServerConfig;
use super::http::{
    HelperState, SharedSession, authorize_handler, exchange_handler, fallback_handler,
    index_handler, snapshot,
};
use super::target::HelperOrigin;

/// The local web page that drives the flow. One instance owns one session.
#[derive(Clone)]
pub struct HelperServer {
    config: LocalServerConfig,
    origin: HelperOrigin,
    provider: ProviderConfig,
    exchanger: TokenExchanger,
    session: SharedSession,
}

impl HelperServer {
    pub fn new(config: LocalServerConfig, provider: ProviderConfig) -> Result<Self, HelperError> {
        let exchanger = TokenExchanger::new(provider.clone())?;
        Self::with_exchanger(config, exchanger)
    }

    pub fn with_exchanger(
        config: LocalServerConfig,
        exchanger: TokenExchanger,
    ) -> Result<Self, HelperError> {
        let origin = HelperOrigin::parse(&config.origin())?;
        Ok(Self {
            config,
            origin,
            provider: exchanger.provider().clone(),
            exchanger,
            session: Arc::new(Mutex::new(Session::default())),
        })
    }

    /// Pre-fills the form, e.g. from environment variables.
    pub fn with_credentials(self, credentials: Credentials) -> Self {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Session::new(credentials);
        self
    }

    /// The page origin, registered with the provider as redirect URI.
    pub fn origin(&self) -> String {
        self.origin.serialize()
    }

    pub fn session(&self) -> Session {
        snapshot(&self.session)
    }

    pub fn router(&self) -> Router {
        let state = HelperState {
            origin: self.origin.clone(),
            provider: self.provider.clone(),
            exchanger: self.exchanger.clone(),
            verify_state: self.config.verify_state,
            session: self.session.clone(),
        };

        Router::new()
            .route("/", get(index_handler))
            .route("/authorize", post(authorize_handler))
            .route("/exchange", post(exchange_handler))
            .fallback(fallback_handler)
            .with_state(state)
    }

    pub async fn bind(&self) -> Result<TcpListener, HelperError> {
        TcpListener::bind((self.origin.host.as_str(), self.origin.port))
            .await
            .map_err(HelperError::from)
    }

    pub async fn serve_with<F>(&self, listener: TcpListener, shutdown: F) -> Result<(), HelperError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local_addr: Option<SocketAddr> = listener.local_addr().ok();
        tracing::info!(origin = %self.origin(), ?local_addr, "helper listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("helper stopped");
        Ok(())
    }
}
