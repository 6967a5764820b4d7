//! The HTTP surface of the relay.
//!
//! | Method | Path | |
//! |---|---|---|
//! | GET | `/` | stored token for `?shop=`, or a placeholder |
//! | GET | [`AUTH_PATH`] | 302 to Shopify's consent screen |
//! | GET | [`AUTH_CALLBACK_PATH`] | token page |
//! | POST | [`WEBHOOKS_PATH`] | verified webhook receipt |
//!
//! Handlers reach Shopify and the session store only through [`AppState`].

mod csp;
mod errors;
mod render;
mod routes;

pub use csp::{CspLayer, CspService, NON_EMBEDDED_POLICY};
pub use errors::{ServerError, MISSING_SHOP_MESSAGE};
pub use render::{escape_html, render_live_page, render_token_page};

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tracing::info;

use crate::auth::AuthProvider;
use crate::storage::SessionStorage;

pub const AUTH_PATH: &str = "/api/auth";
pub const AUTH_CALLBACK_PATH: &str = "/api/auth/callback";
pub const WEBHOOKS_PATH: &str = "/api/webhooks";

/// Shared state of every handler.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn AuthProvider>,
    pub storage: Arc<dyn SessionStorage>,
    pub app_name: Arc<str>,
    /// Whether `GET /?shop=` may display a stored token.
    pub token_lookup_enabled: bool,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn AuthProvider>,
        storage: Arc<dyn SessionStorage>,
        app_name: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            provider,
            storage,
            app_name: app_name.into(),
            token_lookup_enabled: true,
        }
    }

    #[must_use]
    pub const fn with_token_lookup(mut self, enabled: bool) -> Self {
        self.token_lookup_enabled = enabled;
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("app_name", &self.app_name)
            .field("token_lookup_enabled", &self.token_lookup_enabled)
            .finish_non_exhaustive()
    }
}

/// Builds the router with every route and the CSP layer.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route(AUTH_PATH, get(routes::begin_auth))
        .route(AUTH_CALLBACK_PATH, get(routes::auth_callback))
        .route(WEBHOOKS_PATH, post(routes::webhooks))
        .layer(CspLayer::non_embedded())
        .with_state(state)
}

/// Serves on `0.0.0.0:port` until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns [`ServerError::Io`] if the port cannot be bound or the server fails.
pub async fn serve(state: AppState, port: u16) -> Result<(), ServerError> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    let port = listener.local_addr()?.port();
    info!("{} Integration App running on port {}", state.app_name, port);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Could not listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received");
}
