//! HTTP error responses for the relay routes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::auth::oauth::OAuthError;
use crate::error::ConfigError;
use crate::storage::SessionStorageError;
use crate::webhooks::WebhookError;

/// Body of the 400 answered when `/api/auth` has no `shop`.
pub const MISSING_SHOP_MESSAGE: &str =
    "Missing shop parameter. URL should be: /api/auth?shop=storename.myshopify.com";

/// Every failure a route can answer with.
///
/// The display text is the plain-text response body.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{}", MISSING_SHOP_MESSAGE)]
    MissingShop,

    #[error(transparent)]
    InvalidShop(ConfigError),

    #[error(transparent)]
    OAuth(#[from] OAuthError),

    #[error(transparent)]
    Webhook(#[from] WebhookError),

    #[error("Session storage unavailable")]
    Storage(#[from] SessionStorageError),

    #[error("Could not start the server. {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingShop | Self::InvalidShop(_) => StatusCode::BAD_REQUEST,
            Self::OAuth(e) => match e {
                OAuthError::InvalidHmac
                | OAuthError::StateMismatch { .. }
                | OAuthError::NoPendingAuthorization { .. }
                | OAuthError::InvalidCallback { .. } => StatusCode::BAD_REQUEST,
                OAuthError::TokenExchangeFailed { .. } => StatusCode::BAD_GATEWAY,
                OAuthError::MissingHostConfig | OAuthError::Config(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Webhook(e) => match e {
                WebhookError::MissingHmac | WebhookError::InvalidHmac => StatusCode::UNAUTHORIZED,
                WebhookError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            match &self {
                Self::Storage(source) => error!(%source, "Request failed"),
                other => error!(error = %other, "Request failed"),
            }
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        (status, self.to_string()).into_response()
    }
}
