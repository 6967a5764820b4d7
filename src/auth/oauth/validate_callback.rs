//! OAuth callback validation and token exchange.
//!
//! After the merchant grants access, Shopify redirects to the callback URL
//! with an authorization code. [`validate_auth_callback`]:
//!
//! 1. Validates the HMAC signature to ensure the request is from Shopify
//! 2. Verifies the state parameter to prevent CSRF attacks
//! 3. Exchanges the authorization code for a permanent access token
//! 4. Returns a [`Session`]

use crate::auth::oauth::error::OAuthError;
use crate::auth::oauth::hmac::{constant_time_compare, validate_hmac};
use crate::auth::oauth::AuthQuery;
use crate::auth::session::AccessTokenResponse;
use crate::auth::Session;
use crate::config::{ShopDomain, ShopifyConfig};
use tracing::debug;

/// Request body for the code-for-token exchange.
#[derive(serde::Serialize)]
struct TokenExchangeRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

/// Validates an OAuth callback and exchanges the code for an access token.
///
/// # Errors
///
/// - [`OAuthError::InvalidHmac`]: HMAC signature validation failed
/// - [`OAuthError::StateMismatch`]: State parameter doesn't match expected
/// - [`OAuthError::InvalidCallback`]: Shop domain or code is invalid
/// - [`OAuthError::TokenExchangeFailed`]: Token exchange request failed
pub async fn validate_auth_callback(
    config: &ShopifyConfig,
    auth_query: &AuthQuery,
    expected_state: &str,
) -> Result<Session, OAuthError> {
    validate_auth_callback_at(
        &reqwest::Client::new(),
        None,
        config,
        auth_query,
        expected_state,
    )
    .await
}

/// Same as [`validate_auth_callback`], with a caller-owned HTTP client and an
/// optional origin replacing `https://<shop>` for the token endpoint.
pub(crate) async fn validate_auth_callback_at(
    client: &reqwest::Client,
    admin_origin: Option<&str>,
    config: &ShopifyConfig,
    auth_query: &AuthQuery,
    expected_state: &str,
) -> Result<Session, OAuthError> {
    if !validate_hmac(auth_query, config) {
        return Err(OAuthError::InvalidHmac);
    }

    if !constant_time_compare(auth_query.state(), expected_state) {
        return Err(OAuthError::StateMismatch {
            expected: expected_state.to_string(),
            received: auth_query.state().to_string(),
        });
    }

    let shop = ShopDomain::new(auth_query.shop()).map_err(|_| OAuthError::InvalidCallback {
        reason: format!("Invalid shop domain: {}", auth_query.shop()),
    })?;

    if auth_query.code().is_empty() {
        return Err(OAuthError::InvalidCallback {
            reason: "Missing authorization code".to_string(),
        });
    }

    let token_url = match admin_origin {
        Some(origin) => format!("{}/admin/oauth/access_token", origin.trim_end_matches('/')),
        None => format!("https://{}/admin/oauth/access_token", shop.as_ref()),
    };
    debug!(shop = %shop, "Exchanging authorization code for access token");

    let request_body = TokenExchangeRequest {
        client_id: config.api_key().as_ref(),
        client_secret: config.api_secret_key().as_ref(),
        code: auth_query.code(),
    };

    let response = client
        .post(&token_url)
        .json(&request_body)
        .send()
        .await
        .map_err(|e| OAuthError::TokenExchangeFailed {
            status: 0,
            message: format!("Network error: {e}"),
        })?;

    let status = response.status().as_u16();

    if !response.status().is_success() {
        let error_body = response.text().await.unwrap_or_default();
        return Err(OAuthError::TokenExchangeFailed {
            status,
            message: error_body,
        });
    }

    let token_response: AccessTokenResponse =
        response
            .json()
            .await
            .map_err(|e| OAuthError::TokenExchangeFailed {
                status,
                message: format!("Failed to parse token response: {e}"),
            })?;

    if token_response.access_token.is_empty() {
        return Err(OAuthError::TokenExchangeFailed {
            status,
            message: "Token response did not contain an access token".to_string(),
        });
    }

    Ok(Session::from_access_token_response(shop, &token_response))
}
