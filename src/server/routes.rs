//! Route handlers.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{error, info, warn};

use super::{render, AppState, ServerError};
use crate::auth::oauth::AuthQuery;
use crate::config::ShopDomain;
use crate::webhooks::{
    WebhookRequest, HEADER_API_VERSION, HEADER_HMAC, HEADER_SHOP_DOMAIN, HEADER_TOPIC,
    HEADER_WEBHOOK_ID,
};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ShopParam {
    shop: Option<String>,
}

impl ShopParam {
    fn shop(&self) -> Option<&str> {
        self.shop.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

fn token_page(app_name: &str, shop: &ShopDomain, token: &str) -> Response {
    (
        [(header::CACHE_CONTROL, "no-store")],
        Html(render::render_token_page(app_name, shop.as_ref(), token)),
    )
        .into_response()
}

/// `GET /`: the stored token for `?shop=` if there is one, else the
/// placeholder.
pub(crate) async fn root(
    State(state): State<AppState>,
    Query(params): Query<ShopParam>,
) -> Result<Response, ServerError> {
    let live = || Html(render::render_live_page(&state.app_name)).into_response();

    let Some(raw_shop) = params.shop() else {
        return Ok(live());
    };
    if !state.token_lookup_enabled {
        return Ok(live());
    }
    let Ok(shop) = ShopDomain::new(raw_shop) else {
        return Ok(live());
    };

    let sessions = state.storage.find_sessions_by_shop(shop.as_ref()).await?;
    match sessions.first() {
        Some(session) => {
            info!(shop = %shop, "Displaying stored access token");
            Ok(token_page(
                &state.app_name,
                &session.shop,
                session.access_token.expose(),
            ))
        }
        None => Ok(live()),
    }
}

/// `GET /api/auth`: redirect the merchant to Shopify's consent screen.
pub(crate) async fn begin_auth(
    State(state): State<AppState>,
    Query(params): Query<ShopParam>,
) -> Result<Response, ServerError> {
    let raw_shop = params.shop().ok_or(ServerError::MissingShop)?;
    let shop = ShopDomain::new(raw_shop).map_err(ServerError::InvalidShop)?;

    info!(shop = %shop, "Initiating auth for shop");
    let result = state.provider.begin(&shop)?;

    Ok((StatusCode::FOUND, [(header::LOCATION, result.auth_url)]).into_response())
}

/// `GET /api/auth/callback`: complete authorization and show the token.
pub(crate) async fn auth_callback(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, ServerError> {
    let query = AuthQuery::from_params(params);
    let session = state.provider.callback(&query).await?;

    info!(
        shop = %session.shop,
        token = %session.access_token.redacted(),
        "Successfully authorized, access token obtained"
    );

    if let Err(e) = state.storage.store_session(session.clone()).await {
        error!(shop = %session.shop, error = %e, "Failed to store session");
    }

    Ok(token_page(
        &state.app_name,
        &session.shop,
        session.access_token.expose(),
    ))
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// `POST /api/webhooks`: verify and acknowledge; `app/uninstalled` drops the
/// shop's sessions.
pub(crate) async fn webhooks(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ServerError> {
    let request = WebhookRequest::new(
        body.to_vec(),
        header_value(&headers, HEADER_HMAC).unwrap_or_default(),
        header_value(&headers, HEADER_TOPIC),
        header_value(&headers, HEADER_SHOP_DOMAIN),
        header_value(&headers, HEADER_API_VERSION),
        header_value(&headers, HEADER_WEBHOOK_ID),
    );

    let context = state.provider.verify_webhook(&request)?;
    info!(
        topic = context.topic_raw(),
        shop = context.shop_domain().unwrap_or_default(),
        webhook_id = context.webhook_id().unwrap_or_default(),
        api_version = context.api_version().unwrap_or_default(),
        "Webhook received"
    );

    if context.is_app_uninstalled() {
        match context.shop_domain() {
            Some(shop) => {
                let removed = state.storage.delete_sessions_by_shop(shop).await?;
                info!(shop, removed, "App uninstalled, sessions deleted");
            }
            None => warn!("app/uninstalled webhook without a shop domain"),
        }
    }

    Ok(StatusCode::OK)
}
