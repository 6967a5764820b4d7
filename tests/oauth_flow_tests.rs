//! Integration tests for the full authorization round trip.
//!
//! `/api/auth` is called first to register the state nonce, then a callback
//! signed the way Shopify signs it is sent back. The token endpoint is a
//! `wiremock` server standing in for the shop's admin.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use token_relay::auth::oauth::{compute_signature, AuthQuery};
use token_relay::auth::ShopifyAuth;
use token_relay::server::{router, AppState, AUTH_CALLBACK_PATH};
use token_relay::storage::{MemorySessionStorage, SessionStorage, SessionStorageError};
use token_relay::{EnvConfig, Session};
use tower::ServiceExt;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SECRET: &str = "test-secret";

fn test_env() -> EnvConfig {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("SHOPIFY_API_KEY", "test-key"),
        ("SHOPIFY_API_SECRET", SECRET),
        ("SHOPIFY_API_SCOPES", "read_products"),
        ("HOST", "https://meezy.example.com/"),
    ]);
    EnvConfig::from_lookup(|name| vars.get(name).map(|v| (*v).to_string())).unwrap()
}

struct Harness {
    app: Router,
    storage: Arc<MemorySessionStorage>,
}

fn harness(admin_origin: &str) -> Harness {
    let storage = Arc::new(MemorySessionStorage::new());
    Harness {
        app: app_with_storage(admin_origin, storage.clone()),
        storage,
    }
}

fn app_with_storage(admin_origin: &str, storage: Arc<dyn SessionStorage>) -> Router {
    let provider = ShopifyAuth::new(test_env(), AUTH_CALLBACK_PATH).with_admin_origin(admin_origin);
    router(AppState::new(Arc::new(provider), storage, "Meezy"))
}

/// A store that refuses every write.
struct FailingStorage;

#[async_trait]
impl SessionStorage for FailingStorage {
    async fn store_session(&self, _session: Session) -> Result<(), SessionStorageError> {
        Err(SessionStorageError::Unavailable {
            reason: "disk full".to_string(),
        })
    }

    async fn find_sessions_by_shop(&self, _shop: &str) -> Result<Vec<Session>, SessionStorageError> {
        Ok(Vec::new())
    }

    async fn delete_sessions_by_shop(&self, _shop: &str) -> Result<usize, SessionStorageError> {
        Ok(0)
    }
}

async fn get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_string(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Starts authorization and returns the state nonce from the redirect.
async fn begin(app: &Router, shop: &str) -> String {
    let response = get(app, &format!("/api/auth?shop={shop}")).await;
    assert_eq!(response.status(), StatusCode::FOUND);

    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let (_, query) = location.split_once('?').unwrap();
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("state="))
        .unwrap()
        .to_string()
}

/// Builds a callback URI signed with `secret`.
fn callback_uri(shop: &str, state: &str, secret: &str) -> String {
    let mut query = AuthQuery::new(
        "auth-code-123".to_string(),
        shop.to_string(),
        "1700000000".to_string(),
        state.to_string(),
        "bWVlenktaG9zdA".to_string(),
        String::new(),
    );
    query.hmac = compute_signature(&query.to_signable_string(), secret);

    format!(
        "/api/auth/callback?{}&hmac={}",
        query.to_signable_string(),
        query.hmac
    )
}

async fn mount_token_endpoint(server: &MockServer, token: &str) {
    mount_token_endpoint_times(server, token, 1).await;
}

async fn mount_token_endpoint_times(server: &MockServer, token: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path("/admin/oauth/access_token"))
        .and(body_json(serde_json::json!({
            "client_id": "test-key",
            "client_secret": SECRET,
            "code": "auth-code-123"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": token,
            "scope": "read_products"
        })))
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_callback_stores_and_renders_token() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, "shpat_0123456789abcdef").await;
    let h = harness(&server.uri());

    let state = begin(&h.app, "cool-store.myshopify.com").await;
    let response = get(
        &h.app,
        &callback_uri("cool-store.myshopify.com", &state, SECRET),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-store"
    );
    let body = body_string(response).await;
    assert!(body.contains("Successfully Connected!"));
    assert!(body.contains("cool-store.myshopify.com"));
    assert!(body.contains("shpat_0123456789abcdef"));

    let stored = h
        .storage
        .find_sessions_by_shop("cool-store.myshopify.com")
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].access_token.expose(), "shpat_0123456789abcdef");
}

#[tokio::test]
async fn test_root_shows_token_after_authorization() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, "tok_123").await;
    let h = harness(&server.uri());

    let state = begin(&h.app, "cool-store").await;
    let callback = get(&h.app, &callback_uri("cool-store.myshopify.com", &state, SECRET)).await;
    assert_eq!(callback.status(), StatusCode::OK);

    let body = body_string(get(&h.app, "/?shop=cool-store.myshopify.com").await).await;
    assert!(body.contains("tok_123"));
}

#[tokio::test]
async fn test_callback_with_bad_hmac_is_bad_request() {
    let server = MockServer::start().await;
    let h = harness(&server.uri());

    let state = begin(&h.app, "cool-store").await;
    let response = get(
        &h.app,
        &callback_uri("cool-store.myshopify.com", &state, "not-the-secret"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(h.storage.is_empty().await);
}

#[tokio::test]
async fn test_callback_with_wrong_state_is_bad_request() {
    let server = MockServer::start().await;
    let h = harness(&server.uri());

    let _state = begin(&h.app, "cool-store").await;
    let response = get(
        &h.app,
        &callback_uri("cool-store.myshopify.com", "forgedstate", SECRET),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_string(response).await;
    assert!(!body.contains("forgedstate"));
}

#[tokio::test]
async fn test_callback_without_begin_is_bad_request() {
    let server = MockServer::start().await;
    let h = harness(&server.uri());

    let response = get(
        &h.app,
        &callback_uri("cool-store.myshopify.com", "whatever", SECRET),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(response)
        .await
        .contains("/api/auth?shop=cool-store.myshopify.com"));
}

#[tokio::test]
async fn test_callback_token_endpoint_failure_is_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/oauth/access_token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_request"))
        .mount(&server)
        .await;
    let h = harness(&server.uri());

    let state = begin(&h.app, "cool-store").await;
    let response = get(&h.app, &callback_uri("cool-store.myshopify.com", &state, SECRET)).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(h.storage.is_empty().await);
}

#[tokio::test]
async fn test_state_is_single_use() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, "tok_once").await;
    let h = harness(&server.uri());

    let state = begin(&h.app, "cool-store").await;
    let uri = callback_uri("cool-store.myshopify.com", &state, SECRET);

    assert_eq!(get(&h.app, &uri).await.status(), StatusCode::OK);
    assert_eq!(get(&h.app, &uri).await.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_callback_renders_token_when_storage_fails() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, "shpat_kept_on_screen").await;
    let app = app_with_storage(&server.uri(), Arc::new(FailingStorage));

    let state = begin(&app, "cool-store").await;
    let response = get(&app, &callback_uri("cool-store.myshopify.com", &state, SECRET)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Successfully Connected!"));
    assert!(body.contains("shpat_kept_on_screen"));
}

#[tokio::test]
async fn test_repeated_begin_does_not_cancel_earlier_authorization() {
    let server = MockServer::start().await;
    mount_token_endpoint_times(&server, "tok_twice", 2).await;
    let h = harness(&server.uri());

    let first = begin(&h.app, "cool-store").await;
    let second = begin(&h.app, "cool-store").await;
    assert_ne!(first, second);

    let response = get(&h.app, &callback_uri("cool-store.myshopify.com", &first, SECRET)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&h.app, &callback_uri("cool-store.myshopify.com", &second, SECRET)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_state_cannot_be_used_for_another_shop() {
    let server = MockServer::start().await;
    let h = harness(&server.uri());

    let state = begin(&h.app, "cool-store").await;
    let response = get(&h.app, &callback_uri("other-store.myshopify.com", &state, SECRET)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(h.storage.is_empty().await);
}
