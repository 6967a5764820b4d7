//! # Shopify token relay
//!
//! A small, non-embedded Shopify app whose only job is to run the OAuth
//! authorization code flow for a store and show the merchant the permanent
//! (offline) access token Shopify issues, so it can be pasted into an
//! external script.
//!
//! ## Overview
//!
//! - [`config`]: environment loading, host normalization and validated newtypes
//! - [`auth`]: scopes, sessions and the OAuth flow behind [`auth::AuthProvider`]
//! - [`webhooks`]: webhook signature verification
//! - [`storage`]: the [`storage::SessionStorage`] seam and an in-memory store
//! - [`server`]: the `axum` router, handlers and HTML rendering
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use token_relay::auth::ShopifyAuth;
//! use token_relay::config::EnvConfig;
//! use token_relay::server::{router, AppState, AUTH_CALLBACK_PATH};
//! use token_relay::storage::MemorySessionStorage;
//!
//! let env = EnvConfig::from_lookup(|name| match name {
//!     "SHOPIFY_API_KEY" => Some("key".to_string()),
//!     "SHOPIFY_API_SECRET" => Some("secret".to_string()),
//!     "HOST" => Some("https://relay.example.com/".to_string()),
//!     _ => None,
//! })
//! .unwrap();
//!
//! assert_eq!(env.host_name.as_ref().unwrap().as_ref(), "relay.example.com");
//!
//! let state = AppState::new(
//!     Arc::new(ShopifyAuth::new(env.clone(), AUTH_CALLBACK_PATH)),
//!     Arc::new(MemorySessionStorage::new()),
//!     env.app_name.clone(),
//! );
//! let _app = router(state);
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod server;
pub mod storage;
pub mod telemetry;
pub mod webhooks;

pub use auth::{AccessToken, AuthScopes, Session};
pub use config::{
    ApiKey, ApiSecretKey, ApiVersion, EnvConfig, HostName, ShopDomain, ShopifyConfig,
    ShopifyConfigBuilder,
};
pub use error::ConfigError;
