//! Authentication types for the token relay.
//!
//! - [`AuthScopes`]: a set of OAuth scopes with implied scope handling
//! - [`Session`] and [`AccessToken`]: the offline session a callback produces
//! - [`oauth`]: the OAuth 2.0 authorization code flow
//! - [`AuthProvider`] / [`ShopifyAuth`]: what the HTTP routes call into
//!
//! # Example
//!
//! ```rust
//! use token_relay::{AccessToken, AuthScopes, Session, ShopDomain};
//!
//! let scopes: AuthScopes = "write_products".parse().unwrap();
//! let session = Session::new(
//!     ShopDomain::new("my-store").unwrap(),
//!     AccessToken::new("shpat_0123456789abcdef"),
//!     scopes,
//! );
//!
//! // write_products implies read_products
//! assert!(session.scopes.iter().any(|s| s == "read_products"));
//! assert_eq!(session.access_token.redacted(), "shpat_***");
//! ```

pub mod oauth;
mod provider;
mod scopes;
pub mod session;

pub use provider::{
    AuthProvider, ShopifyAuth, MAX_PENDING_AUTHORIZATIONS, PENDING_AUTHORIZATION_TTL,
};
pub use scopes::AuthScopes;
pub use session::{AccessToken, Session};
