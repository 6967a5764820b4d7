//! Session storage.
//!
//! [`SessionStorage`] is the seam between the HTTP layer and wherever offline
//! sessions live. The binary uses [`MemorySessionStorage`]; sessions are lost
//! on restart and merchants re-authorize through `/api/auth`.

mod memory;

pub use memory::MemorySessionStorage;

use crate::auth::Session;
use async_trait::async_trait;
use thiserror::Error;

/// Error returned when the session store cannot answer.
///
/// "No session for this shop" is not an error; lookups return an empty list.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionStorageError {
    /// The backing store could not be reached or refused the operation.
    #[error("Session storage unavailable: {reason}")]
    Unavailable {
        /// What went wrong.
        reason: String,
    },
}

/// Persistence for offline sessions, keyed by session id and queryable by shop.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Inserts or replaces a session.
    async fn store_session(&self, session: Session) -> Result<(), SessionStorageError>;

    /// Returns every session for `shop`, which must be a full
    /// `*.myshopify.com` domain. An unknown shop yields an empty list.
    async fn find_sessions_by_shop(&self, shop: &str) -> Result<Vec<Session>, SessionStorageError>;

    /// Removes every session for `shop` and returns how many were removed.
    async fn delete_sessions_by_shop(&self, shop: &str) -> Result<usize, SessionStorageError>;
}
