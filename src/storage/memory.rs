//! In-memory session storage.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{SessionStorage, SessionStorageError};
use crate::auth::Session;

/// Process-local [`SessionStorage`] keyed by session id.
///
/// # Example
///
/// ```rust
/// use token_relay::storage::{MemorySessionStorage, SessionStorage};
/// use token_relay::{AccessToken, Session, ShopDomain};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let storage = MemorySessionStorage::new();
/// let shop = ShopDomain::new("my-store").unwrap();
/// storage
///     .store_session(Session::new(shop, AccessToken::new("tok_123"), Default::default()))
///     .await
///     .unwrap();
///
/// let found = storage.find_sessions_by_shop("my-store.myshopify.com").await.unwrap();
/// assert_eq!(found[0].access_token.expose(), "tok_123");
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn store_session(&self, session: Session) -> Result<(), SessionStorageError> {
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session);
        Ok(())
    }

    async fn find_sessions_by_shop(&self, shop: &str) -> Result<Vec<Session>, SessionStorageError> {
        let sessions = self.sessions.read().await;
        let mut found: Vec<Session> = sessions
            .values()
            .filter(|session| session.shop.as_ref() == shop)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(found)
    }

    async fn delete_sessions_by_shop(&self, shop: &str) -> Result<usize, SessionStorageError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.shop.as_ref() != shop);
        Ok(before - sessions.len())
    }
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<MemorySessionStorage>();
};
