//! In-memory token store keyed by caller identifier.
//!
//! Every read and write goes through one exclusive lock over the whole map.
//! Operations are single O(1) map accesses, so the lock is never held across
//! anything slower than a hash lookup.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::models::Token;

/// Storage seam for issued tokens.
///
/// Last write wins: `put` overwrites unconditionally and a `get` that
/// happens-after a `put` observes that token or a later one.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Store `token` under `identifier`, replacing any previous entry.
    async fn put(&self, identifier: &str, token: Token);

    /// Current token for `identifier`, if any.
    async fn get(&self, identifier: &str) -> Option<Token>;

    /// Number of identifiers holding a token.
    async fn len(&self) -> usize;

    /// Whether no token has been stored yet.
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Process-local [`TokenStore`] backed by a mutex-guarded map.
#[derive(Clone, Default)]
pub struct MemoryTokenStore {
    tokens: Arc<Mutex<HashMap<String, Token>>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn put(&self, identifier: &str, token: Token) {
        let replaced = self.tokens.lock().await.insert(identifier.to_owned(), token).is_some();
        tracing::debug!(identifier, replaced, "Stored token");
    }

    async fn get(&self, identifier: &str) -> Option<Token> {
        self.tokens.lock().await.get(identifier).cloned()
    }

    async fn len(&self) -> usize {
        self.tokens.lock().await.len()
    }
}

impl std::fmt::Debug for MemoryTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTokenStore").finish_non_exhaustive()
    }
}
