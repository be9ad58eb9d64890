use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::token::CachedToken;

/// Key/value cache with per-entry TTL. `get` and `put` must each be atomic;
/// callers do an unguarded read-check-write on top of them.
#[async_trait]
pub trait TokenCache: Send + Sync {
    /// Value stored under `key` if present and not expired.
    async fn get(&self, key: &str) -> Option<String>;

    async fn put(&self, key: &str, value: String, ttl: Duration);

    async fn remove(&self, key: &str);
}

/// Process-local cache. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenCache {
    inner: Arc<RwLock<HashMap<String, CachedToken>>>,
}

impl MemoryTokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw entry, expired or not.
    pub async fn entry(&self, key: &str) -> Option<CachedToken> {
        self.inner.read().await.get(key).cloned()
    }
}

#[async_trait]
impl TokenCache for MemoryTokenCache {
    async fn get(&self, key: &str) -> Option<String> {
        let map = self.inner.read().await;
        map.get(key)
            .filter(|token| token.is_fresh())
            .map(|token| token.value.to_owned())
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) {
        debug!("cache: store '{}' for {}s", key, ttl.as_secs());
        let mut map = self.inner.write().await;
        map.insert(key.to_owned(), CachedToken::new(value, ttl));
    }

    async fn remove(&self, key: &str) {
        self.inner.write().await.remove(key);
    }
}
