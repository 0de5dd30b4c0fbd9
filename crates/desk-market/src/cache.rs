//! TTL cache in front of the market-data providers

use cached::{Cached, TimedCache};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Cache key for a market-data request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    /// Upper-cased ticker
    pub symbol: String,
    /// Operation, e.g. `history` or `info`
    pub endpoint: String,
    /// Extra request parameters
    pub params: String,
}

impl CacheKey {
    pub fn new(symbol: &str, endpoint: impl Into<String>, params: impl ToString) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            endpoint: endpoint.into(),
            params: params.to_string(),
        }
    }
}

/// Shared cache of JSON payloads, cheap to clone
#[derive(Clone)]
pub struct MarketCache {
    cache: Arc<RwLock<TimedCache<CacheKey, serde_json::Value>>>,
}

impl MarketCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<serde_json::Value> {
        // TimedCache needs `&mut` to evict on read
        let mut cache = self.cache.write().await;
        cache.cache_get(key).cloned()
    }

    pub async fn insert(&self, key: CacheKey, value: serde_json::Value) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_set(key, value);
    }

    /// Return the cached value or run `fetcher`, caching only successes
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: CacheKey,
        fetcher: F,
    ) -> Result<serde_json::Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<serde_json::Value, E>>,
    {
        if let Some(value) = self.get(&key).await {
            tracing::debug!("Cache hit for {} {} {}", key.endpoint, key.symbol, key.params);
            return Ok(value);
        }

        tracing::debug!("Cache miss for {} {} {}", key.endpoint, key.symbol, key.params);

        let value = fetcher().await?;
        self.insert(key, value.clone()).await;

        Ok(value)
    }

    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        cache.cache_clear();
    }

    pub async fn len(&self) -> usize {
        let cache = self.cache.read().await;
        cache.cache_size()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
