pub mod keys;
pub mod memory;
pub mod redis_cache;

pub use memory::MemoryCache;
pub use redis_cache::RedisCache;

use crate::shared::AppResult;
use async_trait::async_trait;
use std::time::Duration;

/// Keyed string store with TTL. Backs the refresh-token index, revocation
/// tombstones, the decision cache and rate-limit counters. Atomicity is
/// per-key only.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;
    /// Set only if the key is absent. Returns whether the write won.
    /// This is the single-use mark behind refresh rotation.
    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool>;
    async fn delete(&self, key: &str) -> AppResult<()>;
    /// Keys matching a `prefix*` pattern.
    async fn keys(&self, pattern: &str) -> AppResult<Vec<String>>;
    /// Increment a counter, starting a fresh window when the key is new.
    async fn incr_window(&self, key: &str, window: Duration) -> AppResult<i64>;
}
