use crate::config::CacheConfig;
use crate::shared::{AppError, AppResult};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::time::Duration;

use super::CacheStore;

/// Redis-backed cache. All failures surface as `BACKEND_UNAVAILABLE`;
/// callers on the token path treat that as fail-closed.
pub struct RedisCache {
    manager: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(config: &CacheConfig) -> AppResult<Self> {
        let url = match &config.password {
            Some(password) => format!("redis://:{}@{}/{}", password, config.address, config.db),
            None => format!("redis://{}/{}", config.address, config.db),
        };
        let client = redis::Client::open(url)
            .map_err(|e| AppError::BackendUnavailable(format!("redis: {}", e)))?;
        let manager = client
            .get_connection_manager()
            .await
            .map_err(|e| AppError::BackendUnavailable(format!("redis: {}", e)))?;
        Ok(Self { manager })
    }

    fn backend_err(e: redis::RedisError) -> AppError {
        AppError::BackendUnavailable(format!("redis: {}", e))
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.manager.clone();
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(Self::backend_err)?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let mut conn = self.manager.clone();
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async::<()>(&mut conn)
            .await
            .map_err(Self::backend_err)?;
        Ok(())
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        let mut conn = self.manager.clone();
        // SET NX EX is a single atomic command; this is what serialises
        // refresh rotation under contention.
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async(&mut conn)
            .await
            .map_err(Self::backend_err)?;
        Ok(reply.is_some())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.manager.clone();
        redis::cmd("DEL")
            .arg(key)
            .query_async::<()>(&mut conn)
            .await
            .map_err(Self::backend_err)?;
        Ok(())
    }

    async fn keys(&self, pattern: &str) -> AppResult<Vec<String>> {
        let mut conn = self.manager.clone();
        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(pattern)
            .query_async(&mut conn)
            .await
            .map_err(Self::backend_err)?;
        Ok(keys)
    }

    async fn incr_window(&self, key: &str, window: Duration) -> AppResult<i64> {
        let mut conn = self.manager.clone();
        let count: i64 = redis::cmd("INCR")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(Self::backend_err)?;
        if count == 1 {
            redis::cmd("EXPIRE")
                .arg(key)
                .arg(window.as_secs().max(1))
                .query_async::<()>(&mut conn)
                .await
                .map_err(Self::backend_err)?;
        }
        Ok(count)
    }
}
