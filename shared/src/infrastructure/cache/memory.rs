use crate::shared::AppResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::CacheStore;

struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-process cache with the same semantics as the Redis adapter.
/// Used by tests and local development without a cache server.
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn purge_expired(entries: &mut HashMap<String, Entry>) {
        let now = Instant::now();
        entries.retain(|_, entry| entry.expires_at > now);
    }

    /// `prefix*` patterns only; that is all the key layout uses.
    fn matches(pattern: &str, key: &str) -> bool {
        match pattern.strip_suffix('*') {
            Some(prefix) => key.starts_with(prefix),
            None => key == pattern,
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut entries = self.entries.lock().unwrap();
        Self::purge_expired(&mut entries);
        Ok(entries.get(key).map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        let mut entries = self.entries.lock().unwrap();
        Self::purge_expired(&mut entries);
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(true)
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(key);
        Ok(())
    }

    async fn keys(&self, pattern: &str) -> AppResult<Vec<String>> {
        let mut entries = self.entries.lock().unwrap();
        Self::purge_expired(&mut entries);
        Ok(entries
            .keys()
            .filter(|key| Self::matches(pattern, key))
            .cloned()
            .collect())
    }

    async fn incr_window(&self, key: &str, window: Duration) -> AppResult<i64> {
        let mut entries = self.entries.lock().unwrap();
        Self::purge_expired(&mut entries);
        match entries.get_mut(key) {
            Some(entry) => {
                let count = entry.value.parse::<i64>().unwrap_or(0) + 1;
                entry.value = count.to_string();
                Ok(count)
            }
            None => {
                entries.insert(
                    key.to_string(),
                    Entry {
                        value: "1".to_string(),
                        expires_at: Instant::now() + window,
                    },
                );
                Ok(1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_nx_wins_only_once() {
        let cache = MemoryCache::new();
        assert!(cache.set_nx("k", "1", Duration::from_secs(60)).await.unwrap());
        assert!(!cache.set_nx("k", "2", Duration::from_secs(60)).await.unwrap());
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn expired_entries_are_invisible() {
        let cache = MemoryCache::new();
        cache.set("k", "v", Duration::from_millis(10)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.get("k").await.unwrap(), None);
        // The slot is reusable once expired.
        assert!(cache.set_nx("k", "w", Duration::from_secs(60)).await.unwrap());
    }

    #[tokio::test]
    async fn keys_honours_prefix_patterns() {
        let cache = MemoryCache::new();
        cache.set("session:u1:a", "1", Duration::from_secs(60)).await.unwrap();
        cache.set("session:u1:b", "1", Duration::from_secs(60)).await.unwrap();
        cache.set("session:u2:c", "1", Duration::from_secs(60)).await.unwrap();
        let mut keys = cache.keys("session:u1:*").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["session:u1:a", "session:u1:b"]);
    }

    #[tokio::test]
    async fn counter_window_resets_after_expiry() {
        let cache = MemoryCache::new();
        assert_eq!(cache.incr_window("r", Duration::from_millis(10)).await.unwrap(), 1);
        assert_eq!(cache.incr_window("r", Duration::from_millis(10)).await.unwrap(), 2);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.incr_window("r", Duration::from_millis(10)).await.unwrap(), 1);
    }
}
