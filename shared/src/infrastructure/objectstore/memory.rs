use crate::shared::{AppError, AppResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::ObjectStore;

/// In-process blob store for tests and local development.
pub struct MemoryObjectStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self {
            blobs: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> AppResult<()> {
        self.blobs.lock().unwrap().insert(key.to_string(), bytes);
        Ok(())
    }

    async fn get(&self, key: &str) -> AppResult<Vec<u8>> {
        self.blobs
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("object {}", key)))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.blobs.lock().unwrap().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_delete_round_trip() {
        let store = MemoryObjectStore::new();
        store.put("bundles/a.tar.gz", vec![1, 2, 3]).await.unwrap();
        assert_eq!(store.get("bundles/a.tar.gz").await.unwrap(), vec![1, 2, 3]);
        store.delete("bundles/a.tar.gz").await.unwrap();
        assert!(store.get("bundles/a.tar.gz").await.is_err());
    }
}
