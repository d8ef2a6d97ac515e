use crate::config::ObjectStoreConfig;
use crate::shared::{AppError, AppResult};
use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;

use super::ObjectStore;

/// S3-compatible object store (AWS or MinIO-style endpoints).
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(config: &ObjectStoreConfig) -> Self {
        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "heimdall",
        );
        let s3_config = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(&config.endpoint)
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();
        Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> AppResult<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| AppError::BackendUnavailable(format!("object store: {}", e)))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> AppResult<Vec<u8>> {
        // Idempotent read, so transient failures get the bounded backoff.
        crate::infrastructure::retry::read_with_backoff("object_store.get", || async {
            let output = self
                .client
                .get_object()
                .bucket(&self.bucket)
                .key(key)
                .send()
                .await
                .map_err(|e| AppError::BackendUnavailable(format!("object store: {}", e)))?;
            let bytes = output
                .body
                .collect()
                .await
                .map_err(|e| AppError::BackendUnavailable(format!("object store: {}", e)))?;
            Ok(bytes.into_bytes().to_vec())
        })
        .await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::BackendUnavailable(format!("object store: {}", e)))?;
        Ok(())
    }
}
