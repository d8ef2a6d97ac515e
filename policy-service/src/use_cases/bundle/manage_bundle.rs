use shared::domain::entities::BundleStatus;
use shared::domain::repositories::BundleRepository;
use shared::infrastructure::objectstore::ObjectStore;
use shared::{AppError, AppResult};
use std::sync::Arc;
use uuid::Uuid;

use crate::dto::{BundleResponse, DeploymentResponse};

use super::activate_bundle::load_in_tenant;

pub struct ManageBundleUseCase {
    bundles: Arc<dyn BundleRepository>,
    store: Arc<dyn ObjectStore>,
}

impl ManageBundleUseCase {
    pub fn new(bundles: Arc<dyn BundleRepository>, store: Arc<dyn ObjectStore>) -> Self {
        Self { bundles, store }
    }

    pub async fn get(&self, tenant_id: Uuid, bundle_id: Uuid) -> AppResult<BundleResponse> {
        let bundle = load_in_tenant(self.bundles.as_ref(), tenant_id, bundle_id).await?;
        Ok(bundle.into())
    }

    pub async fn list(&self, tenant_id: Uuid) -> AppResult<Vec<BundleResponse>> {
        let bundles = self.bundles.list_by_tenant(Some(tenant_id)).await?;
        Ok(bundles.into_iter().map(Into::into).collect())
    }

    pub async fn deployments(
        &self,
        tenant_id: Uuid,
        bundle_id: Uuid,
    ) -> AppResult<Vec<DeploymentResponse>> {
        load_in_tenant(self.bundles.as_ref(), tenant_id, bundle_id).await?;
        let deployments = self.bundles.list_deployments(bundle_id).await?;
        Ok(deployments.into_iter().map(Into::into).collect())
    }

    /// Deletion removes the record and the stored blob. Refused while the
    /// bundle holds an environment slot.
    pub async fn delete(&self, tenant_id: Uuid, bundle_id: Uuid) -> AppResult<()> {
        let bundle = load_in_tenant(self.bundles.as_ref(), tenant_id, bundle_id).await?;
        if bundle.status == BundleStatus::Active {
            return Err(AppError::BundleActiveCannotDelete);
        }
        if let Some(key) = &bundle.object_key {
            if let Err(e) = self.store.delete(key).await {
                tracing::warn!("Failed to delete bundle blob {}: {}", key, e);
            }
        }
        self.bundles.delete(bundle.id).await
    }
}
