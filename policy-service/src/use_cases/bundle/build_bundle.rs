use shared::domain::entities::{Bundle, PolicyStatus};
use shared::domain::repositories::{BundleRepository, PolicyRepository};
use shared::infrastructure::objectstore::ObjectStore;
use shared::{AppError, AppResult};
use std::sync::Arc;
use uuid::Uuid;

use crate::archive;
use crate::dto::{BundleResponse, CreateBundleRequest};

/// Bundle assembly: read the active policies referenced by id, serialise
/// them into a tar.gz blob, write it to the object store, record the key.
/// An object-store failure marks the bundle `failed` and surfaces the cause.
pub struct BuildBundleUseCase {
    bundles: Arc<dyn BundleRepository>,
    policies: Arc<dyn PolicyRepository>,
    store: Arc<dyn ObjectStore>,
}

impl BuildBundleUseCase {
    pub fn new(
        bundles: Arc<dyn BundleRepository>,
        policies: Arc<dyn PolicyRepository>,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            bundles,
            policies,
            store,
        }
    }

    pub async fn execute(
        &self,
        tenant_id: Uuid,
        request: CreateBundleRequest,
        created_by: Uuid,
    ) -> AppResult<BundleResponse> {
        if request.name.trim().is_empty() {
            return Err(AppError::Validation("bundle name must not be empty".to_string()));
        }
        if request.policy_ids.is_empty() {
            return Err(AppError::Validation(
                "bundle must reference at least one policy".to_string(),
            ));
        }

        let mut included = Vec::with_capacity(request.policy_ids.len());
        for policy_id in &request.policy_ids {
            let policy = self
                .policies
                .find_by_id(*policy_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("policy {}", policy_id)))?;
            if policy.tenant_id != tenant_id {
                return Err(AppError::NotFound(format!("policy {}", policy_id)));
            }
            if policy.status != PolicyStatus::Active {
                return Err(AppError::Validation(format!(
                    "policy {} is not active",
                    policy.name
                )));
            }
            included.push(policy);
        }

        let bundle = Bundle::new(
            Some(tenant_id),
            request.name,
            request.policy_ids,
            created_by,
        );
        let mut bundle = self.bundles.create(bundle).await?;

        let blob = match archive::build(bundle.id, &included) {
            Ok(blob) => blob,
            Err(e) => return self.fail(bundle, e).await,
        };
        let key = bundle.storage_key();
        if let Err(e) = self.store.put(&key, blob).await {
            return self
                .fail(bundle, AppError::BundleBuildFailed(e.to_string()))
                .await;
        }

        bundle.mark_ready(key);
        let bundle = self.bundles.update(bundle).await?;
        Ok(bundle.into())
    }

    async fn fail(&self, mut bundle: Bundle, cause: AppError) -> AppResult<BundleResponse> {
        bundle.mark_failed();
        if let Err(update_err) = self.bundles.update(bundle).await {
            tracing::error!("Failed to record bundle failure: {}", update_err);
        }
        Err(cause)
    }
}
