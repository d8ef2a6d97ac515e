use crate::domain::entities::{Bundle, Deployment, Environment};
use crate::shared::AppResult;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait BundleRepository: Send + Sync {
    async fn create(&self, bundle: Bundle) -> AppResult<Bundle>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Bundle>>;
    async fn list_by_tenant(&self, tenant_id: Option<Uuid>) -> AppResult<Vec<Bundle>>;
    async fn update(&self, bundle: Bundle) -> AppResult<Bundle>;
    async fn delete(&self, id: Uuid) -> AppResult<()>;
    /// The bundle currently active for the (tenant, environment) slot.
    async fn find_active(
        &self,
        tenant_id: Option<Uuid>,
        environment: Environment,
    ) -> AppResult<Option<Bundle>>;
    /// Demote the active bundle and promote the replacement in one
    /// transaction, so the slot never shows two active bundles.
    async fn swap_active(&self, promoted: Bundle, demoted: Option<Bundle>) -> AppResult<Bundle>;

    async fn create_deployment(&self, deployment: Deployment) -> AppResult<Deployment>;
    async fn list_deployments(&self, bundle_id: Uuid) -> AppResult<Vec<Deployment>>;
}
