use crate::domain::entities::Tenant;
use crate::shared::AppResult;
use async_trait::async_trait;
use uuid::Uuid;

/// Persistence operations for tenants. Soft-deleted rows are invisible to
/// every lookup except `update`, which writes the delete marker itself.
#[async_trait]
pub trait TenantRepository: Send + Sync {
    async fn create(&self, tenant: Tenant) -> AppResult<Tenant>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Tenant>>;
    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Tenant>>;
    async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<Tenant>>;
    async fn update(&self, tenant: Tenant) -> AppResult<Tenant>;
}
