use crate::domain::entities::AuditEntry;
use crate::shared::AppResult;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn append(&self, entry: AuditEntry) -> AppResult<()>;
    async fn recent_for_tenant(&self, tenant_id: Uuid, limit: i64) -> AppResult<Vec<AuditEntry>>;
}
