use crate::domain::entities::{Policy, PolicyVersion};
use crate::shared::AppResult;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait PolicyRepository: Send + Sync {
    async fn create(&self, policy: Policy) -> AppResult<Policy>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Policy>>;
    async fn find_by_name(&self, tenant_id: Uuid, name: &str) -> AppResult<Option<Policy>>;
    async fn list_by_tenant(&self, tenant_id: Uuid, limit: i64, offset: i64)
        -> AppResult<Vec<Policy>>;
    async fn update(&self, policy: Policy) -> AppResult<Policy>;
    /// Update the policy and archive a version snapshot in one transaction.
    async fn update_with_version(&self, policy: Policy, version: PolicyVersion)
        -> AppResult<Policy>;

    async fn count_by_tenant(&self, tenant_id: Uuid) -> AppResult<i64>;

    async fn list_versions(&self, policy_id: Uuid) -> AppResult<Vec<PolicyVersion>>;
    async fn find_version(&self, policy_id: Uuid, version: i32)
        -> AppResult<Option<PolicyVersion>>;
}
