use crate::domain::entities::{Role, UserRole};
use crate::shared::AppResult;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn create(&self, role: Role) -> AppResult<Role>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Role>>;
    async fn find_by_name(&self, tenant_id: Uuid, name: &str) -> AppResult<Option<Role>>;
    async fn list_by_tenant(&self, tenant_id: Uuid) -> AppResult<Vec<Role>>;
    async fn update(&self, role: Role) -> AppResult<Role>;
    async fn count_by_tenant(&self, tenant_id: Uuid) -> AppResult<i64>;

    async fn assign_to_user(&self, link: UserRole) -> AppResult<()>;
    async fn remove_from_user(&self, user_id: Uuid, role_id: Uuid) -> AppResult<()>;
    /// Active (non-expired) roles for the user.
    async fn roles_for_user(&self, user_id: Uuid) -> AppResult<Vec<Role>>;
}
