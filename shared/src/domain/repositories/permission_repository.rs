use crate::domain::entities::{Permission, RolePermission};
use crate::shared::AppResult;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait PermissionRepository: Send + Sync {
    async fn create(&self, permission: Permission) -> AppResult<Permission>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Permission>>;
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Permission>>;
    async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<Permission>>;
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    async fn attach_to_role(&self, link: RolePermission) -> AppResult<()>;
    async fn detach_from_role(&self, role_id: Uuid, permission_id: Uuid) -> AppResult<()>;
    async fn permissions_for_role(&self, role_id: Uuid) -> AppResult<Vec<Permission>>;
    /// Permissions granted through the user's active role assignments.
    async fn permissions_for_user(&self, user_id: Uuid) -> AppResult<Vec<Permission>>;
}
