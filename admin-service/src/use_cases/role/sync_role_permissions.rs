use shared::domain::entities::RolePermission;
use shared::domain::repositories::{PermissionRepository, RoleRepository};
use shared::{AppError, AppResult};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Reconcile a role's permission set against a target list: attach what is
/// missing, detach what is no longer wanted.
pub struct SyncRolePermissionsUseCase {
    roles: Arc<dyn RoleRepository>,
    permissions: Arc<dyn PermissionRepository>,
}

impl SyncRolePermissionsUseCase {
    pub fn new(
        roles: Arc<dyn RoleRepository>,
        permissions: Arc<dyn PermissionRepository>,
    ) -> Self {
        Self { roles, permissions }
    }

    pub async fn execute(
        &self,
        role_id: Uuid,
        target_permission_ids: &[Uuid],
        assigned_by: Uuid,
    ) -> AppResult<()> {
        if self.roles.find_by_id(role_id).await?.is_none() {
            return Err(AppError::NotFound(format!("role {}", role_id)));
        }
        for permission_id in target_permission_ids {
            if self.permissions.find_by_id(*permission_id).await?.is_none() {
                return Err(AppError::NotFound(format!("permission {}", permission_id)));
            }
        }

        let current: HashSet<Uuid> = self
            .permissions
            .permissions_for_role(role_id)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();
        let target: HashSet<Uuid> = target_permission_ids.iter().copied().collect();

        for permission_id in target.difference(&current) {
            self.permissions
                .attach_to_role(RolePermission::new(role_id, *permission_id, assigned_by))
                .await?;
        }
        for permission_id in current.difference(&target) {
            self.permissions
                .detach_from_role(role_id, *permission_id)
                .await?;
        }
        Ok(())
    }
}
