use authz_core::authorization::PermissionChecker;
use shared::domain::entities::UserRole;
use shared::domain::repositories::{RoleRepository, UserRepository};
use shared::{AppError, AppResult};
use std::sync::Arc;
use uuid::Uuid;

use crate::dto::AssignRoleRequest;

/// Role assignment and removal. Both invalidate the member's cached
/// decisions so the next check reflects the change immediately.
pub struct AssignRoleUseCase {
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
    checker: Arc<PermissionChecker>,
}

impl AssignRoleUseCase {
    pub fn new(
        users: Arc<dyn UserRepository>,
        roles: Arc<dyn RoleRepository>,
        checker: Arc<PermissionChecker>,
    ) -> Self {
        Self {
            users,
            roles,
            checker,
        }
    }

    pub async fn assign(
        &self,
        user_id: Uuid,
        request: AssignRoleRequest,
        assigned_by: Uuid,
    ) -> AppResult<()> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {}", user_id)))?;
        let role = self
            .roles
            .find_by_id(request.role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role {}", request.role_id)))?;

        // Cross-tenant grants are forbidden by invariant.
        if role.tenant_id != user.tenant_id {
            return Err(AppError::Validation(
                "role and user belong to different tenants".to_string(),
            ));
        }

        let mut link = UserRole::new(user.id, role.id, assigned_by);
        if let Some(expires_at) = request.expires_at {
            if expires_at <= chrono::Utc::now() {
                return Err(AppError::Validation(
                    "expiry must be in the future".to_string(),
                ));
            }
            link = link.with_expiry(expires_at);
        }

        self.roles.assign_to_user(link).await?;
        self.checker.invalidate_user(user.id).await
    }

    pub async fn revoke(&self, user_id: Uuid, role_id: Uuid) -> AppResult<()> {
        self.roles.remove_from_user(user_id, role_id).await?;
        self.checker.invalidate_user(user_id).await
    }
}
