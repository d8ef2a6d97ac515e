use shared::domain::entities::Role;
use shared::domain::repositories::{RoleRepository, TenantRepository};
use shared::{AppError, AppResult};
use std::sync::Arc;
use uuid::Uuid;

use crate::dto::{CreateRoleRequest, RoleResponse, UpdateRoleRequest};

use super::hierarchy;

/// Role CRUD within a tenant: unique names, acyclic parents, quota on
/// creation, system roles protected from rename and deletion.
pub struct ManageRoleUseCase {
    roles: Arc<dyn RoleRepository>,
    tenants: Arc<dyn TenantRepository>,
}

impl ManageRoleUseCase {
    pub fn new(roles: Arc<dyn RoleRepository>, tenants: Arc<dyn TenantRepository>) -> Self {
        Self { roles, tenants }
    }

    pub async fn create(
        &self,
        tenant_id: Uuid,
        request: CreateRoleRequest,
    ) -> AppResult<RoleResponse> {
        if request.name.trim().is_empty() {
            return Err(AppError::Validation("role name must not be empty".to_string()));
        }
        let tenant = self
            .tenants
            .find_by_id(tenant_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("tenant {}", tenant_id)))?;

        let role_count = self.roles.count_by_tenant(tenant_id).await?;
        if role_count >= tenant.max_roles {
            return Err(AppError::Conflict("tenant role quota reached".to_string()));
        }
        if self
            .roles
            .find_by_name(tenant_id, &request.name)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "role {} already exists",
                request.name
            )));
        }

        let role = Role::new(
            tenant_id,
            request.name,
            request.description,
            request.parent_role_id,
        );
        if let Some(parent_id) = request.parent_role_id {
            self.ensure_parent_valid(tenant_id, role.id, parent_id).await?;
        }
        let role = self.roles.create(role).await?;
        Ok(role.into())
    }

    pub async fn update(
        &self,
        tenant_id: Uuid,
        role_id: Uuid,
        request: UpdateRoleRequest,
    ) -> AppResult<RoleResponse> {
        let mut role = self.load_in_tenant(tenant_id, role_id).await?;

        if let Some(name) = request.name {
            if role.is_system && name != role.name {
                return Err(AppError::Forbidden(
                    "system roles cannot be renamed".to_string(),
                ));
            }
            if name.trim().is_empty() {
                return Err(AppError::Validation("role name must not be empty".to_string()));
            }
            role.name = name;
        }
        if let Some(description) = request.description {
            role.description = Some(description);
        }
        if let Some(parent_id) = request.parent_role_id {
            self.ensure_parent_valid(tenant_id, role.id, parent_id).await?;
            role.parent_role_id = Some(parent_id);
        }
        role.updated_at = chrono::Utc::now();

        let role = self.roles.update(role).await?;
        Ok(role.into())
    }

    pub async fn delete(&self, tenant_id: Uuid, role_id: Uuid) -> AppResult<()> {
        let mut role = self.load_in_tenant(tenant_id, role_id).await?;
        if role.is_system {
            return Err(AppError::Forbidden(
                "system roles cannot be deleted".to_string(),
            ));
        }
        role.mark_deleted();
        self.roles.update(role).await?;
        Ok(())
    }

    pub async fn list(&self, tenant_id: Uuid) -> AppResult<Vec<RoleResponse>> {
        let roles = self.roles.list_by_tenant(tenant_id).await?;
        Ok(roles.into_iter().map(Into::into).collect())
    }

    async fn load_in_tenant(&self, tenant_id: Uuid, role_id: Uuid) -> AppResult<Role> {
        let role = self
            .roles
            .find_by_id(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role {}", role_id)))?;
        if role.tenant_id != tenant_id {
            // Cross-tenant ids look like missing rows, not like leaks.
            return Err(AppError::NotFound(format!("role {}", role_id)));
        }
        Ok(role)
    }

    async fn ensure_parent_valid(
        &self,
        tenant_id: Uuid,
        child_id: Uuid,
        parent_id: Uuid,
    ) -> AppResult<()> {
        let parent = self
            .roles
            .find_by_id(parent_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role {}", parent_id)))?;
        if parent.tenant_id != tenant_id {
            return Err(AppError::NotFound(format!("role {}", parent_id)));
        }
        let roles = self.roles.list_by_tenant(tenant_id).await?;
        hierarchy::ensure_acyclic(&roles, child_id, parent_id)
    }
}
