use shared::domain::entities::Permission;
use shared::domain::repositories::PermissionRepository;
use shared::{AppError, AppResult};
use std::sync::Arc;
use uuid::Uuid;

use crate::dto::{CreatePermissionRequest, PermissionResponse};

/// Permission CRUD. Names are globally unique and must match the
/// `<resource>:<action>[:<scope>]` grammar; system permissions cannot be
/// deleted.
pub struct ManagePermissionUseCase {
    permissions: Arc<dyn PermissionRepository>,
}

impl ManagePermissionUseCase {
    pub fn new(permissions: Arc<dyn PermissionRepository>) -> Self {
        Self { permissions }
    }

    pub async fn create(&self, request: CreatePermissionRequest) -> AppResult<PermissionResponse> {
        let permission = Permission::new(request.name.clone()).ok_or_else(|| {
            AppError::Validation(format!("invalid permission name {:?}", request.name))
        })?;
        if self
            .permissions
            .find_by_name(&permission.name)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "permission {} already exists",
                permission.name
            )));
        }
        let permission = self.permissions.create(permission).await?;
        Ok(permission.into())
    }

    pub async fn delete(&self, permission_id: Uuid) -> AppResult<()> {
        let permission = self
            .permissions
            .find_by_id(permission_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("permission {}", permission_id)))?;
        if permission.is_system {
            return Err(AppError::Forbidden(
                "system permissions cannot be deleted".to_string(),
            ));
        }
        self.permissions.delete(permission.id).await
    }

    pub async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<PermissionResponse>> {
        let permissions = self.permissions.list(limit, offset).await?;
        Ok(permissions.into_iter().map(Into::into).collect())
    }
}
