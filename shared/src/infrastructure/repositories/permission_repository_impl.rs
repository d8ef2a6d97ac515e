use crate::domain::entities::{Permission, PermissionScope, RolePermission};
use crate::domain::repositories::PermissionRepository;
use crate::infrastructure::database::queries::permissions::*;
use crate::shared::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, FromRow)]
struct PermissionRow {
    id: Uuid,
    name: String,
    resource: String,
    action: String,
    scope: String,
    is_system: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PermissionRow> for Permission {
    fn from(row: PermissionRow) -> Self {
        let scope = PermissionScope::parse(&row.scope).unwrap_or_else(|| {
            tracing::warn!("Unknown permission scope {:?}, treating as own", row.scope);
            PermissionScope::Own
        });
        Permission {
            id: row.id,
            name: row.name,
            resource: row.resource,
            action: row.action,
            scope,
            is_system: row.is_system,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub struct PermissionRepositoryImpl {
    pool: PgPool,
}

impl PermissionRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionRepository for PermissionRepositoryImpl {
    async fn create(&self, permission: Permission) -> AppResult<Permission> {
        let location = concat!(file!(), ":", line!());
        let row = sqlx::query_as::<_, PermissionRow>(PERMISSION_INSERT)
            .bind(permission.id)
            .bind(&permission.name)
            .bind(&permission.resource)
            .bind(&permission.action)
            .bind(permission.scope.as_str())
            .bind(permission.is_system)
            .bind(permission.created_at)
            .bind(permission.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                let err = super::map_insert_error(e, || {
                    AppError::Conflict(format!("permission {} already exists", permission.name))
                });
                err.log_with_operation(location, "permission_repository.create");
                err
            })?;
        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Permission>> {
        let location = concat!(file!(), ":", line!());
        let row = sqlx::query_as::<_, PermissionRow>(PERMISSION_FIND_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "permission_repository.find_by_id");
                err
            })?;
        Ok(row.map(Into::into))
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Permission>> {
        let location = concat!(file!(), ":", line!());
        let row = sqlx::query_as::<_, PermissionRow>(PERMISSION_FIND_BY_NAME)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "permission_repository.find_by_name");
                err
            })?;
        Ok(row.map(Into::into))
    }

    async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<Permission>> {
        let location = concat!(file!(), ":", line!());
        let rows = sqlx::query_as::<_, PermissionRow>(PERMISSION_LIST)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "permission_repository.list");
                err
            })?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let location = concat!(file!(), ":", line!());
        sqlx::query(PERMISSION_DELETE)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "permission_repository.delete");
                err
            })?;
        Ok(())
    }

    async fn attach_to_role(&self, link: RolePermission) -> AppResult<()> {
        let location = concat!(file!(), ":", line!());
        sqlx::query(ROLE_PERMISSION_INSERT)
            .bind(link.role_id)
            .bind(link.permission_id)
            .bind(link.assigned_by)
            .bind(link.assigned_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "permission_repository.attach_to_role");
                err
            })?;
        Ok(())
    }

    async fn detach_from_role(&self, role_id: Uuid, permission_id: Uuid) -> AppResult<()> {
        let location = concat!(file!(), ":", line!());
        sqlx::query(ROLE_PERMISSION_DELETE)
            .bind(role_id)
            .bind(permission_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "permission_repository.detach_from_role");
                err
            })?;
        Ok(())
    }

    async fn permissions_for_role(&self, role_id: Uuid) -> AppResult<Vec<Permission>> {
        let location = concat!(file!(), ":", line!());
        let rows = sqlx::query_as::<_, PermissionRow>(PERMISSIONS_FOR_ROLE)
            .bind(role_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "permission_repository.permissions_for_role");
                err
            })?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn permissions_for_user(&self, user_id: Uuid) -> AppResult<Vec<Permission>> {
        let location = concat!(file!(), ":", line!());
        let rows = sqlx::query_as::<_, PermissionRow>(PERMISSIONS_FOR_USER)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "permission_repository.permissions_for_user");
                err
            })?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
