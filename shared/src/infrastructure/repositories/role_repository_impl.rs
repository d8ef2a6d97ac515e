use crate::domain::entities::{Role, UserRole};
use crate::domain::repositories::RoleRepository;
use crate::infrastructure::database::queries::roles::*;
use crate::shared::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, FromRow)]
struct RoleRow {
    id: Uuid,
    tenant_id: Uuid,
    name: String,
    description: Option<String>,
    parent_role_id: Option<Uuid>,
    is_system: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<RoleRow> for Role {
    fn from(row: RoleRow) -> Self {
        Role {
            id: row.id,
            tenant_id: row.tenant_id,
            name: row.name,
            description: row.description,
            parent_role_id: row.parent_role_id,
            is_system: row.is_system,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

pub struct RoleRepositoryImpl {
    pool: PgPool,
}

impl RoleRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleRepository for RoleRepositoryImpl {
    async fn create(&self, role: Role) -> AppResult<Role> {
        let location = concat!(file!(), ":", line!());
        let row = sqlx::query_as::<_, RoleRow>(ROLE_INSERT)
            .bind(role.id)
            .bind(role.tenant_id)
            .bind(&role.name)
            .bind(role.description.as_ref())
            .bind(role.parent_role_id)
            .bind(role.is_system)
            .bind(role.created_at)
            .bind(role.updated_at)
            .bind(role.deleted_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                let err = super::map_insert_error(e, || {
                    AppError::Conflict(format!("role {} already exists", role.name))
                });
                err.log_with_operation(location, "role_repository.create");
                err
            })?;
        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Role>> {
        let location = concat!(file!(), ":", line!());
        let row = sqlx::query_as::<_, RoleRow>(ROLE_FIND_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "role_repository.find_by_id");
                err
            })?;
        Ok(row.map(Into::into))
    }

    async fn find_by_name(&self, tenant_id: Uuid, name: &str) -> AppResult<Option<Role>> {
        let location = concat!(file!(), ":", line!());
        let row = sqlx::query_as::<_, RoleRow>(ROLE_FIND_BY_NAME)
            .bind(tenant_id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "role_repository.find_by_name");
                err
            })?;
        Ok(row.map(Into::into))
    }

    async fn list_by_tenant(&self, tenant_id: Uuid) -> AppResult<Vec<Role>> {
        let location = concat!(file!(), ":", line!());
        let rows = sqlx::query_as::<_, RoleRow>(ROLE_LIST_BY_TENANT)
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "role_repository.list_by_tenant");
                err
            })?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, role: Role) -> AppResult<Role> {
        let location = concat!(file!(), ":", line!());
        let row = sqlx::query_as::<_, RoleRow>(ROLE_UPDATE)
            .bind(role.id)
            .bind(&role.name)
            .bind(role.description.as_ref())
            .bind(role.parent_role_id)
            .bind(role.updated_at)
            .bind(role.deleted_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "role_repository.update");
                err
            })?;
        Ok(row.into())
    }

    async fn count_by_tenant(&self, tenant_id: Uuid) -> AppResult<i64> {
        let location = concat!(file!(), ":", line!());
        let (count,): (i64,) = sqlx::query_as(ROLE_COUNT_BY_TENANT)
            .bind(tenant_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "role_repository.count_by_tenant");
                err
            })?;
        Ok(count)
    }

    async fn assign_to_user(&self, link: UserRole) -> AppResult<()> {
        let location = concat!(file!(), ":", line!());
        sqlx::query(USER_ROLE_INSERT)
            .bind(link.user_id)
            .bind(link.role_id)
            .bind(link.assigned_by)
            .bind(link.assigned_at)
            .bind(link.expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "role_repository.assign_to_user");
                err
            })?;
        Ok(())
    }

    async fn remove_from_user(&self, user_id: Uuid, role_id: Uuid) -> AppResult<()> {
        let location = concat!(file!(), ":", line!());
        sqlx::query(USER_ROLE_DELETE)
            .bind(user_id)
            .bind(role_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "role_repository.remove_from_user");
                err
            })?;
        Ok(())
    }

    async fn roles_for_user(&self, user_id: Uuid) -> AppResult<Vec<Role>> {
        let location = concat!(file!(), ":", line!());
        let rows = sqlx::query_as::<_, RoleRow>(ROLES_FOR_USER)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "role_repository.roles_for_user");
                err
            })?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
