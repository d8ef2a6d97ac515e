use crate::domain::entities::{Tenant, TenantStatus};
use crate::domain::repositories::TenantRepository;
use crate::infrastructure::database::queries::tenants::*;
use crate::shared::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, FromRow)]
struct TenantRow {
    id: Uuid,
    name: String,
    slug: String,
    status: String,
    max_users: i64,
    max_roles: i64,
    settings: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<TenantRow> for Tenant {
    fn from(row: TenantRow) -> Self {
        let status = TenantStatus::parse(&row.status).unwrap_or_else(|| {
            tracing::warn!("Unknown tenant status {:?}, treating as suspended", row.status);
            TenantStatus::Suspended
        });
        Tenant {
            id: row.id,
            name: row.name,
            slug: row.slug,
            status,
            max_users: row.max_users,
            max_roles: row.max_roles,
            settings: row.settings,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

pub struct TenantRepositoryImpl {
    pool: PgPool,
}

impl TenantRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantRepository for TenantRepositoryImpl {
    async fn create(&self, tenant: Tenant) -> AppResult<Tenant> {
        let location = concat!(file!(), ":", line!());
        let row = sqlx::query_as::<_, TenantRow>(TENANT_INSERT)
            .bind(tenant.id)
            .bind(&tenant.name)
            .bind(&tenant.slug)
            .bind(tenant.status.as_str())
            .bind(tenant.max_users)
            .bind(tenant.max_roles)
            .bind(&tenant.settings)
            .bind(tenant.created_at)
            .bind(tenant.updated_at)
            .bind(tenant.deleted_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                let err = super::map_insert_error(e, || {
                    AppError::TenantExists(tenant.slug.clone())
                });
                err.log_with_operation(location, "tenant_repository.create");
                err
            })?;
        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Tenant>> {
        let location = concat!(file!(), ":", line!());
        let row = sqlx::query_as::<_, TenantRow>(TENANT_FIND_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "tenant_repository.find_by_id");
                err
            })?;
        Ok(row.map(Into::into))
    }

    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Tenant>> {
        let location = concat!(file!(), ":", line!());
        let row = sqlx::query_as::<_, TenantRow>(TENANT_FIND_BY_SLUG)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "tenant_repository.find_by_slug");
                err
            })?;
        Ok(row.map(Into::into))
    }

    async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<Tenant>> {
        let location = concat!(file!(), ":", line!());
        let rows = sqlx::query_as::<_, TenantRow>(TENANT_LIST)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "tenant_repository.list");
                err
            })?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, tenant: Tenant) -> AppResult<Tenant> {
        let location = concat!(file!(), ":", line!());
        let row = sqlx::query_as::<_, TenantRow>(TENANT_UPDATE)
            .bind(tenant.id)
            .bind(&tenant.name)
            .bind(&tenant.slug)
            .bind(tenant.status.as_str())
            .bind(tenant.max_users)
            .bind(tenant.max_roles)
            .bind(&tenant.settings)
            .bind(tenant.updated_at)
            .bind(tenant.deleted_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "tenant_repository.update");
                err
            })?;
        Ok(row.into())
    }
}
