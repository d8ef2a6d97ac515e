use crate::domain::entities::User;
use crate::domain::repositories::UserRepository;
use crate::infrastructure::database::queries::users::*;
use crate::shared::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    tenant_id: Uuid,
    email: String,
    external_subject_id: String,
    first_name: Option<String>,
    last_name: Option<String>,
    metadata: serde_json::Value,
    login_count: i64,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            tenant_id: row.tenant_id,
            email: row.email,
            external_subject_id: row.external_subject_id,
            first_name: row.first_name,
            last_name: row.last_name,
            metadata: row.metadata,
            login_count: row.login_count,
            last_login_at: row.last_login_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

pub struct UserRepositoryImpl {
    pool: PgPool,
}

impl UserRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    async fn create(&self, user: User) -> AppResult<User> {
        let location = concat!(file!(), ":", line!());
        let row = sqlx::query_as::<_, UserRow>(USER_INSERT)
            .bind(user.id)
            .bind(user.tenant_id)
            .bind(&user.email)
            .bind(&user.external_subject_id)
            .bind(user.first_name.as_ref())
            .bind(user.last_name.as_ref())
            .bind(&user.metadata)
            .bind(user.login_count)
            .bind(user.last_login_at)
            .bind(user.created_at)
            .bind(user.updated_at)
            .bind(user.deleted_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                let err =
                    super::map_insert_error(e, || AppError::UserExists(user.email.clone()));
                err.log_with_operation(location, "user_repository.create");
                err
            })?;
        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let location = concat!(file!(), ":", line!());
        let row = sqlx::query_as::<_, UserRow>(USER_FIND_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "user_repository.find_by_id");
                err
            })?;
        Ok(row.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let location = concat!(file!(), ":", line!());
        let row = sqlx::query_as::<_, UserRow>(USER_FIND_BY_EMAIL)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "user_repository.find_by_email");
                err
            })?;
        Ok(row.map(Into::into))
    }

    async fn find_by_external_subject(&self, subject_id: &str) -> AppResult<Option<User>> {
        let location = concat!(file!(), ":", line!());
        let row = sqlx::query_as::<_, UserRow>(USER_FIND_BY_EXTERNAL_SUBJECT)
            .bind(subject_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "user_repository.find_by_external_subject");
                err
            })?;
        Ok(row.map(Into::into))
    }

    async fn list_by_tenant(
        &self,
        tenant_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<User>> {
        let location = concat!(file!(), ":", line!());
        let rows = sqlx::query_as::<_, UserRow>(USER_LIST_BY_TENANT)
            .bind(tenant_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "user_repository.list_by_tenant");
                err
            })?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, user: User) -> AppResult<User> {
        let location = concat!(file!(), ":", line!());
        let row = sqlx::query_as::<_, UserRow>(USER_UPDATE)
            .bind(user.id)
            .bind(&user.email)
            .bind(user.first_name.as_ref())
            .bind(user.last_name.as_ref())
            .bind(&user.metadata)
            .bind(user.login_count)
            .bind(user.last_login_at)
            .bind(user.updated_at)
            .bind(user.deleted_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "user_repository.update");
                err
            })?;
        Ok(row.into())
    }

    async fn count_by_tenant(&self, tenant_id: Uuid) -> AppResult<i64> {
        let location = concat!(file!(), ":", line!());
        let (count,): (i64,) = sqlx::query_as(USER_COUNT_BY_TENANT)
            .bind(tenant_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "user_repository.count_by_tenant");
                err
            })?;
        Ok(count)
    }
}
