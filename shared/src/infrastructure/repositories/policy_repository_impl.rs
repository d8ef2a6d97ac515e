use crate::domain::entities::{Policy, PolicyStatus, PolicyTestCase, PolicyType, PolicyVersion};
use crate::domain::repositories::PolicyRepository;
use crate::infrastructure::database::queries::policies::*;
use crate::shared::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres};
use uuid::Uuid;

#[derive(Debug, FromRow)]
struct PolicyRow {
    id: Uuid,
    tenant_id: Uuid,
    name: String,
    description: Option<String>,
    path: String,
    policy_type: String,
    content: String,
    status: String,
    version: i32,
    is_valid: bool,
    validated_at: Option<DateTime<Utc>>,
    validation_error: Option<String>,
    published_at: Option<DateTime<Utc>>,
    published_by: Option<Uuid>,
    tags: serde_json::Value,
    metadata: serde_json::Value,
    test_cases: serde_json::Value,
    is_system: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<PolicyRow> for Policy {
    fn from(row: PolicyRow) -> Self {
        let policy_type = PolicyType::parse(&row.policy_type).unwrap_or_else(|| {
            tracing::warn!("Unknown policy type {:?}, treating as rego", row.policy_type);
            PolicyType::Rego
        });
        let status = PolicyStatus::parse(&row.status).unwrap_or_else(|| {
            tracing::warn!("Unknown policy status {:?}, treating as draft", row.status);
            PolicyStatus::Draft
        });
        let tags: Vec<String> = serde_json::from_value(row.tags).unwrap_or_default();
        let test_cases: Vec<PolicyTestCase> =
            serde_json::from_value(row.test_cases).unwrap_or_default();
        Policy {
            id: row.id,
            tenant_id: row.tenant_id,
            name: row.name,
            description: row.description,
            path: row.path,
            policy_type,
            content: row.content,
            status,
            version: row.version,
            is_valid: row.is_valid,
            validated_at: row.validated_at,
            validation_error: row.validation_error,
            published_at: row.published_at,
            published_by: row.published_by,
            tags,
            metadata: row.metadata,
            test_cases,
            is_system: row.is_system,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct PolicyVersionRow {
    id: Uuid,
    policy_id: Uuid,
    version: i32,
    content: String,
    change_note: Option<String>,
    created_by: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl From<PolicyVersionRow> for PolicyVersion {
    fn from(row: PolicyVersionRow) -> Self {
        PolicyVersion {
            id: row.id,
            policy_id: row.policy_id,
            version: row.version,
            content: row.content,
            change_note: row.change_note,
            created_by: row.created_by,
            created_at: row.created_at,
        }
    }
}

pub struct PolicyRepositoryImpl {
    pool: PgPool,
}

impl PolicyRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn bind_update<'q>(
        query: sqlx::query::QueryAs<'q, Postgres, PolicyRow, sqlx::postgres::PgArguments>,
        policy: &'q Policy,
        tags: &'q serde_json::Value,
        test_cases: &'q serde_json::Value,
    ) -> sqlx::query::QueryAs<'q, Postgres, PolicyRow, sqlx::postgres::PgArguments> {
        query
            .bind(policy.id)
            .bind(&policy.name)
            .bind(policy.description.as_ref())
            .bind(&policy.path)
            .bind(&policy.content)
            .bind(policy.status.as_str())
            .bind(policy.version)
            .bind(policy.is_valid)
            .bind(policy.validated_at)
            .bind(policy.validation_error.as_ref())
            .bind(policy.published_at)
            .bind(policy.published_by)
            .bind(tags)
            .bind(&policy.metadata)
            .bind(test_cases)
            .bind(policy.updated_at)
            .bind(policy.deleted_at)
    }
}

#[async_trait]
impl PolicyRepository for PolicyRepositoryImpl {
    async fn create(&self, policy: Policy) -> AppResult<Policy> {
        let location = concat!(file!(), ":", line!());
        let tags = serde_json::to_value(&policy.tags)?;
        let test_cases = serde_json::to_value(&policy.test_cases)?;
        let row = sqlx::query_as::<_, PolicyRow>(POLICY_INSERT)
            .bind(policy.id)
            .bind(policy.tenant_id)
            .bind(&policy.name)
            .bind(policy.description.as_ref())
            .bind(&policy.path)
            .bind(policy.policy_type.as_str())
            .bind(&policy.content)
            .bind(policy.status.as_str())
            .bind(policy.version)
            .bind(policy.is_valid)
            .bind(policy.validated_at)
            .bind(policy.validation_error.as_ref())
            .bind(policy.published_at)
            .bind(policy.published_by)
            .bind(&tags)
            .bind(&policy.metadata)
            .bind(&test_cases)
            .bind(policy.is_system)
            .bind(policy.created_at)
            .bind(policy.updated_at)
            .bind(policy.deleted_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                let err = super::map_insert_error(e, || {
                    AppError::Conflict(format!("policy {} already exists", policy.name))
                });
                err.log_with_operation(location, "policy_repository.create");
                err
            })?;
        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Policy>> {
        let location = concat!(file!(), ":", line!());
        let row = sqlx::query_as::<_, PolicyRow>(POLICY_FIND_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "policy_repository.find_by_id");
                err
            })?;
        Ok(row.map(Into::into))
    }

    async fn find_by_name(&self, tenant_id: Uuid, name: &str) -> AppResult<Option<Policy>> {
        let location = concat!(file!(), ":", line!());
        let row = sqlx::query_as::<_, PolicyRow>(POLICY_FIND_BY_NAME)
            .bind(tenant_id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "policy_repository.find_by_name");
                err
            })?;
        Ok(row.map(Into::into))
    }

    async fn list_by_tenant(
        &self,
        tenant_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Policy>> {
        let location = concat!(file!(), ":", line!());
        let rows = sqlx::query_as::<_, PolicyRow>(POLICY_LIST_BY_TENANT)
            .bind(tenant_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "policy_repository.list_by_tenant");
                err
            })?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, policy: Policy) -> AppResult<Policy> {
        let location = concat!(file!(), ":", line!());
        let tags = serde_json::to_value(&policy.tags)?;
        let test_cases = serde_json::to_value(&policy.test_cases)?;
        let row = Self::bind_update(
            sqlx::query_as::<_, PolicyRow>(POLICY_UPDATE),
            &policy,
            &tags,
            &test_cases,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let err = AppError::Database(e);
            err.log_with_operation(location, "policy_repository.update");
            err
        })?;
        Ok(row.into())
    }

    async fn update_with_version(
        &self,
        policy: Policy,
        version: PolicyVersion,
    ) -> AppResult<Policy> {
        let location = concat!(file!(), ":", line!());
        let tags = serde_json::to_value(&policy.tags)?;
        let test_cases = serde_json::to_value(&policy.test_cases)?;

        // Snapshot and update must land together or not at all.
        let mut tx = self.pool.begin().await.map_err(|e| {
            let err = AppError::Database(e);
            err.log_with_operation(location, "policy_repository.update_with_version");
            err
        })?;

        sqlx::query(POLICY_VERSION_INSERT)
            .bind(version.id)
            .bind(version.policy_id)
            .bind(version.version)
            .bind(&version.content)
            .bind(version.change_note.as_ref())
            .bind(version.created_by)
            .bind(version.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "policy_repository.update_with_version");
                err
            })?;

        let row = Self::bind_update(
            sqlx::query_as::<_, PolicyRow>(POLICY_UPDATE),
            &policy,
            &tags,
            &test_cases,
        )
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            let err = AppError::Database(e);
            err.log_with_operation(location, "policy_repository.update_with_version");
            err
        })?;

        tx.commit().await.map_err(|e| {
            let err = AppError::Database(e);
            err.log_with_operation(location, "policy_repository.update_with_version");
            err
        })?;
        Ok(row.into())
    }

    async fn count_by_tenant(&self, tenant_id: Uuid) -> AppResult<i64> {
        let location = concat!(file!(), ":", line!());
        let (count,): (i64,) = sqlx::query_as(POLICY_COUNT_BY_TENANT)
            .bind(tenant_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "policy_repository.count_by_tenant");
                err
            })?;
        Ok(count)
    }

    async fn list_versions(&self, policy_id: Uuid) -> AppResult<Vec<PolicyVersion>> {
        let location = concat!(file!(), ":", line!());
        let rows = sqlx::query_as::<_, PolicyVersionRow>(POLICY_VERSION_LIST)
            .bind(policy_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "policy_repository.list_versions");
                err
            })?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_version(
        &self,
        policy_id: Uuid,
        version: i32,
    ) -> AppResult<Option<PolicyVersion>> {
        let location = concat!(file!(), ":", line!());
        let row = sqlx::query_as::<_, PolicyVersionRow>(POLICY_VERSION_FIND)
            .bind(policy_id)
            .bind(version)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "policy_repository.find_version");
                err
            })?;
        Ok(row.map(Into::into))
    }
}
