use crate::domain::entities::{Bundle, BundleStatus, Deployment, Environment};
use crate::domain::repositories::BundleRepository;
use crate::infrastructure::database::queries::bundles::*;
use crate::shared::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, FromRow)]
struct BundleRow {
    id: Uuid,
    tenant_id: Option<Uuid>,
    name: String,
    policy_ids: serde_json::Value,
    object_key: Option<String>,
    status: String,
    environment: Option<String>,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BundleRow> for Bundle {
    fn from(row: BundleRow) -> Self {
        let status = BundleStatus::parse(&row.status).unwrap_or_else(|| {
            tracing::warn!("Unknown bundle status {:?}, treating as failed", row.status);
            BundleStatus::Failed
        });
        let policy_ids: Vec<Uuid> = serde_json::from_value(row.policy_ids).unwrap_or_default();
        Bundle {
            id: row.id,
            tenant_id: row.tenant_id,
            name: row.name,
            policy_ids,
            object_key: row.object_key,
            status,
            environment: row.environment.as_deref().and_then(Environment::parse),
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct DeploymentRow {
    id: Uuid,
    bundle_id: Uuid,
    environment: String,
    deployed_by: Uuid,
    deployed_at: DateTime<Utc>,
    outcome: String,
}

impl From<DeploymentRow> for Deployment {
    fn from(row: DeploymentRow) -> Self {
        let environment = Environment::parse(&row.environment).unwrap_or_else(|| {
            tracing::warn!("Unknown environment {:?}, treating as dev", row.environment);
            Environment::Dev
        });
        Deployment {
            id: row.id,
            bundle_id: row.bundle_id,
            environment,
            deployed_by: row.deployed_by,
            deployed_at: row.deployed_at,
            outcome: row.outcome,
        }
    }
}

pub struct BundleRepositoryImpl {
    pool: PgPool,
}

impl BundleRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BundleRepository for BundleRepositoryImpl {
    async fn create(&self, bundle: Bundle) -> AppResult<Bundle> {
        let location = concat!(file!(), ":", line!());
        let policy_ids = serde_json::to_value(&bundle.policy_ids)?;
        let row = sqlx::query_as::<_, BundleRow>(BUNDLE_INSERT)
            .bind(bundle.id)
            .bind(bundle.tenant_id)
            .bind(&bundle.name)
            .bind(&policy_ids)
            .bind(bundle.object_key.as_ref())
            .bind(bundle.status.as_str())
            .bind(bundle.environment.map(|e| e.as_str()))
            .bind(bundle.created_by)
            .bind(bundle.created_at)
            .bind(bundle.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "bundle_repository.create");
                err
            })?;
        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Bundle>> {
        let location = concat!(file!(), ":", line!());
        let row = sqlx::query_as::<_, BundleRow>(BUNDLE_FIND_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "bundle_repository.find_by_id");
                err
            })?;
        Ok(row.map(Into::into))
    }

    async fn list_by_tenant(&self, tenant_id: Option<Uuid>) -> AppResult<Vec<Bundle>> {
        let location = concat!(file!(), ":", line!());
        let rows = sqlx::query_as::<_, BundleRow>(BUNDLE_LIST_BY_TENANT)
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "bundle_repository.list_by_tenant");
                err
            })?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, bundle: Bundle) -> AppResult<Bundle> {
        let location = concat!(file!(), ":", line!());
        let policy_ids = serde_json::to_value(&bundle.policy_ids)?;
        let row = sqlx::query_as::<_, BundleRow>(BUNDLE_UPDATE)
            .bind(bundle.id)
            .bind(&bundle.name)
            .bind(&policy_ids)
            .bind(bundle.object_key.as_ref())
            .bind(bundle.status.as_str())
            .bind(bundle.environment.map(|e| e.as_str()))
            .bind(bundle.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "bundle_repository.update");
                err
            })?;
        Ok(row.into())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let location = concat!(file!(), ":", line!());
        sqlx::query(BUNDLE_DELETE)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "bundle_repository.delete");
                err
            })?;
        Ok(())
    }

    async fn find_active(
        &self,
        tenant_id: Option<Uuid>,
        environment: Environment,
    ) -> AppResult<Option<Bundle>> {
        let location = concat!(file!(), ":", line!());
        let row = sqlx::query_as::<_, BundleRow>(BUNDLE_FIND_ACTIVE)
            .bind(tenant_id)
            .bind(environment.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "bundle_repository.find_active");
                err
            })?;
        Ok(row.map(Into::into))
    }

    async fn swap_active(&self, promoted: Bundle, demoted: Option<Bundle>) -> AppResult<Bundle> {
        let location = concat!(file!(), ":", line!());
        let mut tx = self.pool.begin().await.map_err(|e| {
            let err = AppError::Database(e);
            err.log_with_operation(location, "bundle_repository.swap_active");
            err
        })?;

        if let Some(demoted) = demoted {
            let policy_ids = serde_json::to_value(&demoted.policy_ids)?;
            sqlx::query_as::<_, BundleRow>(BUNDLE_UPDATE)
                .bind(demoted.id)
                .bind(&demoted.name)
                .bind(&policy_ids)
                .bind(demoted.object_key.as_ref())
                .bind(demoted.status.as_str())
                .bind(demoted.environment.map(|e| e.as_str()))
                .bind(demoted.updated_at)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| {
                    let err = AppError::Database(e);
                    err.log_with_operation(location, "bundle_repository.swap_active");
                    err
                })?;
        }

        let policy_ids = serde_json::to_value(&promoted.policy_ids)?;
        let row = sqlx::query_as::<_, BundleRow>(BUNDLE_UPDATE)
            .bind(promoted.id)
            .bind(&promoted.name)
            .bind(&policy_ids)
            .bind(promoted.object_key.as_ref())
            .bind(promoted.status.as_str())
            .bind(promoted.environment.map(|e| e.as_str()))
            .bind(promoted.updated_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "bundle_repository.swap_active");
                err
            })?;

        tx.commit().await.map_err(|e| {
            let err = AppError::Database(e);
            err.log_with_operation(location, "bundle_repository.swap_active");
            err
        })?;
        Ok(row.into())
    }

    async fn create_deployment(&self, deployment: Deployment) -> AppResult<Deployment> {
        let location = concat!(file!(), ":", line!());
        let row = sqlx::query_as::<_, DeploymentRow>(DEPLOYMENT_INSERT)
            .bind(deployment.id)
            .bind(deployment.bundle_id)
            .bind(deployment.environment.as_str())
            .bind(deployment.deployed_by)
            .bind(deployment.deployed_at)
            .bind(&deployment.outcome)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "bundle_repository.create_deployment");
                err
            })?;
        Ok(row.into())
    }

    async fn list_deployments(&self, bundle_id: Uuid) -> AppResult<Vec<Deployment>> {
        let location = concat!(file!(), ":", line!());
        let rows = sqlx::query_as::<_, DeploymentRow>(DEPLOYMENT_LIST)
            .bind(bundle_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "bundle_repository.list_deployments");
                err
            })?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
