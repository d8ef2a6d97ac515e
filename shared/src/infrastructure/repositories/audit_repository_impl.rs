use crate::domain::entities::AuditEntry;
use crate::domain::repositories::AuditRepository;
use crate::infrastructure::database::queries::audit::*;
use crate::shared::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, FromRow)]
struct AuditRow {
    id: Uuid,
    tenant_id: Option<Uuid>,
    user_id: Option<Uuid>,
    event_type: String,
    resource_type: String,
    resource_id: Option<String>,
    outcome: Option<String>,
    ip_address: Option<String>,
    user_agent: Option<String>,
    extras: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl From<AuditRow> for AuditEntry {
    fn from(row: AuditRow) -> Self {
        AuditEntry {
            id: row.id,
            tenant_id: row.tenant_id,
            user_id: row.user_id,
            event_type: row.event_type,
            resource_type: row.resource_type,
            resource_id: row.resource_id,
            outcome: row.outcome,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            extras: row.extras,
            created_at: row.created_at,
        }
    }
}

pub struct AuditRepositoryImpl {
    pool: PgPool,
}

impl AuditRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditRepository for AuditRepositoryImpl {
    async fn append(&self, entry: AuditEntry) -> AppResult<()> {
        let location = concat!(file!(), ":", line!());
        sqlx::query(AUDIT_INSERT)
            .bind(entry.id)
            .bind(entry.tenant_id)
            .bind(entry.user_id)
            .bind(&entry.event_type)
            .bind(&entry.resource_type)
            .bind(entry.resource_id.as_ref())
            .bind(entry.outcome.as_ref())
            .bind(entry.ip_address.as_ref())
            .bind(entry.user_agent.as_ref())
            .bind(&entry.extras)
            .bind(entry.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "audit_repository.append");
                err
            })?;
        Ok(())
    }

    async fn recent_for_tenant(&self, tenant_id: Uuid, limit: i64) -> AppResult<Vec<AuditEntry>> {
        let location = concat!(file!(), ":", line!());
        let rows = sqlx::query_as::<_, AuditRow>(AUDIT_RECENT_FOR_TENANT)
            .bind(tenant_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                let err = AppError::Database(e);
                err.log_with_operation(location, "audit_repository.recent_for_tenant");
                err
            })?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
