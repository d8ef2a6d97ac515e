use authz_core::authorization::PermissionChecker;
use shared::domain::repositories::TenantRepository;
use shared::{AppError, AppResult};
use std::sync::Arc;
use uuid::Uuid;

use crate::dto::{TenantResponse, UpdateTenantRequest};

pub struct UpdateTenantUseCase {
    tenants: Arc<dyn TenantRepository>,
    checker: Arc<PermissionChecker>,
}

impl UpdateTenantUseCase {
    pub fn new(tenants: Arc<dyn TenantRepository>, checker: Arc<PermissionChecker>) -> Self {
        Self { tenants, checker }
    }

    pub async fn execute(
        &self,
        tenant_id: Uuid,
        request: UpdateTenantRequest,
    ) -> AppResult<TenantResponse> {
        let mut tenant = self
            .tenants
            .find_by_id(tenant_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("tenant {}", tenant_id)))?;

        if let Some(name) = request.name {
            if name.trim().is_empty() {
                return Err(AppError::Validation("tenant name must not be empty".to_string()));
            }
            tenant.name = name;
        }
        if let Some(max_users) = request.max_users {
            tenant.max_users = max_users;
        }
        if let Some(max_roles) = request.max_roles {
            tenant.max_roles = max_roles;
        }
        if let Some(settings) = request.settings {
            tenant.settings = settings;
        }
        tenant.updated_at = chrono::Utc::now();

        let tenant = self.tenants.update(tenant).await?;
        Ok(tenant.into())
    }

    /// Suspension is a mandatory global deny; cached allows must not
    /// survive it.
    pub async fn suspend(&self, tenant_id: Uuid) -> AppResult<TenantResponse> {
        let mut tenant = self
            .tenants
            .find_by_id(tenant_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("tenant {}", tenant_id)))?;
        tenant.suspend();
        let tenant = self.tenants.update(tenant).await?;
        self.checker.invalidate_tenant(tenant.id).await?;
        Ok(tenant.into())
    }

    pub async fn activate(&self, tenant_id: Uuid) -> AppResult<TenantResponse> {
        let mut tenant = self
            .tenants
            .find_by_id(tenant_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("tenant {}", tenant_id)))?;
        tenant.activate();
        let tenant = self.tenants.update(tenant).await?;
        self.checker.invalidate_tenant(tenant.id).await?;
        Ok(tenant.into())
    }
}
