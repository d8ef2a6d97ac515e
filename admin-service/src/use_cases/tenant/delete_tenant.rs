use authz_core::authorization::PermissionChecker;
use shared::domain::repositories::{TenantRepository, UserRepository};
use shared::{AppError, AppResult};
use std::sync::Arc;
use uuid::Uuid;

pub struct DeleteTenantUseCase {
    tenants: Arc<dyn TenantRepository>,
    users: Arc<dyn UserRepository>,
    checker: Arc<PermissionChecker>,
}

impl DeleteTenantUseCase {
    pub fn new(
        tenants: Arc<dyn TenantRepository>,
        users: Arc<dyn UserRepository>,
        checker: Arc<PermissionChecker>,
    ) -> Self {
        Self {
            tenants,
            users,
            checker,
        }
    }

    /// Soft delete. Refused while any user still belongs to the tenant.
    pub async fn execute(&self, tenant_id: Uuid) -> AppResult<()> {
        let mut tenant = self
            .tenants
            .find_by_id(tenant_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("tenant {}", tenant_id)))?;

        let user_count = self.users.count_by_tenant(tenant_id).await?;
        if user_count > 0 {
            return Err(AppError::Conflict(format!(
                "tenant still has {} users",
                user_count
            )));
        }

        tenant.mark_deleted();
        self.tenants.update(tenant).await?;
        self.checker.invalidate_tenant(tenant_id).await?;
        Ok(())
    }
}
