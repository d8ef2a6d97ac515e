use shared::domain::entities::Environment;
use shared::domain::repositories::{
    BundleRepository, PolicyRepository, RoleRepository, TenantRepository, UserRepository,
};
use shared::{AppError, AppResult};
use std::sync::Arc;
use uuid::Uuid;

use crate::dto::{TenantResponse, TenantStatsResponse};

pub struct GetTenantUseCase {
    tenants: Arc<dyn TenantRepository>,
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
    policies: Arc<dyn PolicyRepository>,
    bundles: Arc<dyn BundleRepository>,
}

impl GetTenantUseCase {
    pub fn new(
        tenants: Arc<dyn TenantRepository>,
        users: Arc<dyn UserRepository>,
        roles: Arc<dyn RoleRepository>,
        policies: Arc<dyn PolicyRepository>,
        bundles: Arc<dyn BundleRepository>,
    ) -> Self {
        Self {
            tenants,
            users,
            roles,
            policies,
            bundles,
        }
    }

    pub async fn by_id(&self, tenant_id: Uuid) -> AppResult<TenantResponse> {
        let tenant = self
            .tenants
            .find_by_id(tenant_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("tenant {}", tenant_id)))?;
        Ok(tenant.into())
    }

    pub async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<TenantResponse>> {
        let tenants = self.tenants.list(limit, offset).await?;
        Ok(tenants.into_iter().map(Into::into).collect())
    }

    pub async fn stats(&self, tenant_id: Uuid) -> AppResult<TenantStatsResponse> {
        if self.tenants.find_by_id(tenant_id).await?.is_none() {
            return Err(AppError::NotFound(format!("tenant {}", tenant_id)));
        }

        let user_count = self.users.count_by_tenant(tenant_id).await?;
        let role_count = self.roles.count_by_tenant(tenant_id).await?;
        let policy_count = self.policies.count_by_tenant(tenant_id).await?;

        let mut active_bundles = Vec::new();
        for environment in [Environment::Dev, Environment::Staging, Environment::Production] {
            if self
                .bundles
                .find_active(Some(tenant_id), environment)
                .await?
                .is_some()
            {
                active_bundles.push(environment.as_str().to_string());
            }
        }

        Ok(TenantStatsResponse {
            user_count,
            role_count,
            policy_count,
            active_bundles,
        })
    }
}
