use shared::domain::entities::Tenant;
use shared::domain::repositories::TenantRepository;
use shared::{AppError, AppResult};
use std::sync::Arc;

use crate::dto::{CreateTenantRequest, TenantResponse};

const DEFAULT_MAX_USERS: i64 = 1000;
const DEFAULT_MAX_ROLES: i64 = 100;

/// Tenant creation. The route is gated on the global `tenants:create`
/// capability by the decision middleware.
pub struct CreateTenantUseCase {
    tenants: Arc<dyn TenantRepository>,
}

impl CreateTenantUseCase {
    pub fn new(tenants: Arc<dyn TenantRepository>) -> Self {
        Self { tenants }
    }

    pub async fn execute(&self, request: CreateTenantRequest) -> AppResult<TenantResponse> {
        if request.name.trim().is_empty() {
            return Err(AppError::Validation("tenant name must not be empty".to_string()));
        }
        if !Tenant::is_valid_slug(&request.slug) {
            return Err(AppError::Validation(format!(
                "invalid tenant slug {:?}",
                request.slug
            )));
        }
        if self.tenants.find_by_slug(&request.slug).await?.is_some() {
            return Err(AppError::TenantExists(request.slug.clone()));
        }

        let mut tenant = Tenant::new(
            request.name,
            request.slug,
            request.max_users.unwrap_or(DEFAULT_MAX_USERS),
            request.max_roles.unwrap_or(DEFAULT_MAX_ROLES),
        );
        if let Some(settings) = request.settings {
            tenant.settings = settings;
        }
        let tenant = self.tenants.create(tenant).await?;
        Ok(tenant.into())
    }
}
