use shared::domain::entities::{Tenant, User};
use shared::domain::repositories::{TenantRepository, UserRepository};
use shared::infrastructure::idp::IdentityProvider;
use shared::{AppError, AppResult};
use std::sync::Arc;
use uuid::Uuid;

use crate::dto::{AuthResponse, RegisterRequest};
use crate::session::TokenService;

use super::validate::{validate_email, validate_password};

pub struct RegisterUseCase {
    idp: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserRepository>,
    tenants: Arc<dyn TenantRepository>,
    tokens: Arc<TokenService>,
    default_tenant_slug: String,
}

impl RegisterUseCase {
    pub fn new(
        idp: Arc<dyn IdentityProvider>,
        users: Arc<dyn UserRepository>,
        tenants: Arc<dyn TenantRepository>,
        tokens: Arc<TokenService>,
        default_tenant_slug: String,
    ) -> Self {
        Self {
            idp,
            users,
            tenants,
            tokens,
            default_tenant_slug,
        }
    }

    pub async fn execute(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        validate_email(&request.email)?;
        validate_password(&request.password)?;
        if request.first_name.trim().is_empty() || request.last_name.trim().is_empty() {
            return Err(AppError::Validation("name fields must not be empty".to_string()));
        }

        let tenant = self.resolve_tenant(request.tenant_id).await?;
        if !tenant.is_active() {
            return Err(AppError::Forbidden("tenant is not active".to_string()));
        }
        let user_count = self.users.count_by_tenant(tenant.id).await?;
        if user_count >= tenant.max_users {
            return Err(AppError::Conflict("tenant user quota reached".to_string()));
        }
        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::UserExists(request.email.clone()));
        }

        let idp_user = self
            .idp
            .create_user(
                &request.email,
                &request.password,
                Some(&request.first_name),
                Some(&request.last_name),
            )
            .await?;

        let user = User::new(
            tenant.id,
            request.email.clone(),
            idp_user.subject_id.clone(),
            Some(request.first_name.clone()),
            Some(request.last_name.clone()),
        );
        let user = match self.users.create(user).await {
            Ok(user) => user,
            Err(e) => {
                // The credential exists but the local row does not; undo the
                // IdP side so the email is not burned.
                if let Err(rollback) = self.idp.delete_user(&idp_user.subject_id).await {
                    tracing::error!(
                        "IdP rollback failed for {}: {}",
                        idp_user.subject_id,
                        rollback
                    );
                }
                return Err(e);
            }
        };

        let pair = self
            .tokens
            .issue_pair(&user, &[], idp_user.mfa_verified, false)
            .await?;
        Ok(AuthResponse::new(pair, user))
    }

    async fn resolve_tenant(&self, tenant_id: Option<Uuid>) -> AppResult<Tenant> {
        match tenant_id {
            Some(id) => self
                .tenants
                .find_by_id(id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("tenant {}", id))),
            None => self
                .tenants
                .find_by_slug(&self.default_tenant_slug)
                .await?
                .ok_or_else(|| {
                    AppError::Internal(format!(
                        "default tenant {} is not seeded",
                        self.default_tenant_slug
                    ))
                }),
        }
    }
}
