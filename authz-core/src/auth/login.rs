use shared::domain::entities::User;
use shared::domain::repositories::{RoleRepository, TenantRepository, UserRepository};
use shared::infrastructure::idp::{IdentityProvider, IdpUser};
use shared::{AppError, AppResult};
use std::sync::Arc;

use crate::dto::{AuthResponse, LoginRequest};
use crate::session::TokenService;

pub struct LoginUseCase {
    idp: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
    tenants: Arc<dyn TenantRepository>,
    tokens: Arc<TokenService>,
    default_tenant_slug: String,
}

impl LoginUseCase {
    pub fn new(
        idp: Arc<dyn IdentityProvider>,
        users: Arc<dyn UserRepository>,
        roles: Arc<dyn RoleRepository>,
        tenants: Arc<dyn TenantRepository>,
        tokens: Arc<TokenService>,
        default_tenant_slug: String,
    ) -> Self {
        Self {
            idp,
            users,
            roles,
            tenants,
            tokens,
            default_tenant_slug,
        }
    }

    pub async fn execute(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let idp_user = self
            .idp
            .authenticate(&request.email, &request.password)
            .await?;

        let mut user = self.find_or_create(&idp_user).await?;
        user.record_login();
        let user = self.users.update(user).await?;

        let roles = self.roles.roles_for_user(user.id).await?;
        let role_names: Vec<String> = roles.into_iter().map(|r| r.name).collect();

        let pair = self
            .tokens
            .issue_pair(&user, &role_names, idp_user.mfa_verified, request.remember_me)
            .await?;
        Ok(AuthResponse::new(pair, user))
    }

    /// Local rows are created lazily for credentials that already exist at
    /// the IdP, keyed by the external subject so retries are idempotent.
    async fn find_or_create(&self, idp_user: &IdpUser) -> AppResult<User> {
        if let Some(user) = self
            .users
            .find_by_external_subject(&idp_user.subject_id)
            .await?
        {
            return Ok(user);
        }
        let tenant = self
            .tenants
            .find_by_slug(&self.default_tenant_slug)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "default tenant {} is not seeded",
                    self.default_tenant_slug
                ))
            })?;
        self.users
            .create(User::new(
                tenant.id,
                idp_user.email.clone(),
                idp_user.subject_id.clone(),
                None,
                None,
            ))
            .await
    }
}
