use shared::domain::entities::User;
use shared::domain::repositories::{PermissionRepository, RoleRepository, UserRepository};
use shared::infrastructure::idp::IdentityProvider;
use shared::{AppError, AppResult};
use std::sync::Arc;
use uuid::Uuid;

use crate::dto::{MePermissionsResponse, UpdateProfileRequest, UserResponse};
use crate::session::TokenService;

pub struct UserInfoUseCase {
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
    permissions: Arc<dyn PermissionRepository>,
}

impl UserInfoUseCase {
    pub fn new(
        users: Arc<dyn UserRepository>,
        roles: Arc<dyn RoleRepository>,
        permissions: Arc<dyn PermissionRepository>,
    ) -> Self {
        Self {
            users,
            roles,
            permissions,
        }
    }

    pub async fn profile(&self, user_id: Uuid) -> AppResult<UserResponse> {
        let user = self.load(user_id).await?;
        Ok(user.into())
    }

    /// Effective roles and permissions, resolved through the RBAC tables.
    pub async fn effective_permissions(&self, user_id: Uuid) -> AppResult<MePermissionsResponse> {
        let roles = self.roles.roles_for_user(user_id).await?;
        let permissions = self.permissions.permissions_for_user(user_id).await?;
        Ok(MePermissionsResponse {
            roles: roles.into_iter().map(|r| r.name).collect(),
            permissions: permissions.into_iter().map(|p| p.name).collect(),
        })
    }

    async fn load(&self, user_id: Uuid) -> AppResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {}", user_id)))
    }
}

pub struct UpdateProfileUseCase {
    idp: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserRepository>,
}

impl UpdateProfileUseCase {
    pub fn new(idp: Arc<dyn IdentityProvider>, users: Arc<dyn UserRepository>) -> Self {
        Self { idp, users }
    }

    pub async fn execute(
        &self,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> AppResult<UserResponse> {
        let mut user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {}", user_id)))?;

        if let Some(first_name) = request.first_name {
            user.first_name = Some(first_name);
        }
        if let Some(last_name) = request.last_name {
            user.last_name = Some(last_name);
        }
        if let Some(metadata) = request.metadata {
            user.metadata = metadata;
        }
        user.updated_at = chrono::Utc::now();

        self.idp
            .update_profile(
                &user.external_subject_id,
                user.first_name.as_deref(),
                user.last_name.as_deref(),
            )
            .await?;

        let user = self.users.update(user).await?;
        Ok(user.into())
    }
}

pub struct DeleteAccountUseCase {
    idp: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenService>,
}

impl DeleteAccountUseCase {
    pub fn new(
        idp: Arc<dyn IdentityProvider>,
        users: Arc<dyn UserRepository>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self { idp, users, tokens }
    }

    /// Soft-delete locally, delete at the IdP, then revoke everything.
    pub async fn execute(&self, user_id: Uuid) -> AppResult<()> {
        let mut user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {}", user_id)))?;

        user.mark_deleted();
        let user = self.users.update(user).await?;

        self.idp.delete_user(&user.external_subject_id).await?;
        self.tokens.revoke_all(user.id).await
    }
}
