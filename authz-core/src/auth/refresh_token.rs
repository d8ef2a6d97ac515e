use shared::domain::repositories::{RoleRepository, UserRepository};
use shared::{AppError, AppResult};
use std::sync::Arc;
use uuid::Uuid;

use crate::dto::{AuthResponse, RefreshTokenRequest};
use crate::oidc::TokenError;
use crate::session::TokenService;

pub struct RefreshTokenUseCase {
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
    tokens: Arc<TokenService>,
}

impl RefreshTokenUseCase {
    pub fn new(
        users: Arc<dyn UserRepository>,
        roles: Arc<dyn RoleRepository>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            users,
            roles,
            tokens,
        }
    }

    /// No IdP round-trip here: the refresh token itself is the credential.
    /// Roles are re-read from the store so a rotation picks up revocations.
    pub async fn execute(&self, request: RefreshTokenRequest) -> AppResult<AuthResponse> {
        let claims = self.tokens.inspect_refresh(&request.refresh_token).await?;
        let user_id = Uuid::parse_str(&claims.user_id)
            .map_err(|_| AppError::from(TokenError::Malformed("bad subject".to_string())))?;
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::from(TokenError::Revoked))?;

        let roles = self.roles.roles_for_user(user.id).await?;
        let role_names: Vec<String> = roles.into_iter().map(|r| r.name).collect();

        let pair = self
            .tokens
            .rotate(&request.refresh_token, &user, &role_names)
            .await?;
        Ok(AuthResponse::new(pair, user))
    }
}
