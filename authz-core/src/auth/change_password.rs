use shared::domain::repositories::UserRepository;
use shared::infrastructure::idp::IdentityProvider;
use shared::{AppError, AppResult};
use std::sync::Arc;
use uuid::Uuid;

use crate::dto::ChangePasswordRequest;
use crate::session::TokenService;

use super::validate::validate_password;

pub struct ChangePasswordUseCase {
    idp: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenService>,
}

impl ChangePasswordUseCase {
    pub fn new(
        idp: Arc<dyn IdentityProvider>,
        users: Arc<dyn UserRepository>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self { idp, users, tokens }
    }

    /// Delegate the change to the IdP, then revoke every live session so
    /// stolen tokens die with the old password.
    pub async fn execute(&self, user_id: Uuid, request: ChangePasswordRequest) -> AppResult<()> {
        validate_password(&request.new_password)?;
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {}", user_id)))?;

        self.idp
            .change_password(
                &user.external_subject_id,
                &request.current_password,
                &request.new_password,
            )
            .await?;

        self.tokens.revoke_all(user.id).await
    }
}
