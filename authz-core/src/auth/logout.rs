use shared::{AppResult, RequestContext};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::session::TokenService;

pub struct LogoutUseCase {
    tokens: Arc<TokenService>,
}

impl LogoutUseCase {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    /// Revoke the presented access token and its refresh partner.
    pub async fn execute(&self, ctx: &RequestContext) -> AppResult<()> {
        let remaining = (ctx.token_expires_at - chrono::Utc::now())
            .num_seconds()
            .max(1) as u64;
        self.tokens
            .revoke_session(ctx.user_id, &ctx.token_id, Duration::from_secs(remaining))
            .await
    }
}

pub struct LogoutAllUseCase {
    tokens: Arc<TokenService>,
}

impl LogoutAllUseCase {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    pub async fn execute(&self, user_id: Uuid) -> AppResult<()> {
        self.tokens.revoke_all(user_id).await
    }
}
