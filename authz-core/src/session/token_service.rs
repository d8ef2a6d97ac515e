use serde::Serialize;
use shared::domain::entities::User;
use shared::infrastructure::cache::CacheStore;
use shared::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::oidc::{Claims, TokenError, TokenManager, TokenType};

use super::SessionIndex;

/// An issued pair plus the metadata handlers put on the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// The token service: signing via `TokenManager`, liveness via
/// `SessionIndex`. A token only counts as authenticated once both the
/// signature checks out and no tombstone exists.
pub struct TokenService {
    manager: TokenManager,
    index: SessionIndex,
}

impl TokenService {
    pub fn new(manager: TokenManager, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            manager,
            index: SessionIndex::new(cache),
        }
    }

    pub fn jwks(&self) -> serde_json::Value {
        self.manager.jwks()
    }

    /// Issue an access/refresh pair and index both sides atomically enough
    /// for revocation to find them.
    pub async fn issue_pair(
        &self,
        user: &User,
        roles: &[String],
        mfa_verified: bool,
        remember_me: bool,
    ) -> AppResult<TokenPair> {
        let access = self
            .manager
            .sign(user, roles, TokenType::Access, mfa_verified, remember_me)?;
        let refresh = self
            .manager
            .sign(user, roles, TokenType::Refresh, mfa_verified, remember_me)?;
        self.index.register_pair(&access.claims, &refresh.claims).await?;
        Ok(TokenPair {
            access_token: access.token,
            refresh_token: refresh.token,
            token_type: "Bearer".to_string(),
            expires_in: self.manager.access_expiry_secs(),
        })
    }

    /// Full verification: signature, validity window, kind, tombstone.
    /// When the revocation store is unreachable this fails closed.
    pub async fn verify(&self, token: &str, expected: TokenType) -> AppResult<Claims> {
        let claims = self.manager.decode(token, expected)?;
        let revoked = self
            .index
            .is_revoked(&claims.jti)
            .await
            .map_err(|e| {
                tracing::error!("Revocation store unreachable, failing closed: {}", e);
                AppError::from(TokenError::Revoked)
            })?;
        if revoked {
            return Err(TokenError::Revoked.into());
        }
        Ok(claims)
    }

    /// Rotate a refresh token: verify, burn the old `jti`, mint a new pair.
    /// The burn is a compare-and-set, so a replayed token never yields a
    /// second pair even under concurrent use.
    pub async fn rotate(
        &self,
        refresh_token: &str,
        user: &User,
        roles: &[String],
    ) -> AppResult<TokenPair> {
        let claims = self.verify(refresh_token, TokenType::Refresh).await?;
        if claims.user_id != user.id.to_string() {
            return Err(TokenError::WrongType.into());
        }
        if !self.index.consume_refresh(&claims).await? {
            return Err(TokenError::Revoked.into());
        }
        // Preserve the remember-me horizon the original pair was issued with.
        let remember_me =
            claims.exp - claims.iat > self.manager.refresh_expiry_secs(false);
        self.issue_pair(user, roles, claims.mfa_verified, remember_me)
            .await
    }

    /// Peek at refresh claims without consuming anything; the auth flow uses
    /// this to find out whose token it is before loading the user.
    pub async fn inspect_refresh(&self, refresh_token: &str) -> AppResult<Claims> {
        self.verify(refresh_token, TokenType::Refresh).await
    }

    /// Revoke one session: the presented access token and its refresh
    /// partner, each for its remaining lifetime.
    pub async fn revoke_session(
        &self,
        user_id: Uuid,
        access_jti: &str,
        access_remaining: Duration,
    ) -> AppResult<()> {
        self.index.revoke(access_jti, access_remaining).await?;
        let partner = self.index.refresh_partner(user_id, access_jti).await?;
        if let Some(refresh_jti) = &partner {
            // The refresh partner may outlive the access token by weeks.
            let ttl = Duration::from_secs(
                self.manager.refresh_expiry_secs(true).max(1) as u64
            );
            self.index.revoke(refresh_jti, ttl).await?;
        }
        self.index
            .drop_session(user_id, access_jti, partner.as_deref())
            .await
    }

    /// Revoke every live token of a user.
    pub async fn revoke_all(&self, user_id: Uuid) -> AppResult<()> {
        let ttl = Duration::from_secs(self.manager.refresh_expiry_secs(true).max(1) as u64);
        self.index.revoke_all(user_id, ttl).await
    }
}
