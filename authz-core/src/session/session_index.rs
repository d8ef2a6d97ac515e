use shared::infrastructure::cache::{keys, CacheStore};
use shared::AppResult;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::oidc::Claims;

/// Value written for a revoked `jti`.
const TOMBSTONE: &str = "revoked";

/// Cache-backed index of live sessions and revocation tombstones.
///
/// Layout: `session:<user>:<access jti>` holds the partner refresh `jti`,
/// `refresh:<user>:<refresh jti>` holds the partner access `jti`, and
/// `blacklist:<jti>` marks a token revoked until its natural expiry.
pub struct SessionIndex {
    cache: Arc<dyn CacheStore>,
}

impl SessionIndex {
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self { cache }
    }

    /// Index a freshly issued pair. Each entry lives exactly as long as its
    /// token.
    pub async fn register_pair(&self, access: &Claims, refresh: &Claims) -> AppResult<()> {
        let user_id = parse_user(access);
        let now = chrono::Utc::now().timestamp();
        self.cache
            .set(
                &keys::session_key(user_id, &access.jti),
                &refresh.jti,
                Duration::from_secs(access.remaining_secs(now)),
            )
            .await?;
        self.cache
            .set(
                &keys::refresh_key(user_id, &refresh.jti),
                &access.jti,
                Duration::from_secs(refresh.remaining_secs(now)),
            )
            .await?;
        Ok(())
    }

    /// Whether a tombstone exists for the `jti`. Errors propagate so the
    /// caller can fail closed.
    pub async fn is_revoked(&self, jti: &str) -> AppResult<bool> {
        Ok(self.cache.get(&keys::blacklist_key(jti)).await?.is_some())
    }

    pub async fn revoke(&self, jti: &str, ttl: Duration) -> AppResult<()> {
        self.cache
            .set(&keys::blacklist_key(jti), TOMBSTONE, ttl)
            .await
    }

    /// Single-use mark for refresh rotation: the first caller wins, every
    /// replay loses. The tombstone doubles as the mark, so a replayed token
    /// is already revoked.
    pub async fn consume_refresh(&self, refresh: &Claims) -> AppResult<bool> {
        let now = chrono::Utc::now().timestamp();
        let won = self
            .cache
            .set_nx(
                &keys::blacklist_key(&refresh.jti),
                TOMBSTONE,
                Duration::from_secs(refresh.remaining_secs(now)),
            )
            .await?;
        if won {
            let user_id = parse_user(refresh);
            self.cache
                .delete(&keys::refresh_key(user_id, &refresh.jti))
                .await?;
        }
        Ok(won)
    }

    /// The refresh `jti` issued alongside this access token, if the session
    /// is still indexed.
    pub async fn refresh_partner(&self, user_id: Uuid, access_jti: &str) -> AppResult<Option<String>> {
        self.cache.get(&keys::session_key(user_id, access_jti)).await
    }

    pub async fn drop_session(
        &self,
        user_id: Uuid,
        access_jti: &str,
        refresh_jti: Option<&str>,
    ) -> AppResult<()> {
        self.cache
            .delete(&keys::session_key(user_id, access_jti))
            .await?;
        if let Some(refresh_jti) = refresh_jti {
            self.cache
                .delete(&keys::refresh_key(user_id, refresh_jti))
                .await?;
        }
        Ok(())
    }

    /// Tombstone every live session and refresh token of a user. The TTL
    /// must cover the longest lifetime any of them could still have.
    pub async fn revoke_all(&self, user_id: Uuid, ttl: Duration) -> AppResult<()> {
        for pattern in [keys::session_pattern(user_id), keys::refresh_pattern(user_id)] {
            for key in self.cache.keys(&pattern).await? {
                if let Some(jti) = keys::jti_from_key(&key) {
                    self.cache
                        .set(&keys::blacklist_key(jti), TOMBSTONE, ttl)
                        .await?;
                }
                self.cache.delete(&key).await?;
            }
        }
        Ok(())
    }
}

fn parse_user(claims: &Claims) -> Uuid {
    Uuid::parse_str(&claims.user_id).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oidc::TokenType;
    use shared::infrastructure::cache::MemoryCache;

    fn claims(user_id: Uuid, token_type: TokenType) -> Claims {
        let now = chrono::Utc::now().timestamp();
        Claims {
            iss: "test".to_string(),
            sub: user_id.to_string(),
            iat: now,
            nbf: now,
            exp: now + 900,
            jti: Uuid::new_v4().to_string(),
            token_type,
            user_id: user_id.to_string(),
            tenant_id: Uuid::new_v4().to_string(),
            email: "a@x.test".to_string(),
            roles: None,
            mfa_verified: false,
        }
    }

    #[tokio::test]
    async fn consume_refresh_is_single_use() {
        let index = SessionIndex::new(Arc::new(MemoryCache::new()));
        let user = Uuid::new_v4();
        let refresh = claims(user, TokenType::Refresh);

        assert!(index.consume_refresh(&refresh).await.unwrap());
        assert!(!index.consume_refresh(&refresh).await.unwrap());
        assert!(index.is_revoked(&refresh.jti).await.unwrap());
    }

    #[tokio::test]
    async fn revoke_all_tombstones_every_indexed_token() {
        let index = SessionIndex::new(Arc::new(MemoryCache::new()));
        let user = Uuid::new_v4();
        let access = claims(user, TokenType::Access);
        let refresh = claims(user, TokenType::Refresh);
        index.register_pair(&access, &refresh).await.unwrap();

        index
            .revoke_all(user, Duration::from_secs(3600))
            .await
            .unwrap();
        assert!(index.is_revoked(&access.jti).await.unwrap());
        assert!(index.is_revoked(&refresh.jti).await.unwrap());
        assert!(index.refresh_partner(user, &access.jti).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn partner_lookup_links_the_pair() {
        let index = SessionIndex::new(Arc::new(MemoryCache::new()));
        let user = Uuid::new_v4();
        let access = claims(user, TokenType::Access);
        let refresh = claims(user, TokenType::Refresh);
        index.register_pair(&access, &refresh).await.unwrap();

        assert_eq!(
            index.refresh_partner(user, &access.jti).await.unwrap(),
            Some(refresh.jti.clone())
        );
    }
}
