use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Authenticated request context, built by the auth middleware from verified
/// access-token claims and request metadata. Handlers and the decision
/// pipeline read identity from here, never from the request body.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub email: String,
    pub roles: Vec<String>,
    /// `jti` of the presented access token.
    pub token_id: String,
    pub token_issued_at: DateTime<Utc>,
    pub token_expires_at: DateTime<Utc>,
    pub mfa_verified: bool,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestContext {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        request_id: String,
        user_id: Uuid,
        tenant_id: Uuid,
        email: String,
        roles: Vec<String>,
        token_id: String,
        token_issued_at: DateTime<Utc>,
        token_expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            request_id,
            user_id,
            tenant_id,
            email,
            roles,
            token_id,
            token_issued_at,
            token_expires_at,
            mfa_verified: false,
            ip_address: None,
            user_agent: None,
        }
    }

    pub fn with_mfa_verified(mut self, verified: bool) -> Self {
        self.mfa_verified = verified;
        self
    }

    pub fn with_ip_address(mut self, ip: String) -> Self {
        self.ip_address = Some(ip);
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = Some(user_agent);
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_super_admin(&self) -> bool {
        self.has_role("super_admin")
    }

    /// Seconds since the access token was issued.
    pub fn session_age_secs(&self, now: DateTime<Utc>) -> i64 {
        (now - self.token_issued_at).num_seconds().max(0)
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> RequestContext {
        RequestContext::new(
            "req-1".to_string(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            "a@x.test".to_string(),
            vec!["editor".to_string()],
            Uuid::new_v4().to_string(),
            Utc::now(),
            Utc::now() + chrono::Duration::minutes(15),
        )
    }

    #[test]
    fn role_checks() {
        let ctx = context();
        assert!(ctx.has_role("editor"));
        assert!(!ctx.is_super_admin());
    }

    #[test]
    fn session_age_never_negative() {
        let ctx = context();
        let earlier = ctx.token_issued_at - chrono::Duration::seconds(30);
        assert_eq!(ctx.session_age_secs(earlier), 0);
    }
}
