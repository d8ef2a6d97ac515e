use authz_core::oidc::TokenType;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use chrono::{DateTime, Utc};
use shared::RequestContext;
use std::sync::Arc;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::presentation::api::handlers::failure;
use shared::AppError;

/// Validate the bearer access token and stash the authenticated context in
/// request extensions. Everything downstream trusts only this context.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| {
            failure(&AppError::Unauthorized(
                "missing bearer token".to_string(),
            ))
        })?;

    let claims = state
        .tokens
        .verify(token, TokenType::Access)
        .await
        .map_err(|e| failure(&e))?;

    let user_id = Uuid::parse_str(&claims.user_id)
        .map_err(|_| failure(&AppError::TokenInvalid("bad subject".to_string())))?;
    let tenant_id = Uuid::parse_str(&claims.tenant_id)
        .map_err(|_| failure(&AppError::TokenInvalid("bad tenant".to_string())))?;

    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let ip_address = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.split(',').next())
        .map(|ip| ip.trim().to_string());
    let user_agent = request
        .headers()
        .get("user-agent")
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);

    let issued_at = timestamp(claims.iat);
    let expires_at = timestamp(claims.exp);

    let mut context = RequestContext::new(
        request_id,
        user_id,
        tenant_id,
        claims.email.clone(),
        claims.roles.clone().unwrap_or_default(),
        claims.jti.clone(),
        issued_at,
        expires_at,
    )
    .with_mfa_verified(claims.mfa_verified);
    if let Some(ip) = ip_address {
        context = context.with_ip_address(ip);
    }
    if let Some(ua) = user_agent {
        context = context.with_user_agent(ua);
    }

    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
}
