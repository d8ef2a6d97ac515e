use authz_core::dto::{
    ChangePasswordRequest, LoginRequest, RefreshTokenRequest, RegisterRequest,
};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use shared::domain::entities::AuditEntry;
use shared::RequestContext;
use std::sync::Arc;

use crate::app_state::AppState;

use super::{failure, success};

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    let email = request.email.clone();
    match state.register_use_case.execute(request).await {
        Ok(response) => {
            state.audit.record(
                AuditEntry::new("auth.register", "user")
                    .with_tenant(response.user.tenant_id)
                    .with_user(response.user.id)
                    .with_outcome("success"),
            );
            success(StatusCode::CREATED, response)
        }
        Err(e) => {
            e.log_with_operation(location, "register");
            state.audit.record(
                AuditEntry::new("auth.register", "user")
                    .with_outcome("failure")
                    .with_extras(serde_json::json!({"email": email, "code": e.code()})),
            );
            failure(&e)
        }
    }
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    let email = request.email.clone();
    match state.login_use_case.execute(request).await {
        Ok(response) => {
            state.audit.record(
                AuditEntry::new("auth.login", "user")
                    .with_tenant(response.user.tenant_id)
                    .with_user(response.user.id)
                    .with_outcome("success"),
            );
            success(StatusCode::OK, response)
        }
        Err(e) => {
            e.log_with_operation(location, "login");
            state.audit.record(
                AuditEntry::new("auth.login", "user")
                    .with_outcome("failure")
                    .with_extras(serde_json::json!({"email": email, "code": e.code()})),
            );
            failure(&e)
        }
    }
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RefreshTokenRequest>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state.refresh_token_use_case.execute(request).await {
        Ok(response) => success(StatusCode::OK, response),
        Err(e) => {
            e.log_with_operation(location, "refresh");
            failure(&e)
        }
    }
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state.logout_use_case.execute(&context).await {
        Ok(()) => {
            state.audit.record(
                AuditEntry::new("auth.logout", "user")
                    .with_tenant(context.tenant_id)
                    .with_user(context.user_id)
                    .with_outcome("success"),
            );
            success(StatusCode::OK, serde_json::json!({"message": "logged out"}))
        }
        Err(e) => {
            e.log_with_operation(location, "logout");
            failure(&e)
        }
    }
}

pub async fn logout_all(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state.logout_all_use_case.execute(context.user_id).await {
        Ok(()) => {
            state.audit.record(
                AuditEntry::new("auth.logout_all", "user")
                    .with_tenant(context.tenant_id)
                    .with_user(context.user_id)
                    .with_outcome("success"),
            );
            success(
                StatusCode::OK,
                serde_json::json!({"message": "all sessions revoked"}),
            )
        }
        Err(e) => {
            e.log_with_operation(location, "logout_all");
            failure(&e)
        }
    }
}

pub async fn change_password(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
    Json(request): Json<ChangePasswordRequest>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state
        .change_password_use_case
        .execute(context.user_id, request)
        .await
    {
        Ok(()) => {
            state.audit.record(
                AuditEntry::new("auth.change_password", "user")
                    .with_tenant(context.tenant_id)
                    .with_user(context.user_id)
                    .with_outcome("success"),
            );
            success(
                StatusCode::OK,
                serde_json::json!({"message": "password changed"}),
            )
        }
        Err(e) => {
            e.log_with_operation(location, "change_password");
            failure(&e)
        }
    }
}
