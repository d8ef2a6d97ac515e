use admin_service::dto::AssignRoleRequest;
use authz_core::authorization::CheckRequest;
use authz_core::dto::{UpdateProfileRequest, UserResponse};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use shared::RequestContext;
use std::sync::Arc;
use uuid::Uuid;

use crate::app_state::AppState;

use super::{failure, success};

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

pub async fn me(State(state): State<Arc<AppState>>, context: RequestContext) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state.user_info_use_case.profile(context.user_id).await {
        Ok(profile) => success(StatusCode::OK, profile),
        Err(e) => {
            e.log_with_operation(location, "me");
            failure(&e)
        }
    }
}

pub async fn update_me(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
    Json(request): Json<UpdateProfileRequest>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state
        .update_profile_use_case
        .execute(context.user_id, request)
        .await
    {
        Ok(profile) => success(StatusCode::OK, profile),
        Err(e) => {
            e.log_with_operation(location, "update_me");
            failure(&e)
        }
    }
}

pub async fn delete_me(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state.delete_account_use_case.execute(context.user_id).await {
        Ok(()) => success(
            StatusCode::OK,
            serde_json::json!({"message": "account deleted"}),
        ),
        Err(e) => {
            e.log_with_operation(location, "delete_me");
            failure(&e)
        }
    }
}

pub async fn me_permissions(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state
        .user_info_use_case
        .effective_permissions(context.user_id)
        .await
    {
        Ok(permissions) => success(StatusCode::OK, permissions),
        Err(e) => {
            e.log_with_operation(location, "me_permissions");
            failure(&e)
        }
    }
}

/// Tenant-scoped user listing. The engine's batch check filters out rows a
/// partial-allow policy withholds from this caller.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
    Query(page): Query<Pagination>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    let users = match state
        .users
        .list_by_tenant(context.tenant_id, page.limit, page.offset)
        .await
    {
        Ok(users) => users,
        Err(e) => {
            e.log_with_operation(location, "list_users");
            return failure(&e);
        }
    };

    let ids: Vec<String> = users.iter().map(|u| u.id.to_string()).collect();
    let mut check = CheckRequest::new("user", "read");
    check.resource_tenant_id = Some(context.tenant_id);
    let allowed = match state.checker.filter_allowed(&context, check, &ids).await {
        Ok(allowed) => allowed,
        Err(e) => {
            e.log_with_operation(location, "list_users");
            return failure(&e);
        }
    };

    let visible: Vec<UserResponse> = users
        .into_iter()
        .zip(allowed)
        .filter_map(|(user, (_, allow))| allow.then(|| user.into()))
        .collect();
    success(StatusCode::OK, visible)
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
    Path(user_id): Path<Uuid>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state.users.find_by_id(user_id).await {
        // Rows from another tenant are invisible, not forbidden.
        Ok(Some(user)) if user.tenant_id == context.tenant_id => {
            success(StatusCode::OK, UserResponse::from(user))
        }
        Ok(_) => failure(&shared::AppError::NotFound(format!("user {}", user_id))),
        Err(e) => {
            e.log_with_operation(location, "get_user");
            failure(&e)
        }
    }
}

pub async fn assign_role(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
    Path(user_id): Path<Uuid>,
    Json(request): Json<AssignRoleRequest>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state
        .assign_role_use_case
        .assign(user_id, request, context.user_id)
        .await
    {
        Ok(()) => success(StatusCode::OK, serde_json::json!({"message": "role assigned"})),
        Err(e) => {
            e.log_with_operation(location, "assign_role");
            failure(&e)
        }
    }
}

pub async fn revoke_role(
    State(state): State<Arc<AppState>>,
    _context: RequestContext,
    Path((user_id, role_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state.assign_role_use_case.revoke(user_id, role_id).await {
        Ok(()) => success(StatusCode::OK, serde_json::json!({"message": "role revoked"})),
        Err(e) => {
            e.log_with_operation(location, "revoke_role");
            failure(&e)
        }
    }
}
