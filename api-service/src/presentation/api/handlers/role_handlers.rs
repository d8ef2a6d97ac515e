use admin_service::dto::{
    CreatePermissionRequest, CreateRoleRequest, SyncRolePermissionsRequest, UpdateRoleRequest,
};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use shared::RequestContext;
use std::sync::Arc;
use uuid::Uuid;

use crate::app_state::AppState;

use super::user_handlers::Pagination;
use super::{failure, success};

pub async fn list_roles(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state.manage_role_use_case.list(context.tenant_id).await {
        Ok(roles) => success(StatusCode::OK, roles),
        Err(e) => {
            e.log_with_operation(location, "list_roles");
            failure(&e)
        }
    }
}

pub async fn create_role(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
    Json(request): Json<CreateRoleRequest>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state
        .manage_role_use_case
        .create(context.tenant_id, request)
        .await
    {
        Ok(role) => success(StatusCode::CREATED, role),
        Err(e) => {
            e.log_with_operation(location, "create_role");
            failure(&e)
        }
    }
}

pub async fn update_role(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
    Path(role_id): Path<Uuid>,
    Json(request): Json<UpdateRoleRequest>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state
        .manage_role_use_case
        .update(context.tenant_id, role_id, request)
        .await
    {
        Ok(role) => success(StatusCode::OK, role),
        Err(e) => {
            e.log_with_operation(location, "update_role");
            failure(&e)
        }
    }
}

pub async fn delete_role(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
    Path(role_id): Path<Uuid>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state
        .manage_role_use_case
        .delete(context.tenant_id, role_id)
        .await
    {
        Ok(()) => success(StatusCode::OK, serde_json::json!({"message": "role deleted"})),
        Err(e) => {
            e.log_with_operation(location, "delete_role");
            failure(&e)
        }
    }
}

/// Reconcile the role's permission set against the submitted list.
pub async fn sync_role_permissions(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
    Path(role_id): Path<Uuid>,
    Json(request): Json<SyncRolePermissionsRequest>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state
        .sync_role_permissions_use_case
        .execute(role_id, &request.permission_ids, context.user_id)
        .await
    {
        Ok(()) => success(
            StatusCode::OK,
            serde_json::json!({"message": "permissions synchronised"}),
        ),
        Err(e) => {
            e.log_with_operation(location, "sync_role_permissions");
            failure(&e)
        }
    }
}

pub async fn list_permissions(
    State(state): State<Arc<AppState>>,
    Query(page): Query<Pagination>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state
        .manage_permission_use_case
        .list(page.limit, page.offset)
        .await
    {
        Ok(permissions) => success(StatusCode::OK, permissions),
        Err(e) => {
            e.log_with_operation(location, "list_permissions");
            failure(&e)
        }
    }
}

pub async fn create_permission(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreatePermissionRequest>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state.manage_permission_use_case.create(request).await {
        Ok(permission) => success(StatusCode::CREATED, permission),
        Err(e) => {
            e.log_with_operation(location, "create_permission");
            failure(&e)
        }
    }
}

pub async fn delete_permission(
    State(state): State<Arc<AppState>>,
    Path(permission_id): Path<Uuid>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state
        .manage_permission_use_case
        .delete(permission_id)
        .await
    {
        Ok(()) => success(
            StatusCode::OK,
            serde_json::json!({"message": "permission deleted"}),
        ),
        Err(e) => {
            e.log_with_operation(location, "delete_permission");
            failure(&e)
        }
    }
}
