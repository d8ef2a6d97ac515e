use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use policy_service::dto::{CreatePolicyRequest, RollbackPolicyRequest, UpdatePolicyRequest};
use shared::domain::entities::AuditEntry;
use shared::RequestContext;
use std::sync::Arc;
use uuid::Uuid;

use crate::app_state::AppState;

use super::user_handlers::Pagination;
use super::{failure, success};

pub async fn list_policies(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
    Query(page): Query<Pagination>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state
        .manage_policy_use_case
        .list(context.tenant_id, page.limit, page.offset)
        .await
    {
        Ok(policies) => success(StatusCode::OK, policies),
        Err(e) => {
            e.log_with_operation(location, "list_policies");
            failure(&e)
        }
    }
}

pub async fn create_policy(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
    Json(request): Json<CreatePolicyRequest>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state
        .manage_policy_use_case
        .create(context.tenant_id, request)
        .await
    {
        Ok(policy) => success(StatusCode::CREATED, policy),
        Err(e) => {
            e.log_with_operation(location, "create_policy");
            failure(&e)
        }
    }
}

pub async fn get_policy(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
    Path(policy_id): Path<Uuid>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state
        .manage_policy_use_case
        .get(context.tenant_id, policy_id)
        .await
    {
        Ok(policy) => success(StatusCode::OK, policy),
        Err(e) => {
            e.log_with_operation(location, "get_policy");
            failure(&e)
        }
    }
}

pub async fn update_policy(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
    Path(policy_id): Path<Uuid>,
    Json(request): Json<UpdatePolicyRequest>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state
        .manage_policy_use_case
        .update(context.tenant_id, policy_id, request, context.user_id)
        .await
    {
        Ok(policy) => success(StatusCode::OK, policy),
        Err(e) => {
            e.log_with_operation(location, "update_policy");
            failure(&e)
        }
    }
}

pub async fn delete_policy(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
    Path(policy_id): Path<Uuid>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state
        .manage_policy_use_case
        .delete(context.tenant_id, policy_id)
        .await
    {
        Ok(()) => success(StatusCode::OK, serde_json::json!({"message": "policy deleted"})),
        Err(e) => {
            e.log_with_operation(location, "delete_policy");
            failure(&e)
        }
    }
}

pub async fn validate_policy(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
    Path(policy_id): Path<Uuid>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state
        .validate_policy_use_case
        .execute(context.tenant_id, policy_id)
        .await
    {
        Ok(validation) => success(StatusCode::OK, validation),
        Err(e) => {
            e.log_with_operation(location, "validate_policy");
            failure(&e)
        }
    }
}

pub async fn test_policy(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
    Path(policy_id): Path<Uuid>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state
        .test_policy_use_case
        .execute(context.tenant_id, policy_id)
        .await
    {
        Ok(run) => success(StatusCode::OK, run),
        Err(e) => {
            e.log_with_operation(location, "test_policy");
            failure(&e)
        }
    }
}

pub async fn publish_policy(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
    Path(policy_id): Path<Uuid>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state
        .publish_policy_use_case
        .execute(context.tenant_id, policy_id, context.user_id)
        .await
    {
        Ok(policy) => {
            state.audit.record(
                AuditEntry::new("policy.publish", "policy")
                    .with_tenant(context.tenant_id)
                    .with_user(context.user_id)
                    .with_resource_id(policy_id.to_string())
                    .with_outcome("success"),
            );
            success(StatusCode::OK, policy)
        }
        Err(e) => {
            e.log_with_operation(location, "publish_policy");
            failure(&e)
        }
    }
}

pub async fn rollback_policy(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
    Path(policy_id): Path<Uuid>,
    Json(request): Json<RollbackPolicyRequest>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    let target_version = request.version;
    match state
        .rollback_policy_use_case
        .execute(context.tenant_id, policy_id, request, context.user_id)
        .await
    {
        Ok(policy) => {
            state.audit.record(
                AuditEntry::new("policy.rollback", "policy")
                    .with_tenant(context.tenant_id)
                    .with_user(context.user_id)
                    .with_resource_id(policy_id.to_string())
                    .with_outcome("success")
                    .with_extras(serde_json::json!({"targetVersion": target_version})),
            );
            success(StatusCode::OK, policy)
        }
        Err(e) => {
            e.log_with_operation(location, "rollback_policy");
            failure(&e)
        }
    }
}

pub async fn list_policy_versions(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
    Path(policy_id): Path<Uuid>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state
        .manage_policy_use_case
        .versions(context.tenant_id, policy_id)
        .await
    {
        Ok(versions) => success(StatusCode::OK, versions),
        Err(e) => {
            e.log_with_operation(location, "list_policy_versions");
            failure(&e)
        }
    }
}
