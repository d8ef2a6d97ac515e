use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use policy_service::dto::{ActivateBundleRequest, CreateBundleRequest, DeployBundleRequest};
use shared::domain::entities::AuditEntry;
use shared::RequestContext;
use std::sync::Arc;
use uuid::Uuid;

use crate::app_state::AppState;

use super::{failure, success};

pub async fn list_bundles(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state.manage_bundle_use_case.list(context.tenant_id).await {
        Ok(bundles) => success(StatusCode::OK, bundles),
        Err(e) => {
            e.log_with_operation(location, "list_bundles");
            failure(&e)
        }
    }
}

pub async fn create_bundle(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
    Json(request): Json<CreateBundleRequest>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state
        .build_bundle_use_case
        .execute(context.tenant_id, request, context.user_id)
        .await
    {
        Ok(bundle) => success(StatusCode::CREATED, bundle),
        Err(e) => {
            e.log_with_operation(location, "create_bundle");
            failure(&e)
        }
    }
}

pub async fn get_bundle(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
    Path(bundle_id): Path<Uuid>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state
        .manage_bundle_use_case
        .get(context.tenant_id, bundle_id)
        .await
    {
        Ok(bundle) => success(StatusCode::OK, bundle),
        Err(e) => {
            e.log_with_operation(location, "get_bundle");
            failure(&e)
        }
    }
}

pub async fn delete_bundle(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
    Path(bundle_id): Path<Uuid>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state
        .manage_bundle_use_case
        .delete(context.tenant_id, bundle_id)
        .await
    {
        Ok(()) => success(StatusCode::OK, serde_json::json!({"message": "bundle deleted"})),
        Err(e) => {
            e.log_with_operation(location, "delete_bundle");
            failure(&e)
        }
    }
}

pub async fn activate_bundle(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
    Path(bundle_id): Path<Uuid>,
    Json(request): Json<ActivateBundleRequest>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state
        .activate_bundle_use_case
        .execute(context.tenant_id, bundle_id, request.environment)
        .await
    {
        Ok(bundle) => {
            state.audit.record(
                AuditEntry::new("bundle.activate", "bundle")
                    .with_tenant(context.tenant_id)
                    .with_user(context.user_id)
                    .with_resource_id(bundle_id.to_string())
                    .with_outcome("success")
                    .with_extras(serde_json::json!({
                        "environment": request.environment.as_str(),
                    })),
            );
            success(StatusCode::OK, bundle)
        }
        Err(e) => {
            e.log_with_operation(location, "activate_bundle");
            failure(&e)
        }
    }
}

pub async fn deploy_bundle(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
    Path(bundle_id): Path<Uuid>,
    Json(request): Json<DeployBundleRequest>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state
        .deploy_bundle_use_case
        .execute(
            context.tenant_id,
            bundle_id,
            request.environment,
            context.user_id,
        )
        .await
    {
        Ok(deployment) => success(StatusCode::CREATED, deployment),
        Err(e) => {
            e.log_with_operation(location, "deploy_bundle");
            failure(&e)
        }
    }
}

pub async fn list_deployments(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
    Path(bundle_id): Path<Uuid>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state
        .manage_bundle_use_case
        .deployments(context.tenant_id, bundle_id)
        .await
    {
        Ok(deployments) => success(StatusCode::OK, deployments),
        Err(e) => {
            e.log_with_operation(location, "list_deployments");
            failure(&e)
        }
    }
}
