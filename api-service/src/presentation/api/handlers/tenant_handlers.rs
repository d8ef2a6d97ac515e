use admin_service::dto::{CreateTenantRequest, UpdateTenantRequest};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use shared::domain::entities::AuditEntry;
use shared::RequestContext;
use std::sync::Arc;
use uuid::Uuid;

use crate::app_state::AppState;

use super::user_handlers::Pagination;
use super::{failure, success};

pub async fn list_tenants(
    State(state): State<Arc<AppState>>,
    Query(page): Query<Pagination>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state.get_tenant_use_case.list(page.limit, page.offset).await {
        Ok(tenants) => success(StatusCode::OK, tenants),
        Err(e) => {
            e.log_with_operation(location, "list_tenants");
            failure(&e)
        }
    }
}

pub async fn create_tenant(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
    Json(request): Json<CreateTenantRequest>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state.create_tenant_use_case.execute(request).await {
        Ok(tenant) => {
            state.audit.record(
                AuditEntry::new("tenant.create", "tenant")
                    .with_tenant(tenant.id)
                    .with_user(context.user_id)
                    .with_resource_id(tenant.id.to_string())
                    .with_outcome("success"),
            );
            success(StatusCode::CREATED, tenant)
        }
        Err(e) => {
            e.log_with_operation(location, "create_tenant");
            failure(&e)
        }
    }
}

pub async fn get_tenant(
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<Uuid>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state.get_tenant_use_case.by_id(tenant_id).await {
        Ok(tenant) => success(StatusCode::OK, tenant),
        Err(e) => {
            e.log_with_operation(location, "get_tenant");
            failure(&e)
        }
    }
}

pub async fn update_tenant(
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<Uuid>,
    Json(request): Json<UpdateTenantRequest>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state
        .update_tenant_use_case
        .execute(tenant_id, request)
        .await
    {
        Ok(tenant) => success(StatusCode::OK, tenant),
        Err(e) => {
            e.log_with_operation(location, "update_tenant");
            failure(&e)
        }
    }
}

pub async fn delete_tenant(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
    Path(tenant_id): Path<Uuid>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state.delete_tenant_use_case.execute(tenant_id).await {
        Ok(()) => {
            state.audit.record(
                AuditEntry::new("tenant.delete", "tenant")
                    .with_tenant(tenant_id)
                    .with_user(context.user_id)
                    .with_resource_id(tenant_id.to_string())
                    .with_outcome("success"),
            );
            success(StatusCode::OK, serde_json::json!({"message": "tenant deleted"}))
        }
        Err(e) => {
            e.log_with_operation(location, "delete_tenant");
            failure(&e)
        }
    }
}

pub async fn suspend_tenant(
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<Uuid>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state.update_tenant_use_case.suspend(tenant_id).await {
        Ok(tenant) => success(StatusCode::OK, tenant),
        Err(e) => {
            e.log_with_operation(location, "suspend_tenant");
            failure(&e)
        }
    }
}

pub async fn activate_tenant(
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<Uuid>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state.update_tenant_use_case.activate(tenant_id).await {
        Ok(tenant) => success(StatusCode::OK, tenant),
        Err(e) => {
            e.log_with_operation(location, "activate_tenant");
            failure(&e)
        }
    }
}

pub async fn tenant_stats(
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<Uuid>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state.get_tenant_use_case.stats(tenant_id).await {
        Ok(stats) => success(StatusCode::OK, stats),
        Err(e) => {
            e.log_with_operation(location, "tenant_stats");
            failure(&e)
        }
    }
}

pub async fn tenant_audit(
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<Uuid>,
    Query(page): Query<Pagination>,
) -> impl IntoResponse {
    let location = concat!(file!(), ":", line!());
    match state.audit_log.recent_for_tenant(tenant_id, page.limit).await {
        Ok(entries) => success(StatusCode::OK, entries),
        Err(e) => {
            e.log_with_operation(location, "tenant_audit");
            failure(&e)
        }
    }
}
