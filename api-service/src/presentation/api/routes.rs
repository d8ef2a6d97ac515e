use axum::body::Body;
use axum::http::header::HeaderValue;
use axum::http::Response;
use axum::routing::{delete, get, patch, post, put, MethodRouter};
use axum::{middleware, Extension, Router};
use shared::{ApiResponse, AppError};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

use super::handlers::{
    auth_handlers, bundle_handlers, policy_handlers, role_handlers, system_handlers,
    tenant_handlers, user_handlers,
};
use super::middleware::{auth_middleware, decision_middleware, rate_limit_middleware, Gate};

/// Attach a gate to a method router: the `Gate` extension is inserted
/// first, then the decision middleware enforces it.
fn gated(
    state: &Arc<AppState>,
    gate: Gate,
    methods: MethodRouter<Arc<AppState>>,
) -> MethodRouter<Arc<AppState>> {
    methods
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            decision_middleware,
        ))
        .route_layer(Extension(gate))
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/v1/auth/register", post(auth_handlers::register))
        .route("/v1/auth/login", post(auth_handlers::login))
        .route("/v1/auth/refresh", post(auth_handlers::refresh));

    let tenant_routes = Router::new()
        .route(
            "/v1/tenants",
            gated(
                &state,
                Gate::permission("tenant", "tenants", "list"),
                get(tenant_handlers::list_tenants),
            ),
        )
        .route(
            "/v1/tenants",
            gated(
                &state,
                Gate::permission("tenant", "tenants", "create"),
                post(tenant_handlers::create_tenant),
            ),
        )
        .route(
            "/v1/tenants/{id}",
            gated(
                &state,
                Gate::permission("tenant", "tenants", "read"),
                get(tenant_handlers::get_tenant),
            ),
        )
        .route(
            "/v1/tenants/{id}",
            gated(
                &state,
                Gate::permission("tenant", "tenants", "update"),
                patch(tenant_handlers::update_tenant),
            ),
        )
        .route(
            "/v1/tenants/{id}",
            gated(
                &state,
                Gate::permission("tenant", "tenants", "delete"),
                delete(tenant_handlers::delete_tenant),
            ),
        )
        .route(
            "/v1/tenants/{id}/suspend",
            gated(
                &state,
                Gate::permission("tenant", "tenants", "suspend"),
                post(tenant_handlers::suspend_tenant),
            ),
        )
        .route(
            "/v1/tenants/{id}/activate",
            gated(
                &state,
                Gate::permission("tenant", "tenants", "activate"),
                post(tenant_handlers::activate_tenant),
            ),
        )
        .route(
            "/v1/tenants/{id}/stats",
            gated(
                &state,
                Gate::permission("tenant", "tenants", "read"),
                get(tenant_handlers::tenant_stats),
            ),
        )
        .route(
            "/v1/tenants/{id}/audit",
            gated(
                &state,
                Gate::permission("tenant", "tenants", "read"),
                get(tenant_handlers::tenant_audit),
            ),
        );

    let user_routes = Router::new()
        .route("/v1/users/me", get(user_handlers::me))
        .route("/v1/users/me", patch(user_handlers::update_me))
        .route("/v1/users/me", delete(user_handlers::delete_me))
        .route("/v1/users/me/permissions", get(user_handlers::me_permissions))
        .route(
            "/v1/users",
            gated(
                &state,
                Gate::permission("user", "users", "list"),
                get(user_handlers::list_users),
            ),
        )
        .route(
            "/v1/users/{id}",
            gated(
                &state,
                Gate::permission("user", "users", "read").ownership(),
                get(user_handlers::get_user),
            ),
        )
        .route(
            "/v1/users/{id}/roles",
            gated(
                &state,
                Gate::permission("user", "users", "manage_roles"),
                post(user_handlers::assign_role),
            ),
        )
        .route(
            "/v1/users/{id}/roles/{role_id}",
            gated(
                &state,
                Gate::permission("user", "users", "manage_roles"),
                delete(user_handlers::revoke_role),
            ),
        );

    let role_routes = Router::new()
        .route(
            "/v1/roles",
            gated(
                &state,
                Gate::permission("role", "roles", "list"),
                get(role_handlers::list_roles),
            ),
        )
        .route(
            "/v1/roles",
            gated(
                &state,
                Gate::permission("role", "roles", "manage"),
                post(role_handlers::create_role),
            ),
        )
        .route(
            "/v1/roles/{id}",
            gated(
                &state,
                Gate::permission("role", "roles", "manage"),
                patch(role_handlers::update_role),
            ),
        )
        .route(
            "/v1/roles/{id}",
            gated(
                &state,
                Gate::permission("role", "roles", "manage"),
                delete(role_handlers::delete_role),
            ),
        )
        .route(
            "/v1/roles/{id}/permissions",
            gated(
                &state,
                Gate::permission("role", "roles", "manage"),
                put(role_handlers::sync_role_permissions),
            ),
        )
        .route(
            "/v1/permissions",
            gated(
                &state,
                Gate::permission("permission", "permissions", "list"),
                get(role_handlers::list_permissions),
            ),
        )
        .route(
            "/v1/permissions",
            gated(
                &state,
                Gate::permission("permission", "permissions", "manage"),
                post(role_handlers::create_permission),
            ),
        )
        .route(
            "/v1/permissions/{id}",
            gated(
                &state,
                Gate::permission("permission", "permissions", "manage"),
                delete(role_handlers::delete_permission),
            ),
        );

    let policy_routes = Router::new()
        .route(
            "/v1/policies",
            gated(
                &state,
                Gate::permission("policy", "policies", "list"),
                get(policy_handlers::list_policies),
            ),
        )
        .route(
            "/v1/policies",
            gated(
                &state,
                Gate::permission("policy", "policies", "create"),
                post(policy_handlers::create_policy),
            ),
        )
        .route(
            "/v1/policies/{id}",
            gated(
                &state,
                Gate::permission("policy", "policies", "read"),
                get(policy_handlers::get_policy),
            ),
        )
        .route(
            "/v1/policies/{id}",
            gated(
                &state,
                Gate::permission("policy", "policies", "update"),
                put(policy_handlers::update_policy),
            ),
        )
        .route(
            "/v1/policies/{id}",
            gated(
                &state,
                Gate::permission("policy", "policies", "delete"),
                delete(policy_handlers::delete_policy),
            ),
        )
        .route(
            "/v1/policies/{id}/validate",
            gated(
                &state,
                Gate::permission("policy", "policies", "validate"),
                post(policy_handlers::validate_policy),
            ),
        )
        .route(
            "/v1/policies/{id}/test",
            gated(
                &state,
                Gate::permission("policy", "policies", "test"),
                post(policy_handlers::test_policy),
            ),
        )
        .route(
            "/v1/policies/{id}/publish",
            gated(
                &state,
                Gate::permission("policy", "policies", "publish"),
                post(policy_handlers::publish_policy),
            ),
        )
        .route(
            "/v1/policies/{id}/rollback",
            gated(
                &state,
                Gate::permission("policy", "policies", "rollback"),
                post(policy_handlers::rollback_policy),
            ),
        )
        .route(
            "/v1/policies/{id}/versions",
            gated(
                &state,
                Gate::permission("policy", "policies", "read"),
                get(policy_handlers::list_policy_versions),
            ),
        );

    let bundle_routes = Router::new()
        .route(
            "/v1/bundles",
            gated(
                &state,
                Gate::permission("bundle", "bundles", "list"),
                get(bundle_handlers::list_bundles),
            ),
        )
        .route(
            "/v1/bundles",
            gated(
                &state,
                Gate::permission("bundle", "bundles", "create"),
                post(bundle_handlers::create_bundle),
            ),
        )
        .route(
            "/v1/bundles/{id}",
            gated(
                &state,
                Gate::permission("bundle", "bundles", "read"),
                get(bundle_handlers::get_bundle),
            ),
        )
        .route(
            "/v1/bundles/{id}",
            gated(
                &state,
                Gate::permission("bundle", "bundles", "delete"),
                delete(bundle_handlers::delete_bundle),
            ),
        )
        .route(
            "/v1/bundles/{id}/activate",
            gated(
                &state,
                Gate::permission("bundle", "bundles", "activate").mfa(),
                post(bundle_handlers::activate_bundle),
            ),
        )
        .route(
            "/v1/bundles/{id}/deploy",
            gated(
                &state,
                Gate::permission("bundle", "bundles", "deploy").mfa(),
                post(bundle_handlers::deploy_bundle),
            ),
        )
        .route(
            "/v1/bundles/{id}/deployments",
            gated(
                &state,
                Gate::permission("bundle", "bundles", "read"),
                get(bundle_handlers::list_deployments),
            ),
        );

    let protected = Router::new()
        .route("/v1/auth/logout", post(auth_handlers::logout))
        .route("/v1/auth/logout-all", post(auth_handlers::logout_all))
        .route("/v1/auth/password/change", post(auth_handlers::change_password))
        .merge(tenant_routes)
        .merge(user_routes)
        .merge(role_routes)
        .merge(policy_routes)
        .merge(bundle_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .route("/health", get(system_handlers::health))
        .route("/.well-known/jwks.json", get(system_handlers::jwks))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors_layer(&state))
        .with_state(state)
}

fn cors_layer(state: &Arc<AppState>) -> CorsLayer {
    let origins = &state.settings.server.allowed_origins;
    if origins.iter().any(|origin| origin == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Panics inside a handler surface as INTERNAL_ERROR, never as a dead
/// connection or a crashed process.
fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> Response<Body> {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("panic");
    tracing::error!("Handler panicked: {}", detail);

    let envelope = ApiResponse::<()>::error(&AppError::Internal(
        "unexpected internal failure".to_string(),
    ));
    let body = serde_json::to_string(&envelope).unwrap_or_default();
    Response::builder()
        .status(500)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap_or_default()
}
