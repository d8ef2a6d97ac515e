use authz_core::authorization::CheckRequest;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use shared::domain::entities::AuditEntry;
use shared::{AppError, RequestContext};
use std::sync::Arc;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::presentation::api::handlers::failure;

/// Declares how a route is gated. Attached per route as an extension layer;
/// the enforcement middleware below reads it, assembles the decision input
/// and asks the engine. Resource type and action are fixed here, at the
/// route, never by the caller.
#[derive(Debug, Clone, Copy)]
pub struct Gate {
    pub resource: &'static str,
    /// The URL collection segment the resource id follows.
    pub collection: &'static str,
    pub action: &'static str,
    pub require_mfa: bool,
    pub require_ownership: bool,
    pub use_cache: bool,
}

impl Gate {
    pub const fn permission(
        resource: &'static str,
        collection: &'static str,
        action: &'static str,
    ) -> Self {
        Self {
            resource,
            collection,
            action,
            require_mfa: false,
            require_ownership: false,
            use_cache: true,
        }
    }

    /// MFA-gated writes also bypass the decision cache.
    pub const fn mfa(self) -> Self {
        Self {
            require_mfa: true,
            use_cache: false,
            ..self
        }
    }

    pub const fn ownership(self) -> Self {
        Self {
            require_ownership: true,
            ..self
        }
    }
}

/// Enforce the route's `Gate`. Routes without one are authenticated-only.
pub async fn decision_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let Some(gate) = request.extensions().get::<Gate>().copied() else {
        return Ok(next.run(request).await);
    };
    let ctx = request
        .extensions()
        .get::<RequestContext>()
        .cloned()
        .ok_or_else(|| failure(&AppError::Unauthorized("not authenticated".to_string())))?;

    let path = request.uri().path().to_string();
    let resource_id = resource_id_from_path(&path, gate.collection);

    let mut check = CheckRequest::new(gate.resource, gate.action);
    check.method = request.method().to_string();
    check.path = path;
    check.require_mfa = gate.require_mfa;
    check.require_ownership = gate.require_ownership;
    check.use_cache = gate.use_cache;
    check.resource_id = resource_id.clone();

    // Resource coordinates are pinned server-side. A user record is owned
    // by the user it describes; a tenant record carries its own id as the
    // tenant scope; everything else is scoped to the caller's tenant.
    let resource_uuid = resource_id.as_deref().and_then(|id| Uuid::parse_str(id).ok());
    match gate.resource {
        "user" => {
            check.resource_owner_id = resource_uuid;
            check.resource_tenant_id = Some(ctx.tenant_id);
        }
        "tenant" => {
            check.resource_tenant_id = resource_uuid;
        }
        _ => {
            check.resource_tenant_id = Some(ctx.tenant_id);
        }
    }

    let decision = state
        .checker
        .check(&ctx, check)
        .await
        .map_err(|e| failure(&e))?;

    state.audit.record(
        AuditEntry::new("authz.decision", gate.resource)
            .with_tenant(ctx.tenant_id)
            .with_user(ctx.user_id)
            .with_resource_id(resource_id.unwrap_or_default())
            .with_outcome(if decision.allow { "allow" } else { "deny" })
            .with_client(ctx.ip_address.clone(), ctx.user_agent.clone())
            .with_extras(serde_json::json!({
                "action": gate.action,
                "reasons": decision.reasons,
            })),
    );

    if !decision.allow {
        let reason = decision
            .reasons
            .first()
            .cloned()
            .unwrap_or_else(|| "denied by policy".to_string());
        return Err(failure(&AppError::Forbidden(reason)));
    }
    Ok(next.run(request).await)
}

fn resource_id_from_path(path: &str, collection: &str) -> Option<String> {
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    while let Some(segment) = segments.next() {
        if segment == collection {
            return segments.next().map(str::to_string);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_follows_its_collection_segment() {
        assert_eq!(
            resource_id_from_path("/v1/tenants/abc", "tenants").as_deref(),
            Some("abc")
        );
        assert_eq!(
            resource_id_from_path("/v1/users/u1/roles/r1", "roles").as_deref(),
            Some("r1")
        );
        assert_eq!(resource_id_from_path("/v1/tenants", "tenants"), None);
        assert_eq!(resource_id_from_path("/v1/policies/p1", "tenants"), None);
    }
}
