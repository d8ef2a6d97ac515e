//! Decision-pipeline enforcement through the router: tenant isolation,
//! self-access, cache coherence after role changes, fail-closed engine
//! outage, MFA gates, rate limiting.

mod test_helpers;

use axum::http::StatusCode;
use serde_json::json;
use shared::domain::entities::Tenant;
use shared::domain::repositories::TenantRepository;
use std::sync::atomic::Ordering;
use test_helpers::test_backend;
use uuid::Uuid;

#[tokio::test]
async fn tenant_isolation_denies_cross_tenant_reads() {
    let backend = test_backend().await;
    let (access, _, _) = backend.register_user("iso@x.test", "S3cret123!").await;

    let other_tenant = backend
        .tenants
        .create(Tenant::new("Other".to_string(), "other".to_string(), 100, 50))
        .await
        .unwrap();

    let (status, body) = backend
        .send(
            "GET",
            &format!("/v1/tenants/{}", other_tenant.id),
            Some(&access),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn super_admin_crosses_tenants() {
    let backend = test_backend().await;
    let (_, _, user_id) = backend.register_user("root@x.test", "S3cret123!").await;
    backend.make_super_admin(user_id).await;
    // Re-login so the access token carries the new role.
    let login = backend.login("root@x.test", "S3cret123!").await;
    let access = login["accessToken"].as_str().unwrap();

    let other_tenant = backend
        .tenants
        .create(Tenant::new("Other".to_string(), "other".to_string(), 100, 50))
        .await
        .unwrap();

    let (status, body) = backend
        .send(
            "GET",
            &format!("/v1/tenants/{}", other_tenant.id),
            Some(access),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["slug"], "other");

    // The decision trail is readable back through the audit endpoint.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let (status, body) = backend
        .send(
            "GET",
            &format!("/v1/tenants/{}/audit", backend.default_tenant.id),
            Some(access),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e["event_type"] == "authz.decision"));
}

#[tokio::test]
async fn self_access_allows_own_record_only() {
    let backend = test_backend().await;
    let (access, _, user_id) = backend.register_user("self@x.test", "S3cret123!").await;
    let (_, _, other_id) = backend.register_user("other@x.test", "S3cret123!").await;

    let (status, body) = backend
        .send("GET", &format!("/v1/users/{}", user_id), Some(&access), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "self@x.test");

    let (status, _) = backend
        .send("GET", &format!("/v1/users/{}", other_id), Some(&access), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Listing is admin-only and this user holds no grant.
    let (status, _) = backend.send("GET", "/v1/users", Some(&access), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn role_grant_takes_effect_immediately() {
    let backend = test_backend().await;
    let (access, _, user_id) = backend.register_user("grant@x.test", "S3cret123!").await;

    let (status, _) = backend.send("GET", "/v1/users", Some(&access), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // An operator builds a role carrying users:list/users:read through the
    // admin surface and assigns it.
    let (_, _, admin_id) = backend.register_user("ops-admin@x.test", "S3cret123!").await;
    backend.make_super_admin(admin_id).await;
    let login = backend.login("ops-admin@x.test", "S3cret123!").await;
    let admin = login["accessToken"].as_str().unwrap().to_string();

    let (status, body) = backend
        .send(
            "POST",
            "/v1/roles",
            Some(&admin),
            Some(json!({"name": "user-admin"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let role_id = body["data"]["id"].as_str().unwrap().to_string();

    let mut permission_ids = Vec::new();
    for name in ["users:list:tenant", "users:read:tenant"] {
        let (status, body) = backend
            .send(
                "POST",
                "/v1/permissions",
                Some(&admin),
                Some(json!({"name": name})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        permission_ids.push(body["data"]["id"].as_str().unwrap().to_string());
    }
    let (status, _) = backend
        .send(
            "PUT",
            &format!("/v1/roles/{}/permissions", role_id),
            Some(&admin),
            Some(json!({"permissionIds": permission_ids})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = backend
        .send(
            "POST",
            &format!("/v1/users/{}/roles", user_id),
            Some(&admin),
            Some(json!({"roleId": role_id})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // No cached deny survives the assignment: the very next request is
    // computed afresh and succeeds.
    let (status, body) = backend.send("GET", "/v1/users", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let listed = body["data"].as_array().unwrap();
    assert!(listed.iter().any(|u| u["email"] == "grant@x.test"));

    // Revocation is just as immediate.
    let (status, _) = backend
        .send(
            "DELETE",
            &format!("/v1/users/{}/roles/{}", user_id, role_id),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = backend.send("GET", "/v1/users", Some(&access), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn engine_outage_fails_closed() {
    let backend = test_backend().await;
    let (_, _, user_id) = backend.register_user("closed@x.test", "S3cret123!").await;
    backend.make_super_admin(user_id).await;
    let login = backend.login("closed@x.test", "S3cret123!").await;
    let access = login["accessToken"].as_str().unwrap();

    // Reachable engine, reachable route.
    let (status, _) = backend.send("GET", "/v1/tenants", Some(access), None).await;
    assert_eq!(status, StatusCode::OK);

    backend.engine.down.store(true, Ordering::SeqCst);
    // The cached allow is for (tenant, list); a different action must be
    // computed fresh and the outage denies it.
    let (status, body) = backend.send("GET", "/v1/policies", Some(access), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["message"].as_str().unwrap().contains("engine unavailable"), true, "{}", body);
}

#[tokio::test]
async fn suspended_tenant_is_a_global_deny() {
    let backend = test_backend().await;
    let (_, _, user_id) = backend.register_user("susp@x.test", "S3cret123!").await;
    backend.make_super_admin(user_id).await;
    let login = backend.login("susp@x.test", "S3cret123!").await;
    let access = login["accessToken"].as_str().unwrap();

    let mut tenant = backend.default_tenant.clone();
    tenant.suspend();
    backend.tenants.update(tenant).await.unwrap();
    backend
        .state
        .checker
        .invalidate_tenant(backend.default_tenant.id)
        .await
        .unwrap();

    let (status, body) = backend.send("GET", "/v1/tenants", Some(access), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(
        body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("tenant not active"),
        "{}",
        body
    );
}

#[tokio::test]
async fn mfa_gate_blocks_bundle_activation_without_verified_factor() {
    let backend = test_backend().await;
    let (_, _, user_id) = backend.register_user("mfa@x.test", "S3cret123!").await;
    backend.make_super_admin(user_id).await;
    let login = backend.login("mfa@x.test", "S3cret123!").await;
    let access = login["accessToken"].as_str().unwrap();

    let (status, body) = backend
        .send(
            "POST",
            &format!("/v1/bundles/{}/activate", Uuid::new_v4()),
            Some(access),
            Some(json!({"environment": "production"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(
        body["error"]["message"].as_str().unwrap().contains("mfa"),
        "{}",
        body
    );
}

#[tokio::test]
async fn decision_outcomes_are_audited() {
    let backend = test_backend().await;
    let (access, _, _) = backend.register_user("audit@x.test", "S3cret123!").await;

    let (status, _) = backend.send("GET", "/v1/users", Some(&access), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The audit writer drains asynchronously.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let entries = backend.audit.entries.lock().unwrap();
    assert!(entries
        .iter()
        .any(|e| e.event_type == "authz.decision" && e.outcome.as_deref() == Some("deny")));
}

#[tokio::test]
async fn unauthenticated_requests_are_rejected() {
    let backend = test_backend().await;
    let (status, _) = backend.send("GET", "/v1/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = backend
        .send("GET", "/v1/users/me", Some("not-a-token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn rate_limit_trips_per_ip_and_route() {
    let mut settings = test_helpers::test_settings();
    settings.server.rate_limit_per_minute = 2;
    let backend = test_helpers::test_backend_with(settings).await;

    for _ in 0..2 {
        let (status, _) = backend
            .send(
                "POST",
                "/v1/auth/login",
                None,
                Some(json!({"email": "rl@x.test", "password": "Wrong1234"})),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let (status, body) = backend
        .send(
            "POST",
            "/v1/auth/login",
            None,
            Some(json!({"email": "rl@x.test", "password": "Wrong1234"})),
        )
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], "RATE_LIMITED");
}

#[tokio::test]
async fn health_is_public() {
    let backend = test_backend().await;
    let (status, body) = backend.send("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
