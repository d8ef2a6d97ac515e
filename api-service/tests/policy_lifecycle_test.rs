//! Policy lifecycle and bundle management through the router: versioning,
//! validation, publish gate, rollback, test execution, bundle activation.

mod test_helpers;

use axum::http::StatusCode;
use serde_json::json;
use test_helpers::{test_backend, TestBackend};

async fn admin_token(backend: &TestBackend) -> String {
    let (_, _, user_id) = backend.register_user("admin@x.test", "S3cret123!").await;
    backend.make_super_admin(user_id).await;
    let login = backend.login("admin@x.test", "S3cret123!").await;
    login["accessToken"].as_str().unwrap().to_string()
}

async fn create_policy(backend: &TestBackend, token: &str, name: &str) -> serde_json::Value {
    let (status, body) = backend
        .send(
            "POST",
            "/v1/policies",
            Some(token),
            Some(json!({
                "name": name,
                "type": "rego",
                "content": format!("package {}\n\ndefault allow = false\n", name),
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["data"].clone()
}

#[tokio::test]
async fn policy_lifecycle_from_draft_to_rollback() {
    let backend = test_backend().await;
    let token = admin_token(&backend).await;

    // Create: draft, version 1, not yet valid.
    let policy = create_policy(&backend, &token, "example").await;
    let policy_id = policy["id"].as_str().unwrap().to_string();
    assert_eq!(policy["status"], "draft");
    assert_eq!(policy["version"], 1);
    assert_eq!(policy["isValid"], false);

    // Publish before validation is refused.
    let (status, body) = backend
        .send(
            "POST",
            &format!("/v1/policies/{}/publish", policy_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "POLICY_VALIDATION_FAILED");

    // Validate, then publish.
    let (status, body) = backend
        .send(
            "POST",
            &format!("/v1/policies/{}/validate", policy_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isValid"], true);

    let (status, body) = backend
        .send(
            "POST",
            &format!("/v1/policies/{}/publish", policy_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "active");
    assert!(body["data"]["publishedAt"].is_string());

    // A content change bumps the version and resets validity.
    let v1_content = "package example\n\ndefault allow = false\n";
    let v2_content = "package example\n\ndefault allow = true\n";
    let (status, body) = backend
        .send(
            "PUT",
            &format!("/v1/policies/{}", policy_id),
            Some(&token),
            Some(json!({"content": v2_content, "changeNote": "open up"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["version"], 2);
    assert_eq!(body["data"]["isValid"], false);

    // Rollback to v1 mints version 3 with v1's content, still unvalidated.
    let (status, body) = backend
        .send(
            "POST",
            &format!("/v1/policies/{}/rollback", policy_id),
            Some(&token),
            Some(json!({"version": 1})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["version"], 3);
    assert_eq!(body["data"]["content"], v1_content);
    assert_eq!(body["data"]["isValid"], false);

    // Snapshots exist for versions 1 and 2; the monotonic counter never
    // went backwards.
    let (status, body) = backend
        .send(
            "GET",
            &format!("/v1/policies/{}/versions", policy_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let versions: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["version"].as_i64().unwrap())
        .collect();
    assert_eq!(versions, vec![2, 1]);

    // Rolling back to a version that is not older is refused.
    let (status, _) = backend
        .send(
            "POST",
            &format!("/v1/policies/{}/rollback", policy_id),
            Some(&token),
            Some(json!({"version": 3})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn validation_captures_engine_diagnostics() {
    let backend = test_backend().await;
    let token = admin_token(&backend).await;

    let (status, body) = backend
        .send(
            "POST",
            "/v1/policies",
            Some(&token),
            Some(json!({
                "name": "broken",
                "type": "rego",
                "content": "package broken\n%%% not rego\n",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let policy_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = backend
        .send(
            "POST",
            &format!("/v1/policies/{}/validate", policy_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isValid"], false);
    let error = body["data"]["validationError"].as_str().unwrap();
    assert!(error.contains("rego_parse_error"));
    assert!(error.contains("row 1"));
}

#[tokio::test]
async fn test_execution_compares_structurally() {
    let backend = test_backend().await;
    let token = admin_token(&backend).await;

    let (status, body) = backend
        .send(
            "POST",
            "/v1/policies",
            Some(&token),
            Some(json!({
                "name": "tested",
                "type": "rego",
                "content": "package tested\n\ndefault allow = false\n",
                "testCases": [
                    {
                        "name": "denies a stranger",
                        "input": {
                            "user": {"id": "u1", "tenantId": "t1", "roles": [], "permissions": [], "email": "s@x.test", "metadata": {}},
                            "resource": {"type": "tenant", "tenantId": "t2"},
                            "action": "read",
                        },
                        "expected": {"allow": false, "reasons": ["tenant mismatch"], "errors": []},
                    },
                    {
                        "name": "wrong expectation fails",
                        "input": {
                            "user": {"id": "u1", "tenantId": "t1", "roles": [], "permissions": [], "email": "s@x.test", "metadata": {}},
                            "resource": {"type": "tenant", "tenantId": "t2"},
                            "action": "read",
                        },
                        "expected": {"allow": true},
                    },
                ],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let policy_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = backend
        .send(
            "POST",
            &format!("/v1/policies/{}/test", policy_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let run = &body["data"];
    assert_eq!(run["passed"], false);
    let results = run["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["passed"], true);
    // The second case expects a key set the engine does not return.
    assert_eq!(results[1]["passed"], false);

    // The scratch module is removed after the run.
    let modules = backend.engine.modules.lock().unwrap();
    assert!(modules.keys().all(|id| !id.starts_with("heimdall_tmp_")));
}

#[tokio::test]
async fn bundle_activation_swaps_the_environment_slot() {
    let backend = test_backend().await;
    let token = admin_token(&backend).await;

    // Two published policies to bundle.
    let mut policy_ids = Vec::new();
    for name in ["alpha", "beta"] {
        let policy = create_policy(&backend, &token, name).await;
        let id = policy["id"].as_str().unwrap().to_string();
        backend
            .send(
                "POST",
                &format!("/v1/policies/{}/validate", id),
                Some(&token),
                None,
            )
            .await;
        let (status, _) = backend
            .send(
                "POST",
                &format!("/v1/policies/{}/publish", id),
                Some(&token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        policy_ids.push(id);
    }

    let provision_mfa = backend.idp.provision("ops@x.test", "S3cret123!", true);
    assert!(!provision_mfa.is_empty());
    let login = backend.login("ops@x.test", "S3cret123!").await;
    let ops_user = uuid::Uuid::parse_str(login["user"]["id"].as_str().unwrap()).unwrap();
    backend.make_super_admin(ops_user).await;
    let login = backend.login("ops@x.test", "S3cret123!").await;
    let ops_token = login["accessToken"].as_str().unwrap().to_string();

    // Build two bundles over the same policies.
    let mut bundle_ids = Vec::new();
    for name in ["b1", "b2"] {
        let (status, body) = backend
            .send(
                "POST",
                "/v1/bundles",
                Some(&ops_token),
                Some(json!({"name": name, "policyIds": policy_ids})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        assert_eq!(body["data"]["status"], "ready");
        assert!(body["data"]["objectKey"].as_str().unwrap().ends_with(".tar.gz"));
        bundle_ids.push(body["data"]["id"].as_str().unwrap().to_string());
    }

    // Activate the first into production.
    let (status, body) = backend
        .send(
            "POST",
            &format!("/v1/bundles/{}/activate", bundle_ids[0]),
            Some(&ops_token),
            Some(json!({"environment": "production"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["status"], "active");

    // Deleting an active bundle is refused.
    let (status, body) = backend
        .send(
            "DELETE",
            &format!("/v1/bundles/{}", bundle_ids[0]),
            Some(&ops_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "BUNDLE_ACTIVE_CANNOT_DELETE");

    // Activating the second demotes the first; the slot never holds two.
    let (status, body) = backend
        .send(
            "POST",
            &format!("/v1/bundles/{}/activate", bundle_ids[1]),
            Some(&ops_token),
            Some(json!({"environment": "production"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["status"], "active");

    let (_, body) = backend
        .send(
            "GET",
            &format!("/v1/bundles/{}", bundle_ids[0]),
            Some(&ops_token),
            None,
        )
        .await;
    assert_eq!(body["data"]["status"], "archived");

    // Deployment records the act.
    let (status, body) = backend
        .send(
            "POST",
            &format!("/v1/bundles/{}/deploy", bundle_ids[1]),
            Some(&ops_token),
            Some(json!({"environment": "production"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["outcome"], "succeeded");

    let (_, body) = backend
        .send(
            "GET",
            &format!("/v1/bundles/{}/deployments", bundle_ids[1]),
            Some(&ops_token),
            None,
        )
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn bundles_refuse_unpublished_policies() {
    let backend = test_backend().await;
    let token = admin_token(&backend).await;
    let policy = create_policy(&backend, &token, "draft-only").await;

    let provision = backend.idp.provision("ops2@x.test", "S3cret123!", true);
    assert!(!provision.is_empty());
    let login = backend.login("ops2@x.test", "S3cret123!").await;
    let ops_user = uuid::Uuid::parse_str(login["user"]["id"].as_str().unwrap()).unwrap();
    backend.make_super_admin(ops_user).await;
    let login = backend.login("ops2@x.test", "S3cret123!").await;
    let ops_token = login["accessToken"].as_str().unwrap().to_string();

    let (status, body) = backend
        .send(
            "POST",
            "/v1/bundles",
            Some(&ops_token),
            Some(json!({"name": "b", "policyIds": [policy["id"]]})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("not active"),
        "{}",
        body
    );
}
