/// Insert a new bundle
pub const BUNDLE_INSERT: &str = r#"
    INSERT INTO bundles (
        id, tenant_id, name, policy_ids, object_key, status, environment,
        created_by, created_at, updated_at
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
    RETURNING id, tenant_id, name, policy_ids, object_key, status, environment,
              created_by, created_at, updated_at
"#;

/// Find bundle by ID
pub const BUNDLE_FIND_BY_ID: &str = r#"
    SELECT id, tenant_id, name, policy_ids, object_key, status, environment,
           created_by, created_at, updated_at
    FROM bundles
    WHERE id = $1
"#;

/// List bundles for a tenant (NULL tenant lists the global slot)
pub const BUNDLE_LIST_BY_TENANT: &str = r#"
    SELECT id, tenant_id, name, policy_ids, object_key, status, environment,
           created_by, created_at, updated_at
    FROM bundles
    WHERE tenant_id IS NOT DISTINCT FROM $1
    ORDER BY created_at DESC
"#;

/// Update a bundle
pub const BUNDLE_UPDATE: &str = r#"
    UPDATE bundles
    SET name = $2, policy_ids = $3, object_key = $4, status = $5,
        environment = $6, updated_at = $7
    WHERE id = $1
    RETURNING id, tenant_id, name, policy_ids, object_key, status, environment,
              created_by, created_at, updated_at
"#;

/// Delete a bundle
pub const BUNDLE_DELETE: &str = r#"
    DELETE FROM bundles WHERE id = $1
"#;

/// The active bundle in a (tenant, environment) slot
pub const BUNDLE_FIND_ACTIVE: &str = r#"
    SELECT id, tenant_id, name, policy_ids, object_key, status, environment,
           created_by, created_at, updated_at
    FROM bundles
    WHERE tenant_id IS NOT DISTINCT FROM $1
      AND environment = $2
      AND status = 'active'
"#;

/// Record a deployment
pub const DEPLOYMENT_INSERT: &str = r#"
    INSERT INTO deployments (
        id, bundle_id, environment, deployed_by, deployed_at, outcome
    )
    VALUES ($1, $2, $3, $4, $5, $6)
    RETURNING id, bundle_id, environment, deployed_by, deployed_at, outcome
"#;

/// Deployments of a bundle, newest first
pub const DEPLOYMENT_LIST: &str = r#"
    SELECT id, bundle_id, environment, deployed_by, deployed_at, outcome
    FROM deployments
    WHERE bundle_id = $1
    ORDER BY deployed_at DESC
"#;
