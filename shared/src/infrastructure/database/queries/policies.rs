/// Insert a new policy
pub const POLICY_INSERT: &str = r#"
    INSERT INTO policies (
        id, tenant_id, name, description, path, policy_type, content, status,
        version, is_valid, validated_at, validation_error, published_at,
        published_by, tags, metadata, test_cases, is_system,
        created_at, updated_at, deleted_at
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
            $15, $16, $17, $18, $19, $20, $21)
    RETURNING id, tenant_id, name, description, path, policy_type, content, status,
              version, is_valid, validated_at, validation_error, published_at,
              published_by, tags, metadata, test_cases, is_system,
              created_at, updated_at, deleted_at
"#;

/// Find policy by ID
pub const POLICY_FIND_BY_ID: &str = r#"
    SELECT id, tenant_id, name, description, path, policy_type, content, status,
           version, is_valid, validated_at, validation_error, published_at,
           published_by, tags, metadata, test_cases, is_system,
           created_at, updated_at, deleted_at
    FROM policies
    WHERE id = $1 AND deleted_at IS NULL
"#;

/// Find policy by name within a tenant
pub const POLICY_FIND_BY_NAME: &str = r#"
    SELECT id, tenant_id, name, description, path, policy_type, content, status,
           version, is_valid, validated_at, validation_error, published_at,
           published_by, tags, metadata, test_cases, is_system,
           created_at, updated_at, deleted_at
    FROM policies
    WHERE tenant_id = $1 AND name = $2 AND deleted_at IS NULL
"#;

/// List policies in a tenant
pub const POLICY_LIST_BY_TENANT: &str = r#"
    SELECT id, tenant_id, name, description, path, policy_type, content, status,
           version, is_valid, validated_at, validation_error, published_at,
           published_by, tags, metadata, test_cases, is_system,
           created_at, updated_at, deleted_at
    FROM policies
    WHERE tenant_id = $1 AND deleted_at IS NULL
    ORDER BY name
    LIMIT $2 OFFSET $3
"#;

/// Update a policy (also used to write the soft-delete marker)
pub const POLICY_UPDATE: &str = r#"
    UPDATE policies
    SET name = $2, description = $3, path = $4, content = $5, status = $6,
        version = $7, is_valid = $8, validated_at = $9, validation_error = $10,
        published_at = $11, published_by = $12, tags = $13, metadata = $14,
        test_cases = $15, updated_at = $16, deleted_at = $17
    WHERE id = $1
    RETURNING id, tenant_id, name, description, path, policy_type, content, status,
              version, is_valid, validated_at, validation_error, published_at,
              published_by, tags, metadata, test_cases, is_system,
              created_at, updated_at, deleted_at
"#;

/// Count live policies in a tenant
pub const POLICY_COUNT_BY_TENANT: &str = r#"
    SELECT COUNT(*) FROM policies WHERE tenant_id = $1 AND deleted_at IS NULL
"#;

/// Insert a content snapshot
pub const POLICY_VERSION_INSERT: &str = r#"
    INSERT INTO policy_versions (
        id, policy_id, version, content, change_note, created_by, created_at
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7)
"#;

/// List snapshots for a policy, newest first
pub const POLICY_VERSION_LIST: &str = r#"
    SELECT id, policy_id, version, content, change_note, created_by, created_at
    FROM policy_versions
    WHERE policy_id = $1
    ORDER BY version DESC
"#;

/// Find a specific snapshot
pub const POLICY_VERSION_FIND: &str = r#"
    SELECT id, policy_id, version, content, change_note, created_by, created_at
    FROM policy_versions
    WHERE policy_id = $1 AND version = $2
"#;
