/// Insert a new user
pub const USER_INSERT: &str = r#"
    INSERT INTO users (
        id, tenant_id, email, external_subject_id, first_name, last_name,
        metadata, login_count, last_login_at, created_at, updated_at, deleted_at
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
    RETURNING id, tenant_id, email, external_subject_id, first_name, last_name,
              metadata, login_count, last_login_at, created_at, updated_at, deleted_at
"#;

/// Find user by ID
pub const USER_FIND_BY_ID: &str = r#"
    SELECT id, tenant_id, email, external_subject_id, first_name, last_name,
           metadata, login_count, last_login_at, created_at, updated_at, deleted_at
    FROM users
    WHERE id = $1 AND deleted_at IS NULL
"#;

/// Find user by email
pub const USER_FIND_BY_EMAIL: &str = r#"
    SELECT id, tenant_id, email, external_subject_id, first_name, last_name,
           metadata, login_count, last_login_at, created_at, updated_at, deleted_at
    FROM users
    WHERE email = $1 AND deleted_at IS NULL
"#;

/// Find user by the IdP's subject handle
pub const USER_FIND_BY_EXTERNAL_SUBJECT: &str = r#"
    SELECT id, tenant_id, email, external_subject_id, first_name, last_name,
           metadata, login_count, last_login_at, created_at, updated_at, deleted_at
    FROM users
    WHERE external_subject_id = $1 AND deleted_at IS NULL
"#;

/// List users in a tenant
pub const USER_LIST_BY_TENANT: &str = r#"
    SELECT id, tenant_id, email, external_subject_id, first_name, last_name,
           metadata, login_count, last_login_at, created_at, updated_at, deleted_at
    FROM users
    WHERE tenant_id = $1 AND deleted_at IS NULL
    ORDER BY created_at DESC
    LIMIT $2 OFFSET $3
"#;

/// Update a user (also used to write the soft-delete marker)
pub const USER_UPDATE: &str = r#"
    UPDATE users
    SET email = $2, first_name = $3, last_name = $4, metadata = $5,
        login_count = $6, last_login_at = $7, updated_at = $8, deleted_at = $9
    WHERE id = $1
    RETURNING id, tenant_id, email, external_subject_id, first_name, last_name,
              metadata, login_count, last_login_at, created_at, updated_at, deleted_at
"#;

/// Count live users in a tenant
pub const USER_COUNT_BY_TENANT: &str = r#"
    SELECT COUNT(*) FROM users WHERE tenant_id = $1 AND deleted_at IS NULL
"#;
