/// Insert a new tenant
pub const TENANT_INSERT: &str = r#"
    INSERT INTO tenants (
        id, name, slug, status, max_users, max_roles, settings,
        created_at, updated_at, deleted_at
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
    RETURNING id, name, slug, status, max_users, max_roles, settings,
              created_at, updated_at, deleted_at
"#;

/// Find tenant by ID (soft-deleted rows excluded)
pub const TENANT_FIND_BY_ID: &str = r#"
    SELECT id, name, slug, status, max_users, max_roles, settings,
           created_at, updated_at, deleted_at
    FROM tenants
    WHERE id = $1 AND deleted_at IS NULL
"#;

/// Find tenant by slug
pub const TENANT_FIND_BY_SLUG: &str = r#"
    SELECT id, name, slug, status, max_users, max_roles, settings,
           created_at, updated_at, deleted_at
    FROM tenants
    WHERE slug = $1 AND deleted_at IS NULL
"#;

/// List tenants, newest first
pub const TENANT_LIST: &str = r#"
    SELECT id, name, slug, status, max_users, max_roles, settings,
           created_at, updated_at, deleted_at
    FROM tenants
    WHERE deleted_at IS NULL
    ORDER BY created_at DESC
    LIMIT $1 OFFSET $2
"#;

/// Update a tenant (also used to write the soft-delete marker)
pub const TENANT_UPDATE: &str = r#"
    UPDATE tenants
    SET name = $2, slug = $3, status = $4, max_users = $5, max_roles = $6,
        settings = $7, updated_at = $8, deleted_at = $9
    WHERE id = $1
    RETURNING id, name, slug, status, max_users, max_roles, settings,
              created_at, updated_at, deleted_at
"#;
