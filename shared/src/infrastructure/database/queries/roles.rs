/// Insert a new role
pub const ROLE_INSERT: &str = r#"
    INSERT INTO roles (
        id, tenant_id, name, description, parent_role_id, is_system,
        created_at, updated_at, deleted_at
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
    RETURNING id, tenant_id, name, description, parent_role_id, is_system,
              created_at, updated_at, deleted_at
"#;

/// Find role by ID
pub const ROLE_FIND_BY_ID: &str = r#"
    SELECT id, tenant_id, name, description, parent_role_id, is_system,
           created_at, updated_at, deleted_at
    FROM roles
    WHERE id = $1 AND deleted_at IS NULL
"#;

/// Find role by name within a tenant
pub const ROLE_FIND_BY_NAME: &str = r#"
    SELECT id, tenant_id, name, description, parent_role_id, is_system,
           created_at, updated_at, deleted_at
    FROM roles
    WHERE tenant_id = $1 AND name = $2 AND deleted_at IS NULL
"#;

/// List roles in a tenant
pub const ROLE_LIST_BY_TENANT: &str = r#"
    SELECT id, tenant_id, name, description, parent_role_id, is_system,
           created_at, updated_at, deleted_at
    FROM roles
    WHERE tenant_id = $1 AND deleted_at IS NULL
    ORDER BY name
"#;

/// Update a role (also used to write the soft-delete marker)
pub const ROLE_UPDATE: &str = r#"
    UPDATE roles
    SET name = $2, description = $3, parent_role_id = $4,
        updated_at = $5, deleted_at = $6
    WHERE id = $1
    RETURNING id, tenant_id, name, description, parent_role_id, is_system,
              created_at, updated_at, deleted_at
"#;

/// Count live roles in a tenant
pub const ROLE_COUNT_BY_TENANT: &str = r#"
    SELECT COUNT(*) FROM roles WHERE tenant_id = $1 AND deleted_at IS NULL
"#;

/// Link a role to a user
pub const USER_ROLE_INSERT: &str = r#"
    INSERT INTO user_roles (user_id, role_id, assigned_by, assigned_at, expires_at)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT (user_id, role_id) DO UPDATE SET
        assigned_by = $3, assigned_at = $4, expires_at = $5
"#;

/// Unlink a role from a user
pub const USER_ROLE_DELETE: &str = r#"
    DELETE FROM user_roles WHERE user_id = $1 AND role_id = $2
"#;

/// Active (non-expired) roles for a user
pub const ROLES_FOR_USER: &str = r#"
    SELECT r.id, r.tenant_id, r.name, r.description, r.parent_role_id, r.is_system,
           r.created_at, r.updated_at, r.deleted_at
    FROM roles r
    INNER JOIN user_roles ur ON ur.role_id = r.id
    WHERE ur.user_id = $1
      AND r.deleted_at IS NULL
      AND (ur.expires_at IS NULL OR ur.expires_at > NOW())
    ORDER BY r.name
"#;
