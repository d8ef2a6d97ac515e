/// Insert a new permission
pub const PERMISSION_INSERT: &str = r#"
    INSERT INTO permissions (
        id, name, resource, action, scope, is_system, created_at, updated_at
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
    RETURNING id, name, resource, action, scope, is_system, created_at, updated_at
"#;

/// Find permission by ID
pub const PERMISSION_FIND_BY_ID: &str = r#"
    SELECT id, name, resource, action, scope, is_system, created_at, updated_at
    FROM permissions
    WHERE id = $1
"#;

/// Find permission by name
pub const PERMISSION_FIND_BY_NAME: &str = r#"
    SELECT id, name, resource, action, scope, is_system, created_at, updated_at
    FROM permissions
    WHERE name = $1
"#;

/// List permissions
pub const PERMISSION_LIST: &str = r#"
    SELECT id, name, resource, action, scope, is_system, created_at, updated_at
    FROM permissions
    ORDER BY name
    LIMIT $1 OFFSET $2
"#;

/// Delete a permission
pub const PERMISSION_DELETE: &str = r#"
    DELETE FROM permissions WHERE id = $1
"#;

/// Link a permission to a role
pub const ROLE_PERMISSION_INSERT: &str = r#"
    INSERT INTO role_permissions (role_id, permission_id, assigned_by, assigned_at)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (role_id, permission_id) DO NOTHING
"#;

/// Unlink a permission from a role
pub const ROLE_PERMISSION_DELETE: &str = r#"
    DELETE FROM role_permissions WHERE role_id = $1 AND permission_id = $2
"#;

/// Permissions attached to a role
pub const PERMISSIONS_FOR_ROLE: &str = r#"
    SELECT p.id, p.name, p.resource, p.action, p.scope, p.is_system,
           p.created_at, p.updated_at
    FROM permissions p
    INNER JOIN role_permissions rp ON rp.permission_id = p.id
    WHERE rp.role_id = $1
    ORDER BY p.name
"#;

/// Distinct permissions granted through a user's active role assignments
pub const PERMISSIONS_FOR_USER: &str = r#"
    SELECT DISTINCT p.id, p.name, p.resource, p.action, p.scope, p.is_system,
           p.created_at, p.updated_at
    FROM permissions p
    INNER JOIN role_permissions rp ON rp.permission_id = p.id
    INNER JOIN user_roles ur ON ur.role_id = rp.role_id
    INNER JOIN roles r ON r.id = ur.role_id
    WHERE ur.user_id = $1
      AND r.deleted_at IS NULL
      AND (ur.expires_at IS NULL OR ur.expires_at > NOW())
    ORDER BY p.name
"#;
