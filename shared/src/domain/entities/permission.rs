use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use uuid::Uuid;

/// `<resource>:<action>` or `<resource>:<action>:<scope>`.
static PERMISSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z][a-z0-9_]*):([a-z][a-z0-9_]*)(?::(own|tenant|global))?$").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionScope {
    Own,
    Tenant,
    Global,
}

impl PermissionScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionScope::Own => "own",
            PermissionScope::Tenant => "tenant",
            PermissionScope::Global => "global",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "own" => Some(PermissionScope::Own),
            "tenant" => Some(PermissionScope::Tenant),
            "global" => Some(PermissionScope::Global),
            _ => None,
        }
    }
}

/// Globally unique named capability. The resource, action and scope
/// components are stored explicitly for indexing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub id: Uuid,
    pub name: String,
    pub resource: String,
    pub action: String,
    pub scope: PermissionScope,
    pub is_system: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Permission {
    /// Parse and validate a permission name against the grammar.
    /// A missing scope defaults to `tenant`.
    pub fn parse_name(name: &str) -> Option<(String, String, PermissionScope)> {
        let captures = PERMISSION_PATTERN.captures(name)?;
        let resource = captures.get(1)?.as_str().to_string();
        let action = captures.get(2)?.as_str().to_string();
        let scope = captures
            .get(3)
            .map(|m| PermissionScope::parse(m.as_str()))
            .unwrap_or(Some(PermissionScope::Tenant))?;
        Some((resource, action, scope))
    }

    pub fn new(name: String) -> Option<Self> {
        let (resource, action, scope) = Self::parse_name(&name)?;
        let now = Utc::now();
        Some(Self {
            id: Uuid::new_v4(),
            name,
            resource,
            action,
            scope,
            is_system: false,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn system(name: String) -> Option<Self> {
        let mut permission = Self::new(name)?;
        permission.is_system = true;
        Some(permission)
    }
}

/// role <-> permission link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolePermission {
    pub role_id: Uuid,
    pub permission_id: Uuid,
    pub assigned_by: Uuid,
    pub assigned_at: DateTime<Utc>,
}

impl RolePermission {
    pub fn new(role_id: Uuid, permission_id: Uuid, assigned_by: Uuid) -> Self {
        Self {
            role_id,
            permission_id,
            assigned_by,
            assigned_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grammar_accepts_two_and_three_part_names() {
        let (resource, action, scope) = Permission::parse_name("users:read").unwrap();
        assert_eq!(resource, "users");
        assert_eq!(action, "read");
        assert_eq!(scope, PermissionScope::Tenant);

        let (_, _, scope) = Permission::parse_name("users:read:own").unwrap();
        assert_eq!(scope, PermissionScope::Own);

        let (_, _, scope) = Permission::parse_name("tenants:create:global").unwrap();
        assert_eq!(scope, PermissionScope::Global);
    }

    #[test]
    fn grammar_rejects_malformed_names() {
        assert!(Permission::parse_name("users").is_none());
        assert!(Permission::parse_name("users:read:everything").is_none());
        assert!(Permission::parse_name("Users:Read").is_none());
        assert!(Permission::parse_name("users:read:own:extra").is_none());
        assert!(Permission::parse_name(":read").is_none());
    }
}
