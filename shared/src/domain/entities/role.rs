use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// Unique within the tenant.
    pub name: String,
    pub description: Option<String>,
    /// Optional parent; the hierarchy must stay acyclic.
    pub parent_role_id: Option<Uuid>,
    /// System roles are protected from deletion and rename.
    pub is_system: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Role {
    pub fn new(
        tenant_id: Uuid,
        name: String,
        description: Option<String>,
        parent_role_id: Option<Uuid>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            name,
            description,
            parent_role_id,
            is_system: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn system(tenant_id: Uuid, name: String, description: Option<String>) -> Self {
        let mut role = Self::new(tenant_id, name, description, None);
        role.is_system = true;
        role
    }

    pub fn mark_deleted(&mut self) {
        self.deleted_at = Some(Utc::now());
        self.updated_at = Utc::now();
    }
}

/// user <-> role link. An expired assignment no longer grants the role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRole {
    pub user_id: Uuid,
    pub role_id: Uuid,
    pub assigned_by: Uuid,
    pub assigned_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl UserRole {
    pub fn new(user_id: Uuid, role_id: Uuid, assigned_by: Uuid) -> Self {
        Self {
            user_id,
            role_id,
            assigned_by,
            assigned_at: Utc::now(),
            expires_at: None,
        }
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_without_expiry_never_expires() {
        let link = UserRole::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        assert!(!link.is_expired(Utc::now() + chrono::Duration::days(3650)));
    }

    #[test]
    fn assignment_with_past_expiry_is_expired() {
        let link = UserRole::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4())
            .with_expiry(Utc::now() - chrono::Duration::minutes(1));
        assert!(link.is_expired(Utc::now()));
    }
}
