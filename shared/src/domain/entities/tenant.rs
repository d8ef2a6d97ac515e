use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use uuid::Uuid;

/// Lowercase hyphenated slug: segments of [a-z0-9] joined by single hyphens.
static SLUG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    Active,
    Suspended,
    Deleted,
}

impl TenantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantStatus::Active => "active",
            TenantStatus::Suspended => "suspended",
            TenantStatus::Deleted => "deleted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(TenantStatus::Active),
            "suspended" => Some(TenantStatus::Suspended),
            "deleted" => Some(TenantStatus::Deleted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub status: TenantStatus,
    pub max_users: i64,
    pub max_roles: i64,
    pub settings: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Tenant {
    pub fn new(name: String, slug: String, max_users: i64, max_roles: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            slug,
            status: TenantStatus::Active,
            max_users,
            max_roles,
            settings: serde_json::json!({}),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_valid_slug(slug: &str) -> bool {
        !slug.is_empty() && slug.len() <= 64 && SLUG_PATTERN.is_match(slug)
    }

    pub fn is_active(&self) -> bool {
        self.status == TenantStatus::Active && self.deleted_at.is_none()
    }

    pub fn suspend(&mut self) {
        self.status = TenantStatus::Suspended;
        self.updated_at = Utc::now();
    }

    pub fn activate(&mut self) {
        self.status = TenantStatus::Active;
        self.updated_at = Utc::now();
    }

    pub fn mark_deleted(&mut self) {
        self.status = TenantStatus::Deleted;
        self.deleted_at = Some(Utc::now());
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_pattern_accepts_lowercase_hyphenated() {
        assert!(Tenant::is_valid_slug("acme"));
        assert!(Tenant::is_valid_slug("acme-corp-2"));
        assert!(!Tenant::is_valid_slug("Acme"));
        assert!(!Tenant::is_valid_slug("acme_corp"));
        assert!(!Tenant::is_valid_slug("-acme"));
        assert!(!Tenant::is_valid_slug("acme-"));
        assert!(!Tenant::is_valid_slug("acme--corp"));
        assert!(!Tenant::is_valid_slug(""));
    }

    #[test]
    fn suspend_and_delete_clear_active() {
        let mut tenant = Tenant::new("Acme".to_string(), "acme".to_string(), 100, 50);
        assert!(tenant.is_active());
        tenant.suspend();
        assert!(!tenant.is_active());
        tenant.activate();
        assert!(tenant.is_active());
        tenant.mark_deleted();
        assert!(!tenant.is_active());
        assert!(tenant.deleted_at.is_some());
    }
}
