use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Append-only record of an auth event or a policy decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub event_type: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    /// "allow" / "deny" for decision events.
    pub outcome: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub extras: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(event_type: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id: None,
            user_id: None,
            event_type: event_type.into(),
            resource_type: resource_type.into(),
            resource_id: None,
            outcome: None,
            ip_address: None,
            user_agent: None,
            extras: serde_json::json!({}),
            created_at: Utc::now(),
        }
    }

    pub fn with_tenant(mut self, tenant_id: Uuid) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    pub fn with_outcome(mut self, outcome: impl Into<String>) -> Self {
        self.outcome = Some(outcome.into());
        self
    }

    pub fn with_client(mut self, ip: Option<String>, user_agent: Option<String>) -> Self {
        self.ip_address = ip;
        self.user_agent = user_agent;
        self
    }

    pub fn with_extras(mut self, extras: serde_json::Value) -> Self {
        self.extras = extras;
        self
    }
}
