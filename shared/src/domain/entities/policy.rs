use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyType {
    Rego,
    Json,
    Wasm,
}

impl PolicyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyType::Rego => "rego",
            PolicyType::Json => "json",
            PolicyType::Wasm => "wasm",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "rego" => Some(PolicyType::Rego),
            "json" => Some(PolicyType::Json),
            "wasm" => Some(PolicyType::Wasm),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyStatus {
    Draft,
    Active,
    Archived,
}

impl PolicyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyStatus::Draft => "draft",
            PolicyStatus::Active => "active",
            PolicyStatus::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(PolicyStatus::Draft),
            "active" => Some(PolicyStatus::Active),
            "archived" => Some(PolicyStatus::Archived),
            _ => None,
        }
    }
}

/// A stored test case evaluated against the engine during `test`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyTestCase {
    pub name: String,
    pub input: serde_json::Value,
    pub expected: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Dotted namespace the engine serves this module under.
    pub path: String,
    pub policy_type: PolicyType,
    pub content: String,
    pub status: PolicyStatus,
    /// Monotonic; never decremented, not even on rollback.
    pub version: i32,
    pub is_valid: bool,
    pub validated_at: Option<DateTime<Utc>>,
    pub validation_error: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub published_by: Option<Uuid>,
    pub tags: Vec<String>,
    pub metadata: serde_json::Value,
    pub test_cases: Vec<PolicyTestCase>,
    /// System policies are undeletable and cannot be rolled back below
    /// their seed version.
    pub is_system: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Policy {
    pub fn new(
        tenant_id: Uuid,
        name: String,
        description: Option<String>,
        policy_type: PolicyType,
        content: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            path: format!("policies/{}", name),
            name,
            description,
            policy_type,
            content,
            status: PolicyStatus::Draft,
            version: 1,
            is_valid: false,
            validated_at: None,
            validation_error: None,
            published_at: None,
            published_by: None,
            tags: Vec::new(),
            metadata: serde_json::json!({}),
            test_cases: Vec::new(),
            is_system: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Replace content, bumping the version and resetting validation state.
    /// The caller is responsible for archiving the previous content as a
    /// `PolicyVersion` first.
    pub fn replace_content(&mut self, content: String) {
        self.content = content;
        self.version += 1;
        self.is_valid = false;
        self.validated_at = None;
        self.validation_error = None;
        self.updated_at = Utc::now();
    }

    pub fn mark_valid(&mut self) {
        self.is_valid = true;
        self.validated_at = Some(Utc::now());
        self.validation_error = None;
        self.updated_at = Utc::now();
    }

    pub fn mark_invalid(&mut self, error: String) {
        self.is_valid = false;
        self.validated_at = None;
        self.validation_error = Some(error);
        self.updated_at = Utc::now();
    }

    pub fn publish(&mut self, published_by: Uuid) {
        self.status = PolicyStatus::Active;
        self.published_at = Some(Utc::now());
        self.published_by = Some(published_by);
        self.updated_at = Utc::now();
    }
}

/// Immutable snapshot of a policy's content at a given version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyVersion {
    pub id: Uuid,
    pub policy_id: Uuid,
    pub version: i32,
    pub content: String,
    pub change_note: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl PolicyVersion {
    pub fn snapshot(policy: &Policy, change_note: Option<String>, created_by: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            policy_id: policy.id,
            version: policy.version,
            content: policy.content.clone(),
            change_note,
            created_by,
            created_at: Utc::now(),
        }
    }
}
