use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleStatus {
    Building,
    Ready,
    Active,
    Archived,
    Failed,
}

impl BundleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BundleStatus::Building => "building",
            BundleStatus::Ready => "ready",
            BundleStatus::Active => "active",
            BundleStatus::Archived => "archived",
            BundleStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "building" => Some(BundleStatus::Building),
            "ready" => Some(BundleStatus::Ready),
            "active" => Some(BundleStatus::Active),
            "archived" => Some(BundleStatus::Archived),
            "failed" => Some(BundleStatus::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "dev" => Some(Environment::Dev),
            "staging" => Some(Environment::Staging),
            "production" => Some(Environment::Production),
            _ => None,
        }
    }
}

/// An immutable blob of published policies. The bundle references policies
/// without owning them; the blob lives in the object store under
/// `object_key`. The environment slot is claimed at activation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bundle {
    pub id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub name: String,
    pub policy_ids: Vec<Uuid>,
    pub object_key: Option<String>,
    pub status: BundleStatus,
    pub environment: Option<Environment>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bundle {
    pub fn new(tenant_id: Option<Uuid>, name: String, policy_ids: Vec<Uuid>, created_by: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            name,
            policy_ids,
            object_key: None,
            status: BundleStatus::Building,
            environment: None,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn mark_ready(&mut self, object_key: String) {
        self.object_key = Some(object_key);
        self.status = BundleStatus::Ready;
        self.updated_at = Utc::now();
    }

    pub fn mark_failed(&mut self) {
        self.status = BundleStatus::Failed;
        self.updated_at = Utc::now();
    }

    pub fn activate(&mut self, environment: Environment) {
        self.status = BundleStatus::Active;
        self.environment = Some(environment);
        self.updated_at = Utc::now();
    }

    pub fn archive(&mut self) {
        self.status = BundleStatus::Archived;
        self.updated_at = Utc::now();
    }

    pub fn storage_key(&self) -> String {
        match self.tenant_id {
            Some(tenant_id) => format!("bundles/{}/{}.tar.gz", tenant_id, self.id),
            None => format!("bundles/{}.tar.gz", self.id),
        }
    }
}

/// Append-only record of a bundle being deployed to an environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deployment {
    pub id: Uuid,
    pub bundle_id: Uuid,
    pub environment: Environment,
    pub deployed_by: Uuid,
    pub deployed_at: DateTime<Utc>,
    pub outcome: String,
}

impl Deployment {
    pub fn new(bundle_id: Uuid, environment: Environment, deployed_by: Uuid, outcome: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            bundle_id,
            environment,
            deployed_by,
            deployed_at: Utc::now(),
            outcome,
        }
    }
}
