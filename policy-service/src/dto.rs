use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::domain::entities::{
    Bundle, BundleStatus, Deployment, Environment, Policy, PolicyStatus, PolicyTestCase,
    PolicyType, PolicyVersion,
};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePolicyRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub policy_type: PolicyType,
    pub content: String,
    pub tags: Option<Vec<String>>,
    pub metadata: Option<serde_json::Value>,
    pub test_cases: Option<Vec<PolicyTestCase>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePolicyRequest {
    pub description: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub metadata: Option<serde_json::Value>,
    pub test_cases: Option<Vec<PolicyTestCase>>,
    pub change_note: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollbackPolicyRequest {
    pub version: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyResponse {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub path: String,
    #[serde(rename = "type")]
    pub policy_type: PolicyType,
    pub content: String,
    pub status: PolicyStatus,
    pub version: i32,
    pub is_valid: bool,
    pub validated_at: Option<DateTime<Utc>>,
    pub validation_error: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub published_by: Option<Uuid>,
    pub tags: Vec<String>,
    pub metadata: serde_json::Value,
    pub test_cases: Vec<PolicyTestCase>,
    pub is_system: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Policy> for PolicyResponse {
    fn from(policy: Policy) -> Self {
        Self {
            id: policy.id,
            tenant_id: policy.tenant_id,
            name: policy.name,
            description: policy.description,
            path: policy.path,
            policy_type: policy.policy_type,
            content: policy.content,
            status: policy.status,
            version: policy.version,
            is_valid: policy.is_valid,
            validated_at: policy.validated_at,
            validation_error: policy.validation_error,
            published_at: policy.published_at,
            published_by: policy.published_by,
            tags: policy.tags,
            metadata: policy.metadata,
            test_cases: policy.test_cases,
            is_system: policy.is_system,
            created_at: policy.created_at,
            updated_at: policy.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyVersionResponse {
    pub version: i32,
    pub content: String,
    pub change_note: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<PolicyVersion> for PolicyVersionResponse {
    fn from(version: PolicyVersion) -> Self {
        Self {
            version: version.version,
            content: version.content,
            change_note: version.change_note,
            created_by: version.created_by,
            created_at: version.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseResult {
    pub name: String,
    pub passed: bool,
    pub expected: serde_json::Value,
    pub actual: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunResponse {
    pub passed: bool,
    pub results: Vec<TestCaseResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBundleRequest {
    pub name: String,
    pub policy_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateBundleRequest {
    pub environment: Environment,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployBundleRequest {
    pub environment: Environment,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleResponse {
    pub id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub name: String,
    pub policy_ids: Vec<Uuid>,
    pub object_key: Option<String>,
    pub status: BundleStatus,
    pub environment: Option<Environment>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<Bundle> for BundleResponse {
    fn from(bundle: Bundle) -> Self {
        Self {
            id: bundle.id,
            tenant_id: bundle.tenant_id,
            name: bundle.name,
            policy_ids: bundle.policy_ids,
            object_key: bundle.object_key,
            status: bundle.status,
            environment: bundle.environment,
            created_by: bundle.created_by,
            created_at: bundle.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentResponse {
    pub id: Uuid,
    pub bundle_id: Uuid,
    pub environment: Environment,
    pub deployed_by: Uuid,
    pub deployed_at: DateTime<Utc>,
    pub outcome: String,
}

impl From<Deployment> for DeploymentResponse {
    fn from(deployment: Deployment) -> Self {
        Self {
            id: deployment.id,
            bundle_id: deployment.bundle_id,
            environment: deployment.environment,
            deployed_by: deployment.deployed_by,
            deployed_at: deployment.deployed_at,
            outcome: deployment.outcome,
        }
    }
}
