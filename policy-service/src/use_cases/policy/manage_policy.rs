use shared::domain::entities::{Policy, PolicyStatus, PolicyVersion};
use shared::domain::repositories::PolicyRepository;
use shared::infrastructure::engine::PolicyEngine;
use shared::{AppError, AppResult};
use std::sync::Arc;
use uuid::Uuid;

use crate::dto::{
    CreatePolicyRequest, PolicyResponse, PolicyVersionResponse, UpdatePolicyRequest,
};

use super::load_in_tenant;

/// Policy CRUD with versioning. Every content change archives the previous
/// content as a snapshot and bumps the monotonic version.
pub struct ManagePolicyUseCase {
    policies: Arc<dyn PolicyRepository>,
    engine: Arc<dyn PolicyEngine>,
}

impl ManagePolicyUseCase {
    pub fn new(policies: Arc<dyn PolicyRepository>, engine: Arc<dyn PolicyEngine>) -> Self {
        Self { policies, engine }
    }

    pub async fn create(
        &self,
        tenant_id: Uuid,
        request: CreatePolicyRequest,
    ) -> AppResult<PolicyResponse> {
        if request.name.trim().is_empty() {
            return Err(AppError::Validation("policy name must not be empty".to_string()));
        }
        if request.content.trim().is_empty() {
            return Err(AppError::Validation("policy content must not be empty".to_string()));
        }
        if self
            .policies
            .find_by_name(tenant_id, &request.name)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "policy {} already exists",
                request.name
            )));
        }

        let mut policy = Policy::new(
            tenant_id,
            request.name,
            request.description,
            request.policy_type,
            request.content,
        );
        if let Some(tags) = request.tags {
            policy.tags = tags;
        }
        if let Some(metadata) = request.metadata {
            policy.metadata = metadata;
        }
        if let Some(test_cases) = request.test_cases {
            policy.test_cases = test_cases;
        }

        let policy = self.policies.create(policy).await?;
        Ok(policy.into())
    }

    pub async fn update(
        &self,
        tenant_id: Uuid,
        policy_id: Uuid,
        request: UpdatePolicyRequest,
        updated_by: Uuid,
    ) -> AppResult<PolicyResponse> {
        let mut policy = load_in_tenant(self.policies.as_ref(), tenant_id, policy_id).await?;

        if let Some(description) = request.description {
            policy.description = Some(description);
        }
        if let Some(tags) = request.tags {
            policy.tags = tags;
        }
        if let Some(metadata) = request.metadata {
            policy.metadata = metadata;
        }
        if let Some(test_cases) = request.test_cases {
            policy.test_cases = test_cases;
        }

        let policy = match request.content {
            Some(content) if content != policy.content => {
                // Archive what is being overwritten, then bump.
                let snapshot = PolicyVersion::snapshot(
                    &policy,
                    request.change_note,
                    Some(updated_by),
                );
                policy.replace_content(content);
                self.policies.update_with_version(policy, snapshot).await?
            }
            _ => {
                policy.updated_at = chrono::Utc::now();
                self.policies.update(policy).await?
            }
        };
        Ok(policy.into())
    }

    pub async fn delete(&self, tenant_id: Uuid, policy_id: Uuid) -> AppResult<()> {
        let mut policy = load_in_tenant(self.policies.as_ref(), tenant_id, policy_id).await?;
        if policy.is_system {
            return Err(AppError::Forbidden(
                "system policies cannot be deleted".to_string(),
            ));
        }
        let was_active = policy.status == PolicyStatus::Active;
        policy.status = PolicyStatus::Archived;
        policy.deleted_at = Some(chrono::Utc::now());
        policy.updated_at = chrono::Utc::now();
        let policy = self.policies.update(policy).await?;

        if was_active {
            // Stop the engine from serving a module whose record is gone.
            self.engine.delete_policy(&policy.path).await?;
        }
        Ok(())
    }

    pub async fn get(&self, tenant_id: Uuid, policy_id: Uuid) -> AppResult<PolicyResponse> {
        let policy = load_in_tenant(self.policies.as_ref(), tenant_id, policy_id).await?;
        Ok(policy.into())
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<PolicyResponse>> {
        let policies = self.policies.list_by_tenant(tenant_id, limit, offset).await?;
        Ok(policies.into_iter().map(Into::into).collect())
    }

    pub async fn versions(
        &self,
        tenant_id: Uuid,
        policy_id: Uuid,
    ) -> AppResult<Vec<PolicyVersionResponse>> {
        load_in_tenant(self.policies.as_ref(), tenant_id, policy_id).await?;
        let versions = self.policies.list_versions(policy_id).await?;
        Ok(versions.into_iter().map(Into::into).collect())
    }
}
