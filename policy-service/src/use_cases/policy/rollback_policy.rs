use authz_core::authorization::PermissionChecker;
use shared::domain::entities::PolicyVersion;
use shared::domain::repositories::PolicyRepository;
use shared::{AppError, AppResult};
use std::sync::Arc;
use uuid::Uuid;

use crate::dto::{PolicyResponse, RollbackPolicyRequest};

use super::load_in_tenant;

/// Roll a policy back to an earlier snapshot. The rollback itself is a new
/// version: the current content is archived, the snapshot's content becomes
/// the working copy, and the caller must re-validate and re-publish.
pub struct RollbackPolicyUseCase {
    policies: Arc<dyn PolicyRepository>,
    checker: Arc<PermissionChecker>,
}

impl RollbackPolicyUseCase {
    pub fn new(policies: Arc<dyn PolicyRepository>, checker: Arc<PermissionChecker>) -> Self {
        Self { policies, checker }
    }

    pub async fn execute(
        &self,
        tenant_id: Uuid,
        policy_id: Uuid,
        request: RollbackPolicyRequest,
        rolled_back_by: Uuid,
    ) -> AppResult<PolicyResponse> {
        let mut policy = load_in_tenant(self.policies.as_ref(), tenant_id, policy_id).await?;

        if request.version >= policy.version {
            return Err(AppError::Validation(format!(
                "cannot roll back to version {} from version {}",
                request.version, policy.version
            )));
        }
        if policy.is_system {
            // System policies keep their seed content reachable: the oldest
            // recorded snapshot is the floor.
            let seed_version = self
                .policies
                .list_versions(policy.id)
                .await?
                .into_iter()
                .map(|v| v.version)
                .min()
                .unwrap_or(1);
            if request.version < seed_version {
                return Err(AppError::Forbidden(format!(
                    "system policy cannot be rolled back below version {}",
                    seed_version
                )));
            }
        }

        let target = self
            .policies
            .find_version(policy.id, request.version)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "version {} of policy {}",
                    request.version, policy_id
                ))
            })?;

        let change_note = format!("rollback {}->{}", policy.version, request.version);
        let snapshot = PolicyVersion::snapshot(&policy, Some(change_note), Some(rolled_back_by));
        policy.replace_content(target.content);

        let policy = self.policies.update_with_version(policy, snapshot).await?;
        self.checker.invalidate_tenant(tenant_id).await?;
        Ok(policy.into())
    }
}
