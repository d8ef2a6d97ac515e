use authz_core::authorization::PermissionChecker;
use shared::domain::repositories::PolicyRepository;
use shared::infrastructure::engine::PolicyEngine;
use shared::{AppError, AppResult};
use std::sync::Arc;
use uuid::Uuid;

use crate::dto::PolicyResponse;

use super::load_in_tenant;

/// Publish a validated policy: push the module to the engine under its real
/// path, mark it active, then drop the tenant's cached decisions. The cache
/// invalidation must be observed after the publish, never before.
pub struct PublishPolicyUseCase {
    policies: Arc<dyn PolicyRepository>,
    engine: Arc<dyn PolicyEngine>,
    checker: Arc<PermissionChecker>,
}

impl PublishPolicyUseCase {
    pub fn new(
        policies: Arc<dyn PolicyRepository>,
        engine: Arc<dyn PolicyEngine>,
        checker: Arc<PermissionChecker>,
    ) -> Self {
        Self {
            policies,
            engine,
            checker,
        }
    }

    pub async fn execute(
        &self,
        tenant_id: Uuid,
        policy_id: Uuid,
        published_by: Uuid,
    ) -> AppResult<PolicyResponse> {
        let mut policy = load_in_tenant(self.policies.as_ref(), tenant_id, policy_id).await?;
        if !policy.is_valid {
            return Err(AppError::PolicyValidationFailed(
                "policy must be validated before publish".to_string(),
            ));
        }

        match self.engine.put_policy(&policy.path, &policy.content).await? {
            Ok(()) => {}
            Err(rejection) => {
                // Validated content the engine now refuses means the module
                // changed underneath us or the engine did.
                policy.mark_invalid(rejection.to_string());
                let policy = self.policies.update(policy).await?;
                return Err(AppError::PolicyValidationFailed(
                    policy
                        .validation_error
                        .unwrap_or_else(|| "module rejected".to_string()),
                ));
            }
        }

        policy.publish(published_by);
        let policy = self.policies.update(policy).await?;
        self.checker.invalidate_tenant(tenant_id).await?;
        Ok(policy.into())
    }
}
