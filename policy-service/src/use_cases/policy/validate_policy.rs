use shared::domain::entities::PolicyType;
use shared::domain::repositories::PolicyRepository;
use shared::infrastructure::engine::PolicyEngine;
use shared::{AppError, AppResult};
use std::sync::Arc;
use uuid::Uuid;

use crate::dto::ValidationResponse;

use super::{load_in_tenant, scratch_module_id};

/// Engine-based validation: upload to a scratch namespace, record the
/// verdict, always clean the scratch module up.
pub struct ValidatePolicyUseCase {
    policies: Arc<dyn PolicyRepository>,
    engine: Arc<dyn PolicyEngine>,
}

impl ValidatePolicyUseCase {
    pub fn new(policies: Arc<dyn PolicyRepository>, engine: Arc<dyn PolicyEngine>) -> Self {
        Self { policies, engine }
    }

    pub async fn execute(&self, tenant_id: Uuid, policy_id: Uuid) -> AppResult<ValidationResponse> {
        let mut policy = load_in_tenant(self.policies.as_ref(), tenant_id, policy_id).await?;
        if policy.policy_type != PolicyType::Rego {
            return Err(AppError::Validation(format!(
                "{} policies cannot be validated",
                policy.policy_type.as_str()
            )));
        }

        let module_id = scratch_module_id(policy.id);
        let outcome = self.engine.put_policy(&module_id, &policy.content).await?;

        match outcome {
            Ok(()) => {
                if let Err(e) = self.engine.delete_policy(&module_id).await {
                    tracing::warn!("Failed to clean up scratch module {}: {}", module_id, e);
                }
                policy.mark_valid();
            }
            Err(rejection) => {
                policy.mark_invalid(rejection.to_string());
            }
        }

        let policy = self.policies.update(policy).await?;
        Ok(ValidationResponse {
            is_valid: policy.is_valid,
            validation_error: policy.validation_error,
        })
    }
}
