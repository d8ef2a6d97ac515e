pub mod manage_policy;
pub mod publish_policy;
pub mod rollback_policy;
pub mod test_policy;
pub mod validate_policy;

pub use manage_policy::ManagePolicyUseCase;
pub use publish_policy::PublishPolicyUseCase;
pub use rollback_policy::RollbackPolicyUseCase;
pub use test_policy::TestPolicyUseCase;
pub use validate_policy::ValidatePolicyUseCase;

use shared::domain::entities::Policy;
use shared::domain::repositories::PolicyRepository;
use shared::{AppError, AppResult};
use uuid::Uuid;

/// Load a policy and hide rows from other tenants as missing.
pub(crate) async fn load_in_tenant(
    policies: &dyn PolicyRepository,
    tenant_id: Uuid,
    policy_id: Uuid,
) -> AppResult<Policy> {
    let policy = policies
        .find_by_id(policy_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("policy {}", policy_id)))?;
    if policy.tenant_id != tenant_id {
        return Err(AppError::NotFound(format!("policy {}", policy_id)));
    }
    Ok(policy)
}

/// Engine module id for a scratch upload during validate/test.
pub(crate) fn scratch_module_id(policy_id: Uuid) -> String {
    format!("heimdall_tmp_{}", policy_id.simple())
}
