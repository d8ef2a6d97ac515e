use shared::domain::entities::PolicyType;
use shared::domain::repositories::PolicyRepository;
use shared::infrastructure::engine::PolicyEngine;
use shared::{AppError, AppResult};
use std::sync::Arc;
use uuid::Uuid;

use crate::compare::values_match;
use crate::dto::{TestCaseResult, TestRunResponse};

use super::{load_in_tenant, scratch_module_id};

/// Execute a policy's stored test cases against the engine. The module is
/// uploaded to a scratch namespace for the run and removed afterwards, pass
/// or fail.
pub struct TestPolicyUseCase {
    policies: Arc<dyn PolicyRepository>,
    engine: Arc<dyn PolicyEngine>,
}

impl TestPolicyUseCase {
    pub fn new(policies: Arc<dyn PolicyRepository>, engine: Arc<dyn PolicyEngine>) -> Self {
        Self { policies, engine }
    }

    pub async fn execute(&self, tenant_id: Uuid, policy_id: Uuid) -> AppResult<TestRunResponse> {
        let policy = load_in_tenant(self.policies.as_ref(), tenant_id, policy_id).await?;
        if policy.policy_type != PolicyType::Rego {
            return Err(AppError::Validation(
                "only rego policies can be tested".to_string(),
            ));
        }
        if policy.test_cases.is_empty() {
            return Err(AppError::Validation(
                "policy has no test cases".to_string(),
            ));
        }

        let module_id = scratch_module_id(policy.id);
        match self.engine.put_policy(&module_id, &policy.content).await? {
            Ok(()) => {}
            Err(rejection) => {
                return Err(AppError::PolicyTestFailed(format!(
                    "module rejected: {}",
                    rejection
                )));
            }
        }

        let run = self.run_cases(&policy).await;

        // The scratch module never outlives the run.
        if let Err(e) = self.engine.delete_policy(&module_id).await {
            tracing::warn!("Failed to clean up scratch module {}: {}", module_id, e);
        }

        run
    }

    async fn run_cases(
        &self,
        policy: &shared::domain::entities::Policy,
    ) -> AppResult<TestRunResponse> {
        let mut results = Vec::with_capacity(policy.test_cases.len());
        for case in &policy.test_cases {
            let actual = self.engine.evaluate(&policy.path, &case.input).await?;
            let passed = values_match(&case.expected, &actual);
            results.push(TestCaseResult {
                name: case.name.clone(),
                passed,
                expected: case.expected.clone(),
                actual,
                note: case.note.clone(),
            });
        }
        Ok(TestRunResponse {
            passed: results.iter().all(|r| r.passed),
            results,
        })
    }
}
