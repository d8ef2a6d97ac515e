use authz_core::authorization::PermissionChecker;
use shared::domain::entities::{Bundle, BundleStatus, Deployment, Environment};
use shared::domain::repositories::BundleRepository;
use shared::{AppError, AppResult};
use std::sync::Arc;
use uuid::Uuid;

use crate::dto::{BundleResponse, DeploymentResponse};

/// Activation claims the (tenant, environment) slot: the promoted bundle
/// becomes `active`, the previous occupant is demoted to `archived` in the
/// same transaction, and the tenant's cached decisions are dropped.
pub struct ActivateBundleUseCase {
    bundles: Arc<dyn BundleRepository>,
    checker: Arc<PermissionChecker>,
}

impl ActivateBundleUseCase {
    pub fn new(bundles: Arc<dyn BundleRepository>, checker: Arc<PermissionChecker>) -> Self {
        Self { bundles, checker }
    }

    pub async fn execute(
        &self,
        tenant_id: Uuid,
        bundle_id: Uuid,
        environment: Environment,
    ) -> AppResult<BundleResponse> {
        let mut bundle = load_in_tenant(self.bundles.as_ref(), tenant_id, bundle_id).await?;
        match bundle.status {
            BundleStatus::Ready | BundleStatus::Archived => {}
            BundleStatus::Active => {
                return Err(AppError::Conflict("bundle is already active".to_string()))
            }
            other => {
                return Err(AppError::Validation(format!(
                    "bundle in status {} cannot be activated",
                    other.as_str()
                )))
            }
        }

        let demoted = match self
            .bundles
            .find_active(bundle.tenant_id, environment)
            .await?
        {
            Some(mut previous) if previous.id != bundle.id => {
                previous.archive();
                Some(previous)
            }
            _ => None,
        };

        bundle.activate(environment);
        let bundle = self.bundles.swap_active(bundle, demoted).await?;
        self.checker.invalidate_tenant(tenant_id).await?;
        Ok(bundle.into())
    }
}

/// A deployment records the act without touching bundle content.
pub struct DeployBundleUseCase {
    bundles: Arc<dyn BundleRepository>,
}

impl DeployBundleUseCase {
    pub fn new(bundles: Arc<dyn BundleRepository>) -> Self {
        Self { bundles }
    }

    pub async fn execute(
        &self,
        tenant_id: Uuid,
        bundle_id: Uuid,
        environment: Environment,
        deployed_by: Uuid,
    ) -> AppResult<DeploymentResponse> {
        let bundle = load_in_tenant(self.bundles.as_ref(), tenant_id, bundle_id).await?;
        if bundle.object_key.is_none() {
            return Err(AppError::Validation(
                "bundle has no stored blob to deploy".to_string(),
            ));
        }

        let deployment = self
            .bundles
            .create_deployment(Deployment::new(
                bundle.id,
                environment,
                deployed_by,
                "succeeded".to_string(),
            ))
            .await?;
        Ok(deployment.into())
    }
}

pub(crate) async fn load_in_tenant(
    bundles: &dyn BundleRepository,
    tenant_id: Uuid,
    bundle_id: Uuid,
) -> AppResult<Bundle> {
    let bundle = bundles
        .find_by_id(bundle_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("bundle {}", bundle_id)))?;
    if bundle.tenant_id != Some(tenant_id) {
        return Err(AppError::NotFound(format!("bundle {}", bundle_id)));
    }
    Ok(bundle)
}
