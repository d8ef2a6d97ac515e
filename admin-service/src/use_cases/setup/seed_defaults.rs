use shared::domain::entities::{Permission, Role, RolePermission, Tenant};
use shared::domain::repositories::{PermissionRepository, RoleRepository, TenantRepository};
use shared::{AppError, AppResult};
use std::sync::Arc;
use uuid::Uuid;

const DEFAULT_TENANT_NAME: &str = "Default";
const SUPER_ADMIN_ROLE: &str = "super_admin";

/// Capabilities every installation ships with. The operator capability to
/// create tenants is the important one; the rest exist so fresh policies
/// have names to grant.
const SYSTEM_PERMISSIONS: &[&str] = &[
    "tenants:create:global",
    "tenants:read:global",
    "users:read:tenant",
    "users:manage:tenant",
    "roles:manage:tenant",
    "policies:manage:tenant",
    "bundles:manage:tenant",
];

/// First-run seeding: the default tenant, the `super_admin` system role and
/// the baseline system permissions. Idempotent; safe to run on every boot.
pub struct SeedDefaultsUseCase {
    tenants: Arc<dyn TenantRepository>,
    roles: Arc<dyn RoleRepository>,
    permissions: Arc<dyn PermissionRepository>,
    default_tenant_slug: String,
}

impl SeedDefaultsUseCase {
    pub fn new(
        tenants: Arc<dyn TenantRepository>,
        roles: Arc<dyn RoleRepository>,
        permissions: Arc<dyn PermissionRepository>,
        default_tenant_slug: String,
    ) -> Self {
        Self {
            tenants,
            roles,
            permissions,
            default_tenant_slug,
        }
    }

    pub async fn execute(&self) -> AppResult<()> {
        let tenant = match self.tenants.find_by_slug(&self.default_tenant_slug).await? {
            Some(tenant) => tenant,
            None => {
                tracing::info!("Seeding default tenant {:?}", self.default_tenant_slug);
                self.tenants
                    .create(Tenant::new(
                        DEFAULT_TENANT_NAME.to_string(),
                        self.default_tenant_slug.clone(),
                        10_000,
                        500,
                    ))
                    .await?
            }
        };

        let role = match self.roles.find_by_name(tenant.id, SUPER_ADMIN_ROLE).await? {
            Some(role) => role,
            None => {
                tracing::info!("Seeding {} role", SUPER_ADMIN_ROLE);
                self.roles
                    .create(Role::system(
                        tenant.id,
                        SUPER_ADMIN_ROLE.to_string(),
                        Some("Unrestricted operator role".to_string()),
                    ))
                    .await?
            }
        };

        for name in SYSTEM_PERMISSIONS {
            let permission = match self.permissions.find_by_name(name).await? {
                Some(permission) => permission,
                None => {
                    let permission = Permission::system((*name).to_string()).ok_or_else(|| {
                        AppError::Internal(format!("seed permission {} is malformed", name))
                    })?;
                    self.permissions.create(permission).await?
                }
            };
            self.permissions
                .attach_to_role(RolePermission::new(role.id, permission.id, Uuid::nil()))
                .await?;
        }
        Ok(())
    }
}
