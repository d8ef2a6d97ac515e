use admin_service::use_cases::permission::ManagePermissionUseCase;
use admin_service::use_cases::role::{
    AssignRoleUseCase, ManageRoleUseCase, SyncRolePermissionsUseCase,
};
use admin_service::use_cases::tenant::{
    CreateTenantUseCase, DeleteTenantUseCase, GetTenantUseCase, UpdateTenantUseCase,
};
use authz_core::auth::{
    ChangePasswordUseCase, DeleteAccountUseCase, LoginUseCase, LogoutAllUseCase, LogoutUseCase,
    RefreshTokenUseCase, RegisterUseCase, UpdateProfileUseCase, UserInfoUseCase,
};
use authz_core::authorization::PermissionChecker;
use authz_core::session::TokenService;
use policy_service::use_cases::bundle::{
    ActivateBundleUseCase, BuildBundleUseCase, DeployBundleUseCase, ManageBundleUseCase,
};
use policy_service::use_cases::policy::{
    ManagePolicyUseCase, PublishPolicyUseCase, RollbackPolicyUseCase, TestPolicyUseCase,
    ValidatePolicyUseCase,
};
use shared::config::Settings;
use shared::domain::repositories::{
    AuditRepository, BundleRepository, PermissionRepository, PolicyRepository, RoleRepository,
    TenantRepository, UserRepository,
};
use shared::infrastructure::audit::AuditWriter;
use shared::infrastructure::cache::CacheStore;
use shared::infrastructure::engine::PolicyEngine;
use shared::infrastructure::idp::IdentityProvider;
use shared::infrastructure::objectstore::ObjectStore;
use std::sync::Arc;
use std::time::Duration;

/// The store adapters behind the service, bundled so the wiring in `main`
/// and in tests reads the same way.
#[derive(Clone)]
pub struct Repositories {
    pub tenants: Arc<dyn TenantRepository>,
    pub users: Arc<dyn UserRepository>,
    pub roles: Arc<dyn RoleRepository>,
    pub permissions: Arc<dyn PermissionRepository>,
    pub policies: Arc<dyn PolicyRepository>,
    pub bundles: Arc<dyn BundleRepository>,
    pub audit: Arc<dyn AuditRepository>,
}

/// Everything the handlers reach for, initialised once at startup.
pub struct AppState {
    pub settings: Arc<Settings>,
    pub tokens: Arc<TokenService>,
    pub checker: Arc<PermissionChecker>,
    pub cache: Arc<dyn CacheStore>,
    pub audit: AuditWriter,
    pub audit_log: Arc<dyn AuditRepository>,
    pub users: Arc<dyn UserRepository>,

    pub register_use_case: Arc<RegisterUseCase>,
    pub login_use_case: Arc<LoginUseCase>,
    pub refresh_token_use_case: Arc<RefreshTokenUseCase>,
    pub logout_use_case: Arc<LogoutUseCase>,
    pub logout_all_use_case: Arc<LogoutAllUseCase>,
    pub change_password_use_case: Arc<ChangePasswordUseCase>,
    pub user_info_use_case: Arc<UserInfoUseCase>,
    pub update_profile_use_case: Arc<UpdateProfileUseCase>,
    pub delete_account_use_case: Arc<DeleteAccountUseCase>,

    pub create_tenant_use_case: Arc<CreateTenantUseCase>,
    pub update_tenant_use_case: Arc<UpdateTenantUseCase>,
    pub delete_tenant_use_case: Arc<DeleteTenantUseCase>,
    pub get_tenant_use_case: Arc<GetTenantUseCase>,
    pub manage_role_use_case: Arc<ManageRoleUseCase>,
    pub assign_role_use_case: Arc<AssignRoleUseCase>,
    pub sync_role_permissions_use_case: Arc<SyncRolePermissionsUseCase>,
    pub manage_permission_use_case: Arc<ManagePermissionUseCase>,

    pub manage_policy_use_case: Arc<ManagePolicyUseCase>,
    pub validate_policy_use_case: Arc<ValidatePolicyUseCase>,
    pub test_policy_use_case: Arc<TestPolicyUseCase>,
    pub publish_policy_use_case: Arc<PublishPolicyUseCase>,
    pub rollback_policy_use_case: Arc<RollbackPolicyUseCase>,

    pub build_bundle_use_case: Arc<BuildBundleUseCase>,
    pub activate_bundle_use_case: Arc<ActivateBundleUseCase>,
    pub deploy_bundle_use_case: Arc<DeployBundleUseCase>,
    pub manage_bundle_use_case: Arc<ManageBundleUseCase>,
}

impl AppState {
    /// Wire the full dependency graph from settings, adapters and stores.
    pub fn from_parts(
        settings: Arc<Settings>,
        repositories: Repositories,
        tokens: Arc<TokenService>,
        cache: Arc<dyn CacheStore>,
        idp: Arc<dyn IdentityProvider>,
        engine: Arc<dyn PolicyEngine>,
        object_store: Arc<dyn ObjectStore>,
    ) -> Arc<Self> {
        let Repositories {
            tenants,
            users,
            roles,
            permissions,
            policies,
            bundles,
            audit,
        } = repositories;

        let checker = Arc::new(PermissionChecker::new(
            engine.clone(),
            cache.clone(),
            users.clone(),
            roles.clone(),
            permissions.clone(),
            tenants.clone(),
            settings.engine.decision_path.clone(),
            settings.engine.cache_enabled,
            Duration::from_secs(settings.engine.timeout_secs),
            settings.server.ip_denylist.clone(),
        ));
        let audit_log = audit.clone();
        let audit = AuditWriter::spawn(audit);

        let default_tenant_slug = settings.server.default_tenant_slug.clone();

        Arc::new(Self {
            register_use_case: Arc::new(RegisterUseCase::new(
                idp.clone(),
                users.clone(),
                tenants.clone(),
                tokens.clone(),
                default_tenant_slug.clone(),
            )),
            login_use_case: Arc::new(LoginUseCase::new(
                idp.clone(),
                users.clone(),
                roles.clone(),
                tenants.clone(),
                tokens.clone(),
                default_tenant_slug,
            )),
            refresh_token_use_case: Arc::new(RefreshTokenUseCase::new(
                users.clone(),
                roles.clone(),
                tokens.clone(),
            )),
            logout_use_case: Arc::new(LogoutUseCase::new(tokens.clone())),
            logout_all_use_case: Arc::new(LogoutAllUseCase::new(tokens.clone())),
            change_password_use_case: Arc::new(ChangePasswordUseCase::new(
                idp.clone(),
                users.clone(),
                tokens.clone(),
            )),
            user_info_use_case: Arc::new(UserInfoUseCase::new(
                users.clone(),
                roles.clone(),
                permissions.clone(),
            )),
            update_profile_use_case: Arc::new(UpdateProfileUseCase::new(
                idp.clone(),
                users.clone(),
            )),
            delete_account_use_case: Arc::new(DeleteAccountUseCase::new(
                idp,
                users.clone(),
                tokens.clone(),
            )),

            create_tenant_use_case: Arc::new(CreateTenantUseCase::new(tenants.clone())),
            update_tenant_use_case: Arc::new(UpdateTenantUseCase::new(
                tenants.clone(),
                checker.clone(),
            )),
            delete_tenant_use_case: Arc::new(DeleteTenantUseCase::new(
                tenants.clone(),
                users.clone(),
                checker.clone(),
            )),
            get_tenant_use_case: Arc::new(GetTenantUseCase::new(
                tenants.clone(),
                users.clone(),
                roles.clone(),
                policies.clone(),
                bundles.clone(),
            )),
            manage_role_use_case: Arc::new(ManageRoleUseCase::new(roles.clone(), tenants)),
            assign_role_use_case: Arc::new(AssignRoleUseCase::new(
                users.clone(),
                roles.clone(),
                checker.clone(),
            )),
            sync_role_permissions_use_case: Arc::new(SyncRolePermissionsUseCase::new(
                roles,
                permissions.clone(),
            )),
            manage_permission_use_case: Arc::new(ManagePermissionUseCase::new(permissions)),

            manage_policy_use_case: Arc::new(ManagePolicyUseCase::new(
                policies.clone(),
                engine.clone(),
            )),
            validate_policy_use_case: Arc::new(ValidatePolicyUseCase::new(
                policies.clone(),
                engine.clone(),
            )),
            test_policy_use_case: Arc::new(TestPolicyUseCase::new(
                policies.clone(),
                engine.clone(),
            )),
            publish_policy_use_case: Arc::new(PublishPolicyUseCase::new(
                policies.clone(),
                engine,
                checker.clone(),
            )),
            rollback_policy_use_case: Arc::new(RollbackPolicyUseCase::new(
                policies.clone(),
                checker.clone(),
            )),

            build_bundle_use_case: Arc::new(BuildBundleUseCase::new(
                bundles.clone(),
                policies,
                object_store.clone(),
            )),
            activate_bundle_use_case: Arc::new(ActivateBundleUseCase::new(
                bundles.clone(),
                checker.clone(),
            )),
            deploy_bundle_use_case: Arc::new(DeployBundleUseCase::new(bundles.clone())),
            manage_bundle_use_case: Arc::new(ManageBundleUseCase::new(bundles, object_store)),

            settings,
            tokens,
            checker,
            cache,
            audit,
            audit_log,
            users,
        })
    }
}
