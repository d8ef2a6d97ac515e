//! Shared test infrastructure: an `AppState` wired with in-memory stores, a
//! scripted IdP, and a policy engine fake that implements the decision
//! contract the production rego policies follow.

#![allow(dead_code)]

use api_service::{build_router, AppState, Repositories};
use async_trait::async_trait;
use authz_core::oidc::TokenManager;
use authz_core::session::TokenService;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use shared::config::{
    CacheConfig, DatabaseConfig, EngineConfig, IdpConfig, JwtConfig, LoggingConfig,
    ObjectStoreConfig, ServerConfig, Settings,
};
use shared::domain::entities::{
    AuditEntry, Bundle, Deployment, Environment, Permission, Policy, PolicyVersion, Role, Tenant,
    User, UserRole,
};
use shared::domain::repositories::{
    AuditRepository, BundleRepository, PermissionRepository, PolicyRepository, RoleRepository,
    TenantRepository, UserRepository,
};
use shared::infrastructure::cache::MemoryCache;
use shared::infrastructure::engine::{EngineRejection, PolicyEngine, UploadOutcome};
use shared::infrastructure::idp::{IdentityProvider, IdpUser};
use shared::infrastructure::objectstore::MemoryObjectStore;
use shared::{AppError, AppResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;

pub const PRIVATE_PEM: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/rsa_private.pem"));
pub const PUBLIC_PEM: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/rsa_public.pem"));

// ---------------------------------------------------------------------------
// In-memory repositories
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryTenantRepository {
    rows: Mutex<HashMap<Uuid, Tenant>>,
}

#[async_trait]
impl TenantRepository for MemoryTenantRepository {
    async fn create(&self, tenant: Tenant) -> AppResult<Tenant> {
        let mut rows = self.rows.lock().unwrap();
        if rows.values().any(|t| t.slug == tenant.slug) {
            return Err(AppError::TenantExists(tenant.slug));
        }
        rows.insert(tenant.id, tenant.clone());
        Ok(tenant)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Tenant>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.get(&id).filter(|t| t.deleted_at.is_none()).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Tenant>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .values()
            .find(|t| t.slug == slug && t.deleted_at.is_none())
            .cloned())
    }

    async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<Tenant>> {
        let rows = self.rows.lock().unwrap();
        let mut tenants: Vec<Tenant> = rows
            .values()
            .filter(|t| t.deleted_at.is_none())
            .cloned()
            .collect();
        tenants.sort_by_key(|t| t.created_at);
        Ok(tenants
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn update(&self, tenant: Tenant) -> AppResult<Tenant> {
        let mut rows = self.rows.lock().unwrap();
        rows.insert(tenant.id, tenant.clone());
        Ok(tenant)
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    rows: Mutex<HashMap<Uuid, User>>,
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        let mut rows = self.rows.lock().unwrap();
        if rows.values().any(|u| u.email == user.email) {
            return Err(AppError::UserExists(user.email));
        }
        rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.get(&id).filter(|u| u.deleted_at.is_none()).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .values()
            .find(|u| u.email == email && u.deleted_at.is_none())
            .cloned())
    }

    async fn find_by_external_subject(&self, subject_id: &str) -> AppResult<Option<User>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .values()
            .find(|u| u.external_subject_id == subject_id && u.deleted_at.is_none())
            .cloned())
    }

    async fn list_by_tenant(
        &self,
        tenant_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<User>> {
        let rows = self.rows.lock().unwrap();
        let mut users: Vec<User> = rows
            .values()
            .filter(|u| u.tenant_id == tenant_id && u.deleted_at.is_none())
            .cloned()
            .collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn update(&self, user: User) -> AppResult<User> {
        let mut rows = self.rows.lock().unwrap();
        rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn count_by_tenant(&self, tenant_id: Uuid) -> AppResult<i64> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .values()
            .filter(|u| u.tenant_id == tenant_id && u.deleted_at.is_none())
            .count() as i64)
    }
}

#[derive(Default)]
pub struct MemoryRoleRepository {
    rows: Mutex<HashMap<Uuid, Role>>,
    links: Mutex<Vec<UserRole>>,
}

#[async_trait]
impl RoleRepository for MemoryRoleRepository {
    async fn create(&self, role: Role) -> AppResult<Role> {
        let mut rows = self.rows.lock().unwrap();
        rows.insert(role.id, role.clone());
        Ok(role)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Role>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.get(&id).filter(|r| r.deleted_at.is_none()).cloned())
    }

    async fn find_by_name(&self, tenant_id: Uuid, name: &str) -> AppResult<Option<Role>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .values()
            .find(|r| r.tenant_id == tenant_id && r.name == name && r.deleted_at.is_none())
            .cloned())
    }

    async fn list_by_tenant(&self, tenant_id: Uuid) -> AppResult<Vec<Role>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .values()
            .filter(|r| r.tenant_id == tenant_id && r.deleted_at.is_none())
            .cloned()
            .collect())
    }

    async fn update(&self, role: Role) -> AppResult<Role> {
        let mut rows = self.rows.lock().unwrap();
        rows.insert(role.id, role.clone());
        Ok(role)
    }

    async fn count_by_tenant(&self, tenant_id: Uuid) -> AppResult<i64> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .values()
            .filter(|r| r.tenant_id == tenant_id && r.deleted_at.is_none())
            .count() as i64)
    }

    async fn assign_to_user(&self, link: UserRole) -> AppResult<()> {
        let mut links = self.links.lock().unwrap();
        links.retain(|l| !(l.user_id == link.user_id && l.role_id == link.role_id));
        links.push(link);
        Ok(())
    }

    async fn remove_from_user(&self, user_id: Uuid, role_id: Uuid) -> AppResult<()> {
        let mut links = self.links.lock().unwrap();
        links.retain(|l| !(l.user_id == user_id && l.role_id == role_id));
        Ok(())
    }

    async fn roles_for_user(&self, user_id: Uuid) -> AppResult<Vec<Role>> {
        let now = Utc::now();
        let links = self.links.lock().unwrap();
        let rows = self.rows.lock().unwrap();
        Ok(links
            .iter()
            .filter(|l| l.user_id == user_id && !l.is_expired(now))
            .filter_map(|l| rows.get(&l.role_id))
            .filter(|r| r.deleted_at.is_none())
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryPermissionRepository {
    rows: Mutex<HashMap<Uuid, Permission>>,
    links: Mutex<Vec<(Uuid, Uuid)>>,
    role_links: Arc<MemoryRoleRepository>,
}

impl MemoryPermissionRepository {
    pub fn with_roles(role_links: Arc<MemoryRoleRepository>) -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            links: Mutex::new(Vec::new()),
            role_links,
        }
    }
}

#[async_trait]
impl PermissionRepository for MemoryPermissionRepository {
    async fn create(&self, permission: Permission) -> AppResult<Permission> {
        let mut rows = self.rows.lock().unwrap();
        if rows.values().any(|p| p.name == permission.name) {
            return Err(AppError::Conflict(format!(
                "permission {} already exists",
                permission.name
            )));
        }
        rows.insert(permission.id, permission.clone());
        Ok(permission)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Permission>> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Permission>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.values().find(|p| p.name == name).cloned())
    }

    async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<Permission>> {
        let rows = self.rows.lock().unwrap();
        let mut permissions: Vec<Permission> = rows.values().cloned().collect();
        permissions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(permissions
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.rows.lock().unwrap().remove(&id);
        self.links.lock().unwrap().retain(|(_, p)| *p != id);
        Ok(())
    }

    async fn attach_to_role(&self, link: shared::domain::entities::RolePermission) -> AppResult<()> {
        let mut links = self.links.lock().unwrap();
        if !links.contains(&(link.role_id, link.permission_id)) {
            links.push((link.role_id, link.permission_id));
        }
        Ok(())
    }

    async fn detach_from_role(&self, role_id: Uuid, permission_id: Uuid) -> AppResult<()> {
        self.links
            .lock()
            .unwrap()
            .retain(|(r, p)| !(*r == role_id && *p == permission_id));
        Ok(())
    }

    async fn permissions_for_role(&self, role_id: Uuid) -> AppResult<Vec<Permission>> {
        let links = self.links.lock().unwrap();
        let rows = self.rows.lock().unwrap();
        Ok(links
            .iter()
            .filter(|(r, _)| *r == role_id)
            .filter_map(|(_, p)| rows.get(p))
            .cloned()
            .collect())
    }

    async fn permissions_for_user(&self, user_id: Uuid) -> AppResult<Vec<Permission>> {
        let roles = self.role_links.roles_for_user(user_id).await?;
        let links = self.links.lock().unwrap();
        let rows = self.rows.lock().unwrap();
        let mut seen = std::collections::HashSet::new();
        let mut permissions = Vec::new();
        for role in roles {
            for (r, p) in links.iter() {
                if *r == role.id && seen.insert(*p) {
                    if let Some(permission) = rows.get(p) {
                        permissions.push(permission.clone());
                    }
                }
            }
        }
        Ok(permissions)
    }
}

#[derive(Default)]
pub struct MemoryPolicyRepository {
    rows: Mutex<HashMap<Uuid, Policy>>,
    versions: Mutex<Vec<PolicyVersion>>,
}

#[async_trait]
impl PolicyRepository for MemoryPolicyRepository {
    async fn create(&self, policy: Policy) -> AppResult<Policy> {
        self.rows.lock().unwrap().insert(policy.id, policy.clone());
        Ok(policy)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Policy>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.get(&id).filter(|p| p.deleted_at.is_none()).cloned())
    }

    async fn find_by_name(&self, tenant_id: Uuid, name: &str) -> AppResult<Option<Policy>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .values()
            .find(|p| p.tenant_id == tenant_id && p.name == name && p.deleted_at.is_none())
            .cloned())
    }

    async fn list_by_tenant(
        &self,
        tenant_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Policy>> {
        let rows = self.rows.lock().unwrap();
        let mut policies: Vec<Policy> = rows
            .values()
            .filter(|p| p.tenant_id == tenant_id && p.deleted_at.is_none())
            .cloned()
            .collect();
        policies.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(policies
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn update(&self, policy: Policy) -> AppResult<Policy> {
        self.rows.lock().unwrap().insert(policy.id, policy.clone());
        Ok(policy)
    }

    async fn update_with_version(
        &self,
        policy: Policy,
        version: PolicyVersion,
    ) -> AppResult<Policy> {
        self.versions.lock().unwrap().push(version);
        self.rows.lock().unwrap().insert(policy.id, policy.clone());
        Ok(policy)
    }

    async fn count_by_tenant(&self, tenant_id: Uuid) -> AppResult<i64> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .values()
            .filter(|p| p.tenant_id == tenant_id && p.deleted_at.is_none())
            .count() as i64)
    }

    async fn list_versions(&self, policy_id: Uuid) -> AppResult<Vec<PolicyVersion>> {
        let versions = self.versions.lock().unwrap();
        let mut matching: Vec<PolicyVersion> = versions
            .iter()
            .filter(|v| v.policy_id == policy_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(matching)
    }

    async fn find_version(
        &self,
        policy_id: Uuid,
        version: i32,
    ) -> AppResult<Option<PolicyVersion>> {
        let versions = self.versions.lock().unwrap();
        Ok(versions
            .iter()
            .find(|v| v.policy_id == policy_id && v.version == version)
            .cloned())
    }
}

#[derive(Default)]
pub struct MemoryBundleRepository {
    rows: Mutex<HashMap<Uuid, Bundle>>,
    deployments: Mutex<Vec<Deployment>>,
}

#[async_trait]
impl BundleRepository for MemoryBundleRepository {
    async fn create(&self, bundle: Bundle) -> AppResult<Bundle> {
        self.rows.lock().unwrap().insert(bundle.id, bundle.clone());
        Ok(bundle)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Bundle>> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn list_by_tenant(&self, tenant_id: Option<Uuid>) -> AppResult<Vec<Bundle>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .values()
            .filter(|b| b.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn update(&self, bundle: Bundle) -> AppResult<Bundle> {
        self.rows.lock().unwrap().insert(bundle.id, bundle.clone());
        Ok(bundle)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.rows.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn find_active(
        &self,
        tenant_id: Option<Uuid>,
        environment: Environment,
    ) -> AppResult<Option<Bundle>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .values()
            .find(|b| {
                b.tenant_id == tenant_id
                    && b.environment == Some(environment)
                    && b.status == shared::domain::entities::BundleStatus::Active
            })
            .cloned())
    }

    async fn swap_active(&self, promoted: Bundle, demoted: Option<Bundle>) -> AppResult<Bundle> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(demoted) = demoted {
            rows.insert(demoted.id, demoted);
        }
        rows.insert(promoted.id, promoted.clone());
        Ok(promoted)
    }

    async fn create_deployment(&self, deployment: Deployment) -> AppResult<Deployment> {
        self.deployments.lock().unwrap().push(deployment.clone());
        Ok(deployment)
    }

    async fn list_deployments(&self, bundle_id: Uuid) -> AppResult<Vec<Deployment>> {
        let deployments = self.deployments.lock().unwrap();
        Ok(deployments
            .iter()
            .filter(|d| d.bundle_id == bundle_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryAuditRepository {
    pub entries: Mutex<Vec<AuditEntry>>,
}

#[async_trait]
impl AuditRepository for MemoryAuditRepository {
    async fn append(&self, entry: AuditEntry) -> AppResult<()> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }

    async fn recent_for_tenant(&self, tenant_id: Uuid, limit: i64) -> AppResult<Vec<AuditEntry>> {
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .iter()
            .filter(|e| e.tenant_id == Some(tenant_id))
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Scripted IdP
// ---------------------------------------------------------------------------

struct IdpAccount {
    subject_id: String,
    password: String,
    mfa_verified: bool,
}

#[derive(Default)]
pub struct FakeIdp {
    accounts: Mutex<HashMap<String, IdpAccount>>,
    pub down: AtomicBool,
}

impl FakeIdp {
    /// Pre-provision a credential, optionally with a verified second factor.
    pub fn provision(&self, email: &str, password: &str, mfa_verified: bool) -> String {
        let subject_id = format!("idp-{}", Uuid::new_v4().simple());
        self.accounts.lock().unwrap().insert(
            email.to_string(),
            IdpAccount {
                subject_id: subject_id.clone(),
                password: password.to_string(),
                mfa_verified,
            },
        );
        subject_id
    }

    fn ensure_up(&self) -> AppResult<()> {
        if self.down.load(Ordering::SeqCst) {
            return Err(AppError::BackendUnavailable(
                "auth backend unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for FakeIdp {
    async fn create_user(
        &self,
        email: &str,
        password: &str,
        _first_name: Option<&str>,
        _last_name: Option<&str>,
    ) -> AppResult<IdpUser> {
        self.ensure_up()?;
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(AppError::UserExists(email.to_string()));
        }
        let subject_id = format!("idp-{}", Uuid::new_v4().simple());
        accounts.insert(
            email.to_string(),
            IdpAccount {
                subject_id: subject_id.clone(),
                password: password.to_string(),
                mfa_verified: false,
            },
        );
        Ok(IdpUser {
            subject_id,
            email: email.to_string(),
            mfa_verified: false,
        })
    }

    async fn authenticate(&self, email: &str, password: &str) -> AppResult<IdpUser> {
        self.ensure_up()?;
        let accounts = self.accounts.lock().unwrap();
        match accounts.get(email) {
            Some(account) if account.password == password => Ok(IdpUser {
                subject_id: account.subject_id.clone(),
                email: email.to_string(),
                mfa_verified: account.mfa_verified,
            }),
            _ => Err(AppError::InvalidCredentials),
        }
    }

    async fn change_password(
        &self,
        subject_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        self.ensure_up()?;
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .values_mut()
            .find(|a| a.subject_id == subject_id)
            .ok_or_else(|| AppError::NotFound("idp user".to_string()))?;
        if account.password != current_password {
            return Err(AppError::InvalidCredentials);
        }
        account.password = new_password.to_string();
        Ok(())
    }

    async fn update_profile(
        &self,
        _subject_id: &str,
        _first_name: Option<&str>,
        _last_name: Option<&str>,
    ) -> AppResult<()> {
        self.ensure_up()
    }

    async fn delete_user(&self, subject_id: &str) -> AppResult<()> {
        self.ensure_up()?;
        self.accounts
            .lock()
            .unwrap()
            .retain(|_, a| a.subject_id != subject_id);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Contract engine
// ---------------------------------------------------------------------------

/// Implements the decision contract: allow iff a sub-policy admits (super
/// admin, self access, or a matching permission grant) and no global-deny
/// (cross-tenant resource) triggers. Uploads containing `%%%` are rejected
/// with location info, mimicking a parser error.
#[derive(Default)]
pub struct ContractEngine {
    pub modules: Mutex<HashMap<String, String>>,
    pub down: AtomicBool,
    pub evaluate_calls: Mutex<u64>,
}

impl ContractEngine {
    fn decide(input: &serde_json::Value) -> (bool, &'static str) {
        let user = &input["user"];
        let resource = &input["resource"];
        let action = input["action"].as_str().unwrap_or_default();

        let roles: Vec<&str> = user["roles"]
            .as_array()
            .map(|a| a.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default();
        if roles.contains(&"super_admin") {
            return (true, "super admin");
        }

        // Global deny: cross-tenant resource access.
        if let (Some(resource_tenant), Some(user_tenant)) =
            (resource["tenantId"].as_str(), user["tenantId"].as_str())
        {
            if resource_tenant != user_tenant {
                return (false, "tenant mismatch");
            }
        }

        if resource["type"].as_str() == Some("user")
            && resource["id"].as_str() == user["id"].as_str()
            && resource["id"].as_str().is_some()
        {
            return (true, "self access");
        }

        let collection = match resource["type"].as_str().unwrap_or_default() {
            "policy" => "policies".to_string(),
            other => format!("{}s", other),
        };
        let needle = format!("{}:{}", collection, action);
        let granted = user["permissions"]
            .as_array()
            .map(|a| {
                a.iter()
                    .filter_map(|v| v.as_str())
                    .any(|p| p == needle || p.starts_with(&format!("{}:", needle)))
            })
            .unwrap_or(false);
        if granted {
            (true, "permission grant")
        } else {
            (false, "no grant")
        }
    }
}

#[async_trait]
impl PolicyEngine for ContractEngine {
    async fn put_policy(&self, id: &str, content: &str) -> AppResult<UploadOutcome> {
        if self.down.load(Ordering::SeqCst) {
            return Err(AppError::BackendUnavailable("engine down".to_string()));
        }
        if content.contains("%%%") {
            return Ok(Err(EngineRejection {
                message: "rego_parse_error: unexpected token".to_string(),
                row: Some(1),
                col: Some(1),
            }));
        }
        self.modules
            .lock()
            .unwrap()
            .insert(id.to_string(), content.to_string());
        Ok(Ok(()))
    }

    async fn delete_policy(&self, id: &str) -> AppResult<()> {
        if self.down.load(Ordering::SeqCst) {
            return Err(AppError::BackendUnavailable("engine down".to_string()));
        }
        self.modules.lock().unwrap().remove(id);
        Ok(())
    }

    async fn list_policies(&self) -> AppResult<Vec<String>> {
        Ok(self.modules.lock().unwrap().keys().cloned().collect())
    }

    async fn evaluate(
        &self,
        path: &str,
        input: &serde_json::Value,
    ) -> AppResult<serde_json::Value> {
        if self.down.load(Ordering::SeqCst) {
            return Err(AppError::BackendUnavailable("engine down".to_string()));
        }
        *self.evaluate_calls.lock().unwrap() += 1;

        if path.ends_with("/batch") {
            let mut results = serde_json::Map::new();
            if let Some(ids) = input["resourceIds"].as_array() {
                for id in ids.iter().filter_map(|v| v.as_str()) {
                    let mut item = input.clone();
                    item["resource"]["id"] = serde_json::json!(id);
                    let (allow, _) = Self::decide(&item);
                    results.insert(id.to_string(), serde_json::json!(allow));
                }
            }
            return Ok(serde_json::json!({"results": results}));
        }

        let (allow, reason) = Self::decide(input);
        Ok(serde_json::json!({
            "allow": allow,
            "reasons": [reason],
            "errors": [],
        }))
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct TestBackend {
    pub app: Router,
    pub idp: Arc<FakeIdp>,
    pub engine: Arc<ContractEngine>,
    pub audit: Arc<MemoryAuditRepository>,
    pub tenants: Arc<MemoryTenantRepository>,
    pub users: Arc<MemoryUserRepository>,
    pub roles: Arc<MemoryRoleRepository>,
    pub permissions: Arc<MemoryPermissionRepository>,
    pub policies: Arc<MemoryPolicyRepository>,
    pub bundles: Arc<MemoryBundleRepository>,
    pub state: Arc<AppState>,
    pub default_tenant: Tenant,
}

pub fn test_settings() -> Settings {
    Settings {
        server: ServerConfig {
            port: 0,
            environment: "development".to_string(),
            allowed_origins: vec!["*".to_string()],
            rate_limit_per_minute: 1000,
            ip_denylist: vec!["10.9.9.9".to_string()],
            default_tenant_slug: "default".to_string(),
        },
        database: DatabaseConfig {
            url: String::new(),
            max_connections: 1,
            min_connections: 1,
        },
        cache: CacheConfig {
            address: String::new(),
            password: None,
            db: 0,
        },
        jwt: JwtConfig {
            private_key_path: String::new(),
            public_key_path: String::new(),
            issuer: "https://heimdall.test".to_string(),
            access_expiry_secs: 900,
            refresh_expiry_secs: 7 * 24 * 3600,
            remember_me_refresh_expiry_secs: 30 * 24 * 3600,
        },
        idp: IdpConfig {
            url: String::new(),
            api_key: String::new(),
            tenant_id: "t".to_string(),
            application_id: "a".to_string(),
            timeout_secs: 1,
        },
        engine: EngineConfig {
            url: String::new(),
            decision_path: "heimdall/authz".to_string(),
            timeout_secs: 2,
            cache_enabled: true,
        },
        object_store: ObjectStoreConfig {
            endpoint: String::new(),
            access_key: String::new(),
            secret_key: String::new(),
            bucket: "test".to_string(),
            region: "us-east-1".to_string(),
        },
        logging: LoggingConfig {
            level: "info".to_string(),
            rust_log: String::new(),
        },
    }
}

pub async fn test_backend() -> TestBackend {
    test_backend_with(test_settings()).await
}

pub async fn test_backend_with(settings: Settings) -> TestBackend {
    let settings = Arc::new(settings);

    let tenants = Arc::new(MemoryTenantRepository::default());
    let users = Arc::new(MemoryUserRepository::default());
    let roles = Arc::new(MemoryRoleRepository::default());
    let permissions = Arc::new(MemoryPermissionRepository::with_roles(roles.clone()));
    let policies = Arc::new(MemoryPolicyRepository::default());
    let bundles = Arc::new(MemoryBundleRepository::default());
    let audit = Arc::new(MemoryAuditRepository::default());
    let idp = Arc::new(FakeIdp::default());
    let engine = Arc::new(ContractEngine::default());

    // Seed like the binary does on boot.
    admin_service::use_cases::setup::SeedDefaultsUseCase::new(
        tenants.clone(),
        roles.clone(),
        permissions.clone(),
        "default".to_string(),
    )
    .execute()
    .await
    .expect("seeding failed");
    let default_tenant = tenants
        .find_by_slug("default")
        .await
        .unwrap()
        .expect("default tenant seeded");

    let manager = TokenManager::from_pem(
        PRIVATE_PEM.as_bytes(),
        PUBLIC_PEM.as_bytes(),
        "https://heimdall.test".to_string(),
        900,
        7 * 24 * 3600,
        30 * 24 * 3600,
    )
    .expect("token manager");
    let cache = Arc::new(MemoryCache::new());
    let tokens = Arc::new(TokenService::new(manager, cache.clone()));

    let repositories = Repositories {
        tenants: tenants.clone(),
        users: users.clone(),
        roles: roles.clone(),
        permissions: permissions.clone(),
        policies: policies.clone(),
        bundles: bundles.clone(),
        audit: audit.clone(),
    };
    let state = AppState::from_parts(
        settings,
        repositories,
        tokens,
        cache,
        idp.clone(),
        engine.clone(),
        Arc::new(MemoryObjectStore::new()),
    );
    let app = build_router(state.clone());

    TestBackend {
        app,
        idp,
        engine,
        audit,
        tenants,
        users,
        roles,
        permissions,
        policies,
        bundles,
        state,
        default_tenant,
    }
}

impl TestBackend {
    /// Fire one request at the router and decode the JSON body.
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let value = if bytes.is_empty() {
            serde_json::json!(null)
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::json!(null))
        };
        (status, value)
    }

    /// Register a user through the API and return (access, refresh, user id).
    pub async fn register_user(&self, email: &str, password: &str) -> (String, String, Uuid) {
        let (status, body) = self
            .send(
                "POST",
                "/v1/auth/register",
                None,
                Some(serde_json::json!({
                    "email": email,
                    "password": password,
                    "firstName": "Test",
                    "lastName": "User",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        let data = &body["data"];
        (
            data["accessToken"].as_str().unwrap().to_string(),
            data["refreshToken"].as_str().unwrap().to_string(),
            Uuid::parse_str(data["user"]["id"].as_str().unwrap()).unwrap(),
        )
    }

    /// Grant the seeded `super_admin` role to a user directly in the store.
    pub async fn make_super_admin(&self, user_id: Uuid) {
        let role = self
            .roles
            .find_by_name(self.default_tenant.id, "super_admin")
            .await
            .unwrap()
            .expect("super_admin role seeded");
        self.roles
            .assign_to_user(UserRole::new(user_id, role.id, Uuid::nil()))
            .await
            .unwrap();
    }

    /// Login through the API, returning the full auth response data.
    pub async fn login(&self, email: &str, password: &str) -> serde_json::Value {
        let (status, body) = self
            .send(
                "POST",
                "/v1/auth/login",
                None,
                Some(serde_json::json!({"email": email, "password": password})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["data"].clone()
    }
}
