use chrono::Utc;
use serde::{Deserialize, Serialize};
use shared::domain::repositories::{
    PermissionRepository, RoleRepository, TenantRepository, UserRepository,
};
use shared::infrastructure::cache::{keys, CacheStore};
use shared::infrastructure::engine::PolicyEngine;
use shared::{AppResult, RequestContext};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use super::decision_input::{
    ContextInput, DecisionInput, ResourceInput, TenantInput, TimeInput, UserInput,
};

/// How long a decision or a pinned role/permission snapshot may be served
/// from cache.
const DECISION_TTL: Duration = Duration::from_secs(300);
const PRINCIPAL_TTL: Duration = Duration::from_secs(300);

/// One gated operation, as fixed by the route.
#[derive(Debug, Clone)]
pub struct CheckRequest {
    pub resource_type: &'static str,
    pub action: &'static str,
    pub resource_id: Option<String>,
    /// Looked up server-side immediately before the query, never taken from
    /// the request body.
    pub resource_owner_id: Option<Uuid>,
    pub resource_tenant_id: Option<Uuid>,
    pub resource_attributes: Option<serde_json::Value>,
    pub method: String,
    pub path: String,
    pub require_mfa: bool,
    pub require_ownership: bool,
    pub use_cache: bool,
}

impl CheckRequest {
    pub fn new(resource_type: &'static str, action: &'static str) -> Self {
        Self {
            resource_type,
            action,
            resource_id: None,
            resource_owner_id: None,
            resource_tenant_id: None,
            resource_attributes: None,
            method: String::new(),
            path: String::new(),
            require_mfa: false,
            require_ownership: false,
            use_cache: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub allow: bool,
    #[serde(default)]
    pub reasons: Vec<String>,
}

impl Decision {
    fn deny(reason: &str) -> Self {
        Self {
            allow: false,
            reasons: vec![reason.to_string()],
        }
    }
}

#[derive(Debug, Deserialize)]
struct EngineResult {
    #[serde(default)]
    allow: bool,
    #[serde(default)]
    reasons: Vec<String>,
    #[serde(default)]
    errors: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BatchEngineResult {
    #[serde(default)]
    results: HashMap<String, bool>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PrincipalSnapshot {
    roles: Vec<String>,
    permissions: Vec<String>,
}

/// The decision pipeline: assembles a decision input from the authenticated
/// request, consults the engine through the decision cache, and denies on
/// any engine failure.
pub struct PermissionChecker {
    engine: Arc<dyn PolicyEngine>,
    cache: Arc<dyn CacheStore>,
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
    permissions: Arc<dyn PermissionRepository>,
    tenants: Arc<dyn TenantRepository>,
    decision_path: String,
    cache_enabled: bool,
    engine_timeout: Duration,
    ip_denylist: Vec<String>,
}

impl PermissionChecker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        engine: Arc<dyn PolicyEngine>,
        cache: Arc<dyn CacheStore>,
        users: Arc<dyn UserRepository>,
        roles: Arc<dyn RoleRepository>,
        permissions: Arc<dyn PermissionRepository>,
        tenants: Arc<dyn TenantRepository>,
        decision_path: String,
        cache_enabled: bool,
        engine_timeout: Duration,
        ip_denylist: Vec<String>,
    ) -> Self {
        Self {
            engine,
            cache,
            users,
            roles,
            permissions,
            tenants,
            decision_path,
            cache_enabled,
            engine_timeout,
            ip_denylist,
        }
    }

    /// Evaluate one gated operation. Never errors on engine trouble: the
    /// outcome is a deny instead.
    pub async fn check(&self, ctx: &RequestContext, request: CheckRequest) -> AppResult<Decision> {
        if request.require_mfa && !ctx.mfa_verified {
            return Ok(Decision::deny("mfa required"));
        }
        if let Some(ip) = &ctx.ip_address {
            if self.ip_denylist.iter().any(|denied| denied == ip) {
                return Ok(Decision::deny("ip denied"));
            }
        }

        // A suspended or deleted tenant is a global deny regardless of what
        // any policy says.
        let tenant = match self.tenants.find_by_id(ctx.tenant_id).await? {
            Some(tenant) if tenant.is_active() => tenant,
            _ => return Ok(Decision::deny("tenant not active")),
        };

        // Ownership shortcut: the owner gets through, everyone else still
        // has to convince the engine via roles.
        if request.require_ownership {
            if let Some(owner_id) = request.resource_owner_id {
                if owner_id == ctx.user_id {
                    return Ok(Decision {
                        allow: true,
                        reasons: vec!["resource owner".to_string()],
                    });
                }
            }
        }

        let use_cache = self.cache_enabled && request.use_cache;
        let cache_key = keys::decision_key(
            ctx.user_id,
            request.resource_type,
            request.action,
            request.resource_id.as_deref(),
        );
        if use_cache {
            if let Ok(Some(cached)) = self.cache.get(&cache_key).await {
                if let Ok(decision) = serde_json::from_str::<Decision>(&cached) {
                    return Ok(decision);
                }
            }
        }

        let input = self.assemble_input(ctx, &request, &tenant).await?;
        let decision = self.query_engine(&self.decision_path, &input).await;

        if use_cache {
            if let Ok(encoded) = serde_json::to_string(&decision) {
                if let Err(e) = self.cache.set(&cache_key, &encoded, DECISION_TTL).await {
                    tracing::warn!("Failed to cache decision: {}", e);
                }
            }
        }
        Ok(decision)
    }

    /// Batch variant: one engine query, one boolean per resource id.
    /// Ids the engine does not mention come back denied.
    pub async fn filter_allowed(
        &self,
        ctx: &RequestContext,
        request: CheckRequest,
        ids: &[String],
    ) -> AppResult<Vec<(String, bool)>> {
        let tenant = match self.tenants.find_by_id(ctx.tenant_id).await? {
            Some(tenant) if tenant.is_active() => tenant,
            _ => return Ok(ids.iter().map(|id| (id.clone(), false)).collect()),
        };

        let mut input = serde_json::to_value(self.assemble_input(ctx, &request, &tenant).await?)?;
        input["resourceIds"] = serde_json::to_value(ids)?;

        let path = format!("{}/batch", self.decision_path);
        let evaluated = tokio::time::timeout(
            self.engine_timeout,
            self.engine.evaluate(&path, &input),
        )
        .await;

        let results = match evaluated {
            Ok(Ok(value)) => serde_json::from_value::<BatchEngineResult>(value)
                .map(|r| r.results)
                .unwrap_or_default(),
            Ok(Err(e)) => {
                tracing::warn!("Engine batch check failed, denying all: {}", e);
                HashMap::new()
            }
            Err(_) => {
                tracing::warn!("Engine batch check timed out, denying all");
                HashMap::new()
            }
        };

        Ok(ids
            .iter()
            .map(|id| (id.clone(), results.get(id).copied().unwrap_or(false)))
            .collect())
    }

    /// Drop the cached decisions and the pinned role/permission snapshot of
    /// one user. Called on role assignment and removal.
    pub async fn invalidate_user(&self, user_id: Uuid) -> AppResult<()> {
        for key in self.cache.keys(&keys::decision_pattern(user_id)).await? {
            self.cache.delete(&key).await?;
        }
        self.cache.delete(&keys::user_roles_key(user_id)).await
    }

    /// Drop cached decisions for every member of a tenant. Called on policy
    /// publish/rollback and bundle activation; publish must be observed
    /// before any fresh decision is computed.
    pub async fn invalidate_tenant(&self, tenant_id: Uuid) -> AppResult<()> {
        let mut offset = 0;
        const PAGE: i64 = 500;
        loop {
            let users = self.users.list_by_tenant(tenant_id, PAGE, offset).await?;
            let page_len = users.len() as i64;
            for user in users {
                self.invalidate_user(user.id).await?;
            }
            if page_len < PAGE {
                return Ok(());
            }
            offset += PAGE;
        }
    }

    async fn assemble_input(
        &self,
        ctx: &RequestContext,
        request: &CheckRequest,
        tenant: &shared::domain::entities::Tenant,
    ) -> AppResult<DecisionInput> {
        let snapshot = self.principal_snapshot(ctx.user_id).await?;
        let now = Utc::now();

        let user = self.users.find_by_id(ctx.user_id).await?;
        let metadata = user
            .map(|u| u.metadata)
            .unwrap_or_else(|| serde_json::json!({}));

        Ok(DecisionInput {
            user: UserInput {
                id: ctx.user_id.to_string(),
                email: ctx.email.clone(),
                roles: snapshot.roles,
                permissions: snapshot.permissions,
                tenant_id: ctx.tenant_id.to_string(),
                metadata,
            },
            resource: ResourceInput {
                resource_type: request.resource_type.to_string(),
                id: request.resource_id.clone(),
                owner_id: request.resource_owner_id.map(|id| id.to_string()),
                tenant_id: request.resource_tenant_id.map(|id| id.to_string()),
                attributes: request.resource_attributes.clone(),
            },
            action: request.action.to_string(),
            time: TimeInput::from_datetime(now),
            context: ContextInput {
                ip_address: ctx.ip_address.clone(),
                user_agent: ctx.user_agent.clone(),
                method: request.method.clone(),
                path: request.path.clone(),
                mfa_verified: ctx.mfa_verified,
                session_age: ctx.session_age_secs(now),
            },
            tenant: TenantInput {
                id: tenant.id.to_string(),
                slug: tenant.slug.clone(),
                status: tenant.status.as_str().to_string(),
                settings: tenant.settings.clone(),
            },
        })
    }

    /// Role and permission lists, loaded once per request from the store or
    /// a short-lived cache snapshot, then pinned in the decision input.
    async fn principal_snapshot(&self, user_id: Uuid) -> AppResult<PrincipalSnapshot> {
        let key = keys::user_roles_key(user_id);
        if let Ok(Some(cached)) = self.cache.get(&key).await {
            if let Ok(snapshot) = serde_json::from_str::<PrincipalSnapshot>(&cached) {
                return Ok(snapshot);
            }
        }

        let roles = self.roles.roles_for_user(user_id).await?;
        let permissions = self.permissions.permissions_for_user(user_id).await?;
        let snapshot = PrincipalSnapshot {
            roles: roles.into_iter().map(|r| r.name).collect(),
            permissions: permissions.into_iter().map(|p| p.name).collect(),
        };
        if let Ok(encoded) = serde_json::to_string(&snapshot) {
            if let Err(e) = self.cache.set(&key, &encoded, PRINCIPAL_TTL).await {
                tracing::warn!("Failed to cache principal snapshot: {}", e);
            }
        }
        Ok(snapshot)
    }

    async fn query_engine(&self, path: &str, input: &DecisionInput) -> Decision {
        let input = match serde_json::to_value(input) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Decision input serialisation failed: {}", e);
                return Decision::deny("engine unavailable");
            }
        };

        match tokio::time::timeout(self.engine_timeout, self.engine.evaluate(path, &input)).await {
            Ok(Ok(value)) => match serde_json::from_value::<EngineResult>(value) {
                Ok(result) if !result.errors.is_empty() => Decision {
                    allow: false,
                    reasons: result.errors,
                },
                Ok(result) => Decision {
                    allow: result.allow,
                    reasons: result.reasons,
                },
                Err(_) => Decision::deny("malformed engine response"),
            },
            Ok(Err(e)) => {
                tracing::warn!("Engine query failed, denying: {}", e);
                Decision::deny("engine unavailable")
            }
            Err(_) => {
                tracing::warn!("Engine query timed out, denying");
                Decision::deny("engine unavailable")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use shared::domain::entities::{Permission, Role, Tenant, User, UserRole};
    use shared::infrastructure::cache::MemoryCache;
    use shared::infrastructure::engine::UploadOutcome;
    use shared::AppError;
    use std::sync::Mutex;

    struct FakeEngine {
        response: Mutex<Option<serde_json::Value>>,
        calls: Mutex<u32>,
        fail: bool,
    }

    impl FakeEngine {
        fn allowing(allow: bool) -> Self {
            Self {
                response: Mutex::new(Some(serde_json::json!({
                    "allow": allow,
                    "reasons": ["role grant"],
                    "errors": [],
                }))),
                calls: Mutex::new(0),
                fail: false,
            }
        }

        fn unreachable() -> Self {
            Self {
                response: Mutex::new(None),
                calls: Mutex::new(0),
                fail: true,
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl PolicyEngine for FakeEngine {
        async fn put_policy(&self, _id: &str, _content: &str) -> AppResult<UploadOutcome> {
            Ok(Ok(()))
        }
        async fn delete_policy(&self, _id: &str) -> AppResult<()> {
            Ok(())
        }
        async fn list_policies(&self) -> AppResult<Vec<String>> {
            Ok(vec![])
        }
        async fn evaluate(
            &self,
            _path: &str,
            _input: &serde_json::Value,
        ) -> AppResult<serde_json::Value> {
            *self.calls.lock().unwrap() += 1;
            if self.fail {
                return Err(AppError::BackendUnavailable("engine down".to_string()));
            }
            Ok(self.response.lock().unwrap().clone().unwrap_or_default())
        }
    }

    struct FakeStore {
        tenant: Tenant,
        user: User,
    }

    #[async_trait]
    impl TenantRepository for FakeStore {
        async fn create(&self, tenant: Tenant) -> AppResult<Tenant> {
            Ok(tenant)
        }
        async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Tenant>> {
            Ok((id == self.tenant.id).then(|| self.tenant.clone()))
        }
        async fn find_by_slug(&self, _slug: &str) -> AppResult<Option<Tenant>> {
            Ok(Some(self.tenant.clone()))
        }
        async fn list(&self, _limit: i64, _offset: i64) -> AppResult<Vec<Tenant>> {
            Ok(vec![self.tenant.clone()])
        }
        async fn update(&self, tenant: Tenant) -> AppResult<Tenant> {
            Ok(tenant)
        }
    }

    #[async_trait]
    impl UserRepository for FakeStore {
        async fn create(&self, user: User) -> AppResult<User> {
            Ok(user)
        }
        async fn find_by_id(&self, _id: Uuid) -> AppResult<Option<User>> {
            Ok(Some(self.user.clone()))
        }
        async fn find_by_email(&self, _email: &str) -> AppResult<Option<User>> {
            Ok(None)
        }
        async fn find_by_external_subject(&self, _subject: &str) -> AppResult<Option<User>> {
            Ok(None)
        }
        async fn list_by_tenant(
            &self,
            _tenant_id: Uuid,
            _limit: i64,
            _offset: i64,
        ) -> AppResult<Vec<User>> {
            Ok(vec![self.user.clone()])
        }
        async fn update(&self, user: User) -> AppResult<User> {
            Ok(user)
        }
        async fn count_by_tenant(&self, _tenant_id: Uuid) -> AppResult<i64> {
            Ok(1)
        }
    }

    #[async_trait]
    impl RoleRepository for FakeStore {
        async fn create(&self, role: Role) -> AppResult<Role> {
            Ok(role)
        }
        async fn find_by_id(&self, _id: Uuid) -> AppResult<Option<Role>> {
            Ok(None)
        }
        async fn find_by_name(&self, _tenant_id: Uuid, _name: &str) -> AppResult<Option<Role>> {
            Ok(None)
        }
        async fn list_by_tenant(&self, _tenant_id: Uuid) -> AppResult<Vec<Role>> {
            Ok(vec![])
        }
        async fn update(&self, role: Role) -> AppResult<Role> {
            Ok(role)
        }
        async fn count_by_tenant(&self, _tenant_id: Uuid) -> AppResult<i64> {
            Ok(0)
        }
        async fn assign_to_user(&self, _link: UserRole) -> AppResult<()> {
            Ok(())
        }
        async fn remove_from_user(&self, _user_id: Uuid, _role_id: Uuid) -> AppResult<()> {
            Ok(())
        }
        async fn roles_for_user(&self, _user_id: Uuid) -> AppResult<Vec<Role>> {
            Ok(vec![Role::new(
                self.tenant.id,
                "editor".to_string(),
                None,
                None,
            )])
        }
    }

    #[async_trait]
    impl PermissionRepository for FakeStore {
        async fn create(&self, permission: Permission) -> AppResult<Permission> {
            Ok(permission)
        }
        async fn find_by_id(&self, _id: Uuid) -> AppResult<Option<Permission>> {
            Ok(None)
        }
        async fn find_by_name(&self, _name: &str) -> AppResult<Option<Permission>> {
            Ok(None)
        }
        async fn list(&self, _limit: i64, _offset: i64) -> AppResult<Vec<Permission>> {
            Ok(vec![])
        }
        async fn delete(&self, _id: Uuid) -> AppResult<()> {
            Ok(())
        }
        async fn attach_to_role(&self, _link: shared::domain::entities::RolePermission) -> AppResult<()> {
            Ok(())
        }
        async fn detach_from_role(&self, _role_id: Uuid, _permission_id: Uuid) -> AppResult<()> {
            Ok(())
        }
        async fn permissions_for_role(&self, _role_id: Uuid) -> AppResult<Vec<Permission>> {
            Ok(vec![])
        }
        async fn permissions_for_user(&self, _user_id: Uuid) -> AppResult<Vec<Permission>> {
            Ok(vec![])
        }
    }

    fn fixture(engine: Arc<FakeEngine>) -> (PermissionChecker, RequestContext) {
        let tenant = Tenant::new("Acme".to_string(), "acme".to_string(), 100, 50);
        let user = User::new(
            tenant.id,
            "a@x.test".to_string(),
            "idp-1".to_string(),
            None,
            None,
        );
        let ctx = RequestContext::new(
            "req-1".to_string(),
            user.id,
            tenant.id,
            user.email.clone(),
            vec!["editor".to_string()],
            Uuid::new_v4().to_string(),
            Utc::now(),
            Utc::now() + chrono::Duration::minutes(15),
        );
        let store = Arc::new(FakeStore { tenant, user });
        let checker = PermissionChecker::new(
            engine,
            Arc::new(MemoryCache::new()),
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            "heimdall/authz".to_string(),
            true,
            Duration::from_secs(5),
            vec!["10.0.0.66".to_string()],
        );
        (checker, ctx)
    }

    #[tokio::test]
    async fn allow_flows_through_from_the_engine() {
        let engine = Arc::new(FakeEngine::allowing(true));
        let (checker, ctx) = fixture(engine);
        let decision = checker
            .check(&ctx, CheckRequest::new("tenant", "read"))
            .await
            .unwrap();
        assert!(decision.allow);
        assert_eq!(decision.reasons, vec!["role grant"]);
    }

    #[tokio::test]
    async fn engine_outage_denies() {
        let engine = Arc::new(FakeEngine::unreachable());
        let (checker, ctx) = fixture(engine);
        let decision = checker
            .check(&ctx, CheckRequest::new("tenant", "read"))
            .await
            .unwrap();
        assert!(!decision.allow);
        assert_eq!(decision.reasons, vec!["engine unavailable"]);
    }

    #[tokio::test]
    async fn second_check_is_served_from_cache() {
        let engine = Arc::new(FakeEngine::allowing(true));
        let (checker, ctx) = fixture(engine.clone());
        for _ in 0..2 {
            checker
                .check(&ctx, CheckRequest::new("tenant", "read"))
                .await
                .unwrap();
        }
        assert_eq!(engine.calls(), 1);
    }

    #[tokio::test]
    async fn invalidation_forces_a_fresh_computation() {
        let engine = Arc::new(FakeEngine::allowing(true));
        let (checker, ctx) = fixture(engine.clone());
        checker
            .check(&ctx, CheckRequest::new("tenant", "read"))
            .await
            .unwrap();
        checker.invalidate_user(ctx.user_id).await.unwrap();
        checker
            .check(&ctx, CheckRequest::new("tenant", "read"))
            .await
            .unwrap();
        assert_eq!(engine.calls(), 2);
    }

    #[tokio::test]
    async fn mfa_gate_denies_without_a_verified_factor() {
        let engine = Arc::new(FakeEngine::allowing(true));
        let (checker, ctx) = fixture(engine.clone());
        let mut request = CheckRequest::new("bundle", "activate");
        request.require_mfa = true;
        let decision = checker.check(&ctx, request).await.unwrap();
        assert!(!decision.allow);
        assert_eq!(decision.reasons, vec!["mfa required"]);
        assert_eq!(engine.calls(), 0);
    }

    #[tokio::test]
    async fn owner_passes_the_ownership_gate_without_the_engine() {
        let engine = Arc::new(FakeEngine::allowing(false));
        let (checker, ctx) = fixture(engine.clone());
        let mut request = CheckRequest::new("user", "read");
        request.require_ownership = true;
        request.resource_owner_id = Some(ctx.user_id);
        let decision = checker.check(&ctx, request).await.unwrap();
        assert!(decision.allow);
        assert_eq!(engine.calls(), 0);
    }

    #[tokio::test]
    async fn denylisted_ip_is_a_global_deny() {
        let engine = Arc::new(FakeEngine::allowing(true));
        let (checker, ctx) = fixture(engine.clone());
        let ctx = ctx.with_ip_address("10.0.0.66".to_string());
        let decision = checker
            .check(&ctx, CheckRequest::new("tenant", "read"))
            .await
            .unwrap();
        assert!(!decision.allow);
        assert_eq!(engine.calls(), 0);
    }

    #[tokio::test]
    async fn batch_denies_ids_the_engine_omits() {
        let engine = Arc::new(FakeEngine {
            response: Mutex::new(Some(serde_json::json!({
                "results": {"a": true, "b": false},
            }))),
            calls: Mutex::new(0),
            fail: false,
        });
        let (checker, ctx) = fixture(engine);
        let results = checker
            .filter_allowed(
                &ctx,
                CheckRequest::new("policy", "read"),
                &["a".to_string(), "b".to_string(), "c".to_string()],
            )
            .await
            .unwrap();
        assert_eq!(
            results,
            vec![
                ("a".to_string(), true),
                ("b".to_string(), false),
                ("c".to_string(), false),
            ]
        );
    }
}
