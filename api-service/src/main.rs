use admin_service::use_cases::setup::SeedDefaultsUseCase;
use api_service::{build_router, AppState, Repositories};
use authz_core::oidc::TokenManager;
use authz_core::session::TokenService;
use shared::config::Settings;
use shared::infrastructure::cache::RedisCache;
use shared::infrastructure::database::create_pool;
use shared::infrastructure::engine::HttpPolicyEngine;
use shared::infrastructure::idp::HttpIdentityProvider;
use shared::infrastructure::logging;
use shared::infrastructure::objectstore::S3ObjectStore;
use shared::infrastructure::repositories::{
    AuditRepositoryImpl, BundleRepositoryImpl, PermissionRepositoryImpl, PolicyRepositoryImpl,
    RoleRepositoryImpl, TenantRepositoryImpl, UserRepositoryImpl,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let settings = Arc::new(
        Settings::load().map_err(|e| anyhow::anyhow!("failed to load configuration: {}", e))?,
    );
    logging::init_from_settings(&settings);

    info!(
        environment = %settings.server.environment,
        port = settings.server.port,
        "Starting heimdall api-service"
    );

    let pool = create_pool(&settings.database).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let repositories = Repositories {
        tenants: Arc::new(TenantRepositoryImpl::new(pool.clone())),
        users: Arc::new(UserRepositoryImpl::new(pool.clone())),
        roles: Arc::new(RoleRepositoryImpl::new(pool.clone())),
        permissions: Arc::new(PermissionRepositoryImpl::new(pool.clone())),
        policies: Arc::new(PolicyRepositoryImpl::new(pool.clone())),
        bundles: Arc::new(BundleRepositoryImpl::new(pool.clone())),
        audit: Arc::new(AuditRepositoryImpl::new(pool.clone())),
    };

    SeedDefaultsUseCase::new(
        repositories.tenants.clone(),
        repositories.roles.clone(),
        repositories.permissions.clone(),
        settings.server.default_tenant_slug.clone(),
    )
    .execute()
    .await?;

    let cache = Arc::new(RedisCache::connect(&settings.cache).await?);
    let idp = Arc::new(HttpIdentityProvider::new(&settings.idp)?);
    let engine = Arc::new(HttpPolicyEngine::new(&settings.engine)?);
    let object_store = Arc::new(S3ObjectStore::new(&settings.object_store));

    let token_manager = TokenManager::from_key_files(&settings.jwt)?;
    let tokens = Arc::new(TokenService::new(token_manager, cache.clone()));

    let state = AppState::from_parts(
        settings.clone(),
        repositories,
        tokens,
        cache,
        idp,
        engine,
        object_store,
    );
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.server.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received, draining requests");
}
