//! Docker-gated repository round-trip suite against a real Postgres.
//! Ignored by default; run with `cargo test -- --ignored` when Docker is
//! available, or point DATABASE_URL at an existing database.

use shared::domain::entities::{Policy, PolicyType, PolicyVersion, Tenant, User};
use shared::domain::repositories::{PolicyRepository, TenantRepository, UserRepository};
use shared::infrastructure::repositories::{
    PolicyRepositoryImpl, TenantRepositoryImpl, UserRepositoryImpl,
};
use sqlx::PgPool;
use uuid::Uuid;

async fn setup_pool() -> PgPool {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => setup_container().await,
    };
    let pool = PgPool::connect(&url).await.expect("connect postgres");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    pool
}

async fn setup_container() -> String {
    use testcontainers_modules::postgres::Postgres;
    use testcontainers_modules::testcontainers::runners::AsyncRunner;

    let container = Postgres::default()
        .with_user("heimdall")
        .with_password("heimdall")
        .with_db_name("heimdall_test")
        .start()
        .await
        .expect("start postgres container; is Docker running?");
    let host = container.get_host().await.expect("container host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("container port");

    // Keep the container alive for the process lifetime.
    std::mem::forget(container);
    format!("postgresql://heimdall:heimdall@{}:{}/heimdall_test", host, port)
}

#[tokio::test]
#[ignore = "requires Docker or DATABASE_URL"]
async fn tenant_and_user_round_trip() {
    let pool = setup_pool().await;
    let tenants = TenantRepositoryImpl::new(pool.clone());
    let users = UserRepositoryImpl::new(pool);

    let suffix = Uuid::new_v4().simple().to_string();
    let tenant = tenants
        .create(Tenant::new(
            "Round Trip".to_string(),
            format!("round-trip-{}", suffix),
            10,
            10,
        ))
        .await
        .unwrap();

    let fetched = tenants.find_by_id(tenant.id).await.unwrap().unwrap();
    assert_eq!(fetched.slug, tenant.slug);
    assert_eq!(fetched.status, tenant.status);

    let user = users
        .create(User::new(
            tenant.id,
            format!("rt-{}@x.test", suffix),
            format!("idp-{}", suffix),
            Some("R".to_string()),
            Some("T".to_string()),
        ))
        .await
        .unwrap();
    assert_eq!(users.count_by_tenant(tenant.id).await.unwrap(), 1);

    // Duplicate email maps to the domain conflict.
    let duplicate = users
        .create(User::new(
            tenant.id,
            user.email.clone(),
            format!("idp2-{}", suffix),
            None,
            None,
        ))
        .await;
    assert!(matches!(duplicate, Err(shared::AppError::UserExists(_))));

    // Soft delete hides the row from every lookup.
    let mut deleted = user.clone();
    deleted.mark_deleted();
    users.update(deleted).await.unwrap();
    assert!(users.find_by_id(user.id).await.unwrap().is_none());
    assert_eq!(users.count_by_tenant(tenant.id).await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "requires Docker or DATABASE_URL"]
async fn policy_versioning_round_trip() {
    let pool = setup_pool().await;
    let tenants = TenantRepositoryImpl::new(pool.clone());
    let policies = PolicyRepositoryImpl::new(pool);

    let suffix = Uuid::new_v4().simple().to_string();
    let tenant = tenants
        .create(Tenant::new(
            "Policies".to_string(),
            format!("policies-{}", suffix),
            10,
            10,
        ))
        .await
        .unwrap();

    let mut policy = policies
        .create(Policy::new(
            tenant.id,
            format!("p-{}", suffix),
            None,
            PolicyType::Rego,
            "package p\n\ndefault allow = false\n".to_string(),
        ))
        .await
        .unwrap();

    let snapshot = PolicyVersion::snapshot(&policy, Some("open up".to_string()), None);
    policy.replace_content("package p\n\ndefault allow = true\n".to_string());
    let updated = policies.update_with_version(policy, snapshot).await.unwrap();
    assert_eq!(updated.version, 2);

    let versions = policies.list_versions(updated.id).await.unwrap();
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0].version, 1);
    assert!(versions[0].content.contains("allow = false"));

    let v1 = policies.find_version(updated.id, 1).await.unwrap().unwrap();
    assert_eq!(v1.content, versions[0].content);
}
