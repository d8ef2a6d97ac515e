pub mod audit_repository_impl;
pub mod bundle_repository_impl;
pub mod permission_repository_impl;
pub mod policy_repository_impl;
pub mod role_repository_impl;
pub mod tenant_repository_impl;
pub mod user_repository_impl;

pub use audit_repository_impl::AuditRepositoryImpl;
pub use bundle_repository_impl::BundleRepositoryImpl;
pub use permission_repository_impl::PermissionRepositoryImpl;
pub use policy_repository_impl::PolicyRepositoryImpl;
pub use role_repository_impl::RoleRepositoryImpl;
pub use tenant_repository_impl::TenantRepositoryImpl;
pub use user_repository_impl::UserRepositoryImpl;

use crate::shared::AppError;

/// Map a unique-constraint violation on insert to a domain conflict error.
pub(crate) fn map_insert_error(e: sqlx::Error, conflict: impl FnOnce() -> AppError) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => conflict(),
        _ => AppError::Database(e),
    }
}
