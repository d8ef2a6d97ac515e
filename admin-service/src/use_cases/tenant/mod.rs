pub mod create_tenant;
pub mod delete_tenant;
pub mod get_tenant;
pub mod update_tenant;

pub use create_tenant::CreateTenantUseCase;
pub use delete_tenant::DeleteTenantUseCase;
pub use get_tenant::GetTenantUseCase;
pub use update_tenant::UpdateTenantUseCase;
