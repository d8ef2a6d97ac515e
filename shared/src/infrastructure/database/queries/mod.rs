pub mod audit;
pub mod bundles;
pub mod permissions;
pub mod policies;
pub mod roles;
pub mod tenants;
pub mod users;
