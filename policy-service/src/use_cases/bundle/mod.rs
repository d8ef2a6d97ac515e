pub mod activate_bundle;
pub mod build_bundle;
pub mod manage_bundle;

pub use activate_bundle::{ActivateBundleUseCase, DeployBundleUseCase};
pub use build_bundle::BuildBundleUseCase;
pub use manage_bundle::ManageBundleUseCase;
