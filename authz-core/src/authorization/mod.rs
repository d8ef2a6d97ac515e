pub mod checker;
pub mod decision_input;

pub use checker::{CheckRequest, Decision, PermissionChecker};
pub use decision_input::{
    ContextInput, DecisionInput, ResourceInput, TenantInput, TimeInput, UserInput,
};
