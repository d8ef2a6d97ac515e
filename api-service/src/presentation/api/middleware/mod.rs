pub mod auth_middleware;
pub mod decision_middleware;
pub mod rate_limit_middleware;

pub use auth_middleware::auth_middleware;
pub use decision_middleware::{decision_middleware, Gate};
pub use rate_limit_middleware::rate_limit_middleware;
