pub mod auth;
pub mod authorization;
pub mod dto;
pub mod oidc;
pub mod session;

pub use oidc::{Claims, TokenError, TokenManager, TokenType};
pub use session::{TokenPair, TokenService};
