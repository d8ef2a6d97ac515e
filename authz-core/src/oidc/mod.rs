pub mod claims;
pub mod token_manager;

pub use claims::{Claims, TokenError, TokenType};
pub use token_manager::{SignedToken, TokenManager};
