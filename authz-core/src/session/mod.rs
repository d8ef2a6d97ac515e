pub mod session_index;
pub mod token_service;

pub use session_index::SessionIndex;
pub use token_service::{TokenPair, TokenService};
