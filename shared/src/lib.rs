pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use crate::shared::{ApiResponse, AppError, AppResult, ErrorBody, RequestContext};
