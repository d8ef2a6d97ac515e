pub mod error;
pub mod request_context;
pub mod response;

pub use error::{AppError, AppResult};
pub use request_context::RequestContext;
pub use response::{ApiResponse, ErrorBody};
