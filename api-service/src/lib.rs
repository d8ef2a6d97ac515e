pub mod app_state;
pub mod presentation;

pub use app_state::{AppState, Repositories};
pub use presentation::api::routes::build_router;
