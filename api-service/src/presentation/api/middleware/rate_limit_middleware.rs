use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use shared::infrastructure::cache::keys;
use shared::AppError;
use std::sync::Arc;
use std::time::Duration;

use crate::app_state::AppState;
use crate::presentation::api::handlers::failure;

const WINDOW: Duration = Duration::from_secs(60);

/// Per-(ip, route) ceiling over a one-minute tumbling window. A broken
/// counter store never takes the API down; the request passes with a
/// warning.
pub async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let ip = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.split(',').next())
        .map(|ip| ip.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let route = request.uri().path().to_string();

    let key = keys::rate_limit_key(&ip, &route);
    match state.cache.incr_window(&key, WINDOW).await {
        Ok(count) if count > state.settings.server.rate_limit_per_minute as i64 => {
            Err(failure(&AppError::RateLimited))
        }
        Ok(_) => Ok(next.run(request).await),
        Err(e) => {
            tracing::warn!("Rate limit counter unavailable: {}", e);
            Ok(next.run(request).await)
        }
    }
}
