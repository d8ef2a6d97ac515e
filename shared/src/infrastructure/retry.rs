//! Bounded retry with exponential backoff. Only idempotent reads go
//! through here; writes are never silently retried.

use crate::shared::{AppError, AppResult};
use std::future::Future;
use std::time::Duration;

const MAX_ATTEMPTS: u32 = 3;
const BASE_DELAY: Duration = Duration::from_millis(100);

/// Retry a transient-failing read up to the budget, doubling the delay
/// between attempts. Non-transient errors return immediately.
pub async fn read_with_backoff<T, F, Fut>(operation: &str, mut call: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut delay = BASE_DELAY;
    let mut attempt = 1;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(AppError::BackendUnavailable(cause)) if attempt < MAX_ATTEMPTS => {
                tracing::warn!(
                    operation,
                    attempt,
                    "Transient read failure, retrying: {}",
                    cause
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
