pub mod auth_handlers;
pub mod bundle_handlers;
pub mod policy_handlers;
pub mod role_handlers;
pub mod system_handlers;
pub mod tenant_handlers;
pub mod user_handlers;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use shared::{ApiResponse, AppError};

/// Wrap a payload in the uniform envelope.
pub fn success<T: Serialize>(status: StatusCode, data: T) -> Response {
    (status, Json(ApiResponse::ok(data))).into_response()
}

/// Wrap an error in the uniform envelope with its HTTP status.
pub fn failure(err: &AppError) -> Response {
    (status_for(err), Json(ApiResponse::<()>::error(err))).into_response()
}

pub fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::InvalidRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
        AppError::Unauthorized(_)
        | AppError::TokenExpired
        | AppError::TokenInvalid(_)
        | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AppError::Forbidden(_) => StatusCode::FORBIDDEN,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::UserExists(_)
        | AppError::TenantExists(_)
        | AppError::Conflict(_)
        | AppError::BundleActiveCannotDelete => StatusCode::CONFLICT,
        AppError::PolicyValidationFailed(_) | AppError::PolicyTestFailed(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        AppError::BackendUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        AppError::BundleBuildFailed(_)
        | AppError::Database(_)
        | AppError::Serialization(_)
        | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(status_for(&AppError::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_for(&AppError::UserExists("a@x.test".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&AppError::Forbidden("deny".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(status_for(&AppError::RateLimited), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            status_for(&AppError::BackendUnavailable("idp".to_string())),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
