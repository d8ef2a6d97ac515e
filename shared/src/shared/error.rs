use thiserror::Error;

/// Error taxonomy surfaced to callers. Every variant maps to a stable code
/// string and an HTTP status at the presentation layer.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    TokenInvalid(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("User already exists: {0}")]
    UserExists(String),

    #[error("Tenant already exists: {0}")]
    TenantExists(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Policy validation failed: {0}")]
    PolicyValidationFailed(String),

    #[error("Policy test failed: {0}")]
    PolicyTestFailed(String),

    #[error("Bundle build failed: {0}")]
    BundleBuildFailed(String),

    #[error("Bundle is active and cannot be deleted")]
    BundleActiveCannotDelete,

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code for the response envelope.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidRequest(_) => "INVALID_REQUEST",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::TokenExpired => "TOKEN_EXPIRED",
            AppError::TokenInvalid(_) => "TOKEN_INVALID",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::UserExists(_) => "USER_EXISTS",
            AppError::TenantExists(_) => "TENANT_EXISTS",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::PolicyValidationFailed(_) => "POLICY_VALIDATION_FAILED",
            AppError::PolicyTestFailed(_) => "POLICY_TEST_FAILED",
            AppError::BundleBuildFailed(_) => "BUNDLE_BUILD_FAILED",
            AppError::BundleActiveCannotDelete => "BUNDLE_ACTIVE_CANNOT_DELETE",
            AppError::RateLimited => "RATE_LIMITED",
            AppError::BackendUnavailable(_) => "BACKEND_UNAVAILABLE",
            AppError::Database(_) | AppError::Serialization(_) | AppError::Internal(_) => {
                "INTERNAL_ERROR"
            }
        }
    }

    /// Log the error with its source location and the operation that failed.
    pub fn log_with_operation(&self, location: &str, operation: &str) {
        match self {
            AppError::Database(_)
            | AppError::Serialization(_)
            | AppError::Internal(_)
            | AppError::BackendUnavailable(_) => {
                tracing::error!(location, operation, error = %self, code = self.code());
            }
            _ => {
                tracing::warn!(location, operation, error = %self, code = self.code());
            }
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Result type alias used throughout the workspace.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(AppError::TokenExpired.code(), "TOKEN_EXPIRED");
        assert_eq!(AppError::InvalidCredentials.code(), "INVALID_CREDENTIALS");
        assert_eq!(
            AppError::Forbidden("denied".to_string()).code(),
            "FORBIDDEN"
        );
        assert_eq!(
            AppError::Internal("boom".to_string()).code(),
            "INTERNAL_ERROR"
        );
    }
}
