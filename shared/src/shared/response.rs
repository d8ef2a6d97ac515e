use serde::Serialize;

use super::error::AppError;

/// Uniform response envelope: `{success, data?, error?}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(err: &AppError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorBody {
                code: err.code().to_string(),
                message: err.to_string(),
                details: None,
            }),
        }
    }

    pub fn error_with_details(err: &AppError, details: serde_json::Value) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorBody {
                code: err.code().to_string(),
                message: err.to_string(),
                details: Some(details),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_omits_error() {
        let body = serde_json::to_value(ApiResponse::ok(serde_json::json!({"id": 1}))).unwrap();
        assert_eq!(body["success"], true);
        assert!(body.get("error").is_none());
    }

    #[test]
    fn error_envelope_carries_code() {
        let err = AppError::NotFound("tenant".to_string());
        let body = serde_json::to_value(ApiResponse::<()>::error(&err)).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }
}
