use serde::{Deserialize, Serialize};
use shared::AppError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claims carried by both token kinds. Access tokens additionally carry the
/// role names pinned at issue time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    /// User id, duplicated in `user_id` for callers that read the custom claim.
    pub sub: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    pub jti: String,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "tenantId")]
    pub tenant_id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
    #[serde(rename = "mfaVerified", default)]
    pub mfa_verified: bool,
}

impl Claims {
    /// Seconds until expiry, clamped to at least one so a tombstone written
    /// for this token always outlives it.
    pub fn remaining_secs(&self, now: i64) -> u64 {
        (self.exp - now).max(1) as u64
    }
}

/// Verification failures, in the order they are checked.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("token not yet valid")]
    NotYetValid,
    #[error("wrong token type")]
    WrongType,
    #[error("token revoked")]
    Revoked,
    #[error("malformed token: {0}")]
    Malformed(String),
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired => AppError::TokenExpired,
            other => AppError::TokenInvalid(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_maps_to_its_own_code() {
        assert_eq!(AppError::from(TokenError::Expired).code(), "TOKEN_EXPIRED");
        assert_eq!(AppError::from(TokenError::Revoked).code(), "TOKEN_INVALID");
        assert_eq!(
            AppError::from(TokenError::WrongType).code(),
            "TOKEN_INVALID"
        );
    }

    #[test]
    fn token_type_serialises_lowercase() {
        assert_eq!(
            serde_json::to_value(TokenType::Access).unwrap(),
            serde_json::json!("access")
        );
    }
}
