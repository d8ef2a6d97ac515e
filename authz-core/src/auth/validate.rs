use regex::Regex;
use shared::{AppError, AppResult};
use std::sync::LazyLock;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

pub fn validate_email(email: &str) -> AppResult<()> {
    if email.len() > 254 || !EMAIL_PATTERN.is_match(email) {
        return Err(AppError::Validation("invalid email address".to_string()));
    }
    Ok(())
}

/// Shape check only; strength policy belongs to the IdP.
pub fn validate_password(password: &str) -> AppResult<()> {
    if password.len() < 8 {
        return Err(AppError::Validation(
            "password must be at least 8 characters".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic())
        || !password.chars().any(|c| c.is_ascii_digit())
    {
        return Err(AppError::Validation(
            "password must contain a letter and a digit".to_string(),
        ));
    }
    Ok(())
}
