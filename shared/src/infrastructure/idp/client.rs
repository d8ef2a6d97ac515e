use crate::config::IdpConfig;
use crate::shared::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

use super::{IdentityProvider, IdpUser};

#[derive(Debug, Deserialize)]
struct IdpUserBody {
    id: String,
    email: String,
    #[serde(default)]
    mfa_verified: bool,
}

/// REST client for the identity provider. Requests carry the API key plus
/// the tenant and application identity headers; the IdP scopes credentials
/// by those.
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    tenant_id: String,
    application_id: String,
}

impl HttpIdentityProvider {
    pub fn new(config: &IdpConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("idp client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            tenant_id: config.tenant_id.clone(),
            application_id: config.application_id.clone(),
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .header("X-Tenant-Id", &self.tenant_id)
            .header("X-Application-Id", &self.application_id)
    }

    fn transport_err(e: reqwest::Error) -> AppError {
        if e.is_timeout() {
            AppError::BackendUnavailable("auth backend unavailable".to_string())
        } else {
            AppError::BackendUnavailable(format!("idp: {}", e))
        }
    }

    async fn parse_user(response: reqwest::Response) -> AppResult<IdpUser> {
        let body: IdpUserBody = response.json().await.map_err(Self::transport_err)?;
        Ok(IdpUser {
            subject_id: body.id,
            email: body.email,
            mfa_verified: body.mfa_verified,
        })
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn create_user(
        &self,
        email: &str,
        password: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> AppResult<IdpUser> {
        let response = self
            .request(reqwest::Method::POST, "/users")
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "firstName": first_name,
                "lastName": last_name,
            }))
            .send()
            .await
            .map_err(Self::transport_err)?;

        match response.status() {
            StatusCode::CREATED | StatusCode::OK => Self::parse_user(response).await,
            StatusCode::CONFLICT => Err(AppError::UserExists(email.to_string())),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(AppError::Validation("idp rejected the credential".to_string()))
            }
            status => Err(AppError::BackendUnavailable(format!("idp returned {}", status))),
        }
    }

    async fn authenticate(&self, email: &str, password: &str) -> AppResult<IdpUser> {
        let response = self
            .request(reqwest::Method::POST, "/authenticate")
            .json(&serde_json::json!({"email": email, "password": password}))
            .send()
            .await
            .map_err(Self::transport_err)?;

        match response.status() {
            StatusCode::OK => Self::parse_user(response).await,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AppError::InvalidCredentials),
            status => Err(AppError::BackendUnavailable(format!("idp returned {}", status))),
        }
    }

    async fn change_password(
        &self,
        subject_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/users/{}/password", subject_id),
            )
            .json(&serde_json::json!({
                "current": current_password,
                "new": new_password,
            }))
            .send()
            .await
            .map_err(Self::transport_err)?;

        match response.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AppError::InvalidCredentials),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(AppError::Validation("idp rejected the new password".to_string()))
            }
            status => Err(AppError::BackendUnavailable(format!("idp returned {}", status))),
        }
    }

    async fn update_profile(
        &self,
        subject_id: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> AppResult<()> {
        let response = self
            .request(reqwest::Method::PATCH, &format!("/users/{}", subject_id))
            .json(&serde_json::json!({
                "firstName": first_name,
                "lastName": last_name,
            }))
            .send()
            .await
            .map_err(Self::transport_err)?;

        match response.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
            StatusCode::NOT_FOUND => Err(AppError::NotFound("idp user".to_string())),
            status => Err(AppError::BackendUnavailable(format!("idp returned {}", status))),
        }
    }

    async fn delete_user(&self, subject_id: &str) -> AppResult<()> {
        let response = self
            .request(reqwest::Method::DELETE, &format!("/users/{}", subject_id))
            .send()
            .await
            .map_err(Self::transport_err)?;

        match response.status() {
            StatusCode::OK | StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => Ok(()),
            status => Err(AppError::BackendUnavailable(format!("idp returned {}", status))),
        }
    }
}
