pub mod client;

pub use client::HttpIdentityProvider;

use crate::shared::AppResult;
use async_trait::async_trait;

/// The IdP's view of a credential holder.
#[derive(Debug, Clone)]
pub struct IdpUser {
    pub subject_id: String,
    pub email: String,
    /// Whether the IdP has verified a second factor for this session.
    pub mfa_verified: bool,
}

/// Operations Heimdall delegates to the external identity provider. Every
/// call is tagged with the configured tenant/application identity by the
/// implementation; the core never handles raw credentials beyond pass-through.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn create_user(
        &self,
        email: &str,
        password: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> AppResult<IdpUser>;

    async fn authenticate(&self, email: &str, password: &str) -> AppResult<IdpUser>;

    async fn change_password(
        &self,
        subject_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()>;

    async fn update_profile(
        &self,
        subject_id: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> AppResult<()>;

    async fn delete_user(&self, subject_id: &str) -> AppResult<()>;
}
