use crate::domain::entities::User;
use crate::shared::AppResult;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: User) -> AppResult<User>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn find_by_external_subject(&self, subject_id: &str) -> AppResult<Option<User>>;
    async fn list_by_tenant(&self, tenant_id: Uuid, limit: i64, offset: i64)
        -> AppResult<Vec<User>>;
    async fn update(&self, user: User) -> AppResult<User>;
    async fn count_by_tenant(&self, tenant_id: Uuid) -> AppResult<i64>;
}
