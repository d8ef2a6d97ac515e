use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub email: String,
    /// The IdP's handle for this user.
    pub external_subject_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub metadata: serde_json::Value,
    pub login_count: i64,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(
        tenant_id: Uuid,
        email: String,
        external_subject_id: String,
        first_name: Option<String>,
        last_name: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            email,
            external_subject_id,
            first_name,
            last_name,
            metadata: serde_json::json!({}),
            login_count: 0,
            last_login_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn record_login(&mut self) {
        self.login_count += 1;
        self.last_login_at = Some(Utc::now());
        self.updated_at = Utc::now();
    }

    pub fn mark_deleted(&mut self) {
        self.deleted_at = Some(Utc::now());
        self.updated_at = Utc::now();
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_login_increments_count() {
        let mut user = User::new(
            Uuid::new_v4(),
            "a@x.test".to_string(),
            "idp-1".to_string(),
            Some("A".to_string()),
            Some("X".to_string()),
        );
        assert_eq!(user.login_count, 0);
        user.record_login();
        user.record_login();
        assert_eq!(user.login_count, 2);
        assert!(user.last_login_at.is_some());
    }
}
