//! Cache key layout. Every key family lives here so the scan patterns in
//! revocation stay in one place.

use uuid::Uuid;

pub fn session_key(user_id: Uuid, jti: &str) -> String {
    format!("session:{}:{}", user_id, jti)
}

pub fn session_pattern(user_id: Uuid) -> String {
    format!("session:{}:*", user_id)
}

pub fn refresh_key(user_id: Uuid, jti: &str) -> String {
    format!("refresh:{}:{}", user_id, jti)
}

pub fn refresh_pattern(user_id: Uuid) -> String {
    format!("refresh:{}:*", user_id)
}

pub fn blacklist_key(jti: &str) -> String {
    format!("blacklist:{}", jti)
}

pub fn decision_key(
    user_id: Uuid,
    resource_type: &str,
    action: &str,
    resource_id: Option<&str>,
) -> String {
    match resource_id {
        Some(id) => format!("decision:{}:{}:{}:{}", user_id, resource_type, action, id),
        None => format!("decision:{}:{}:{}", user_id, resource_type, action),
    }
}

pub fn decision_pattern(user_id: Uuid) -> String {
    format!("decision:{}:*", user_id)
}

pub fn user_roles_key(user_id: Uuid) -> String {
    format!("roles:{}", user_id)
}

pub fn rate_limit_key(ip: &str, route: &str) -> String {
    format!("ratelimit:{}:{}", ip, route)
}

/// `jti` suffix of a session/refresh index key.
pub fn jti_from_key(key: &str) -> Option<&str> {
    key.rsplit(':').next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_families_round_trip() {
        let user = Uuid::new_v4();
        let key = session_key(user, "abc");
        assert!(key.starts_with("session:"));
        assert_eq!(jti_from_key(&key), Some("abc"));
        assert!(key.starts_with(session_pattern(user).trim_end_matches('*')));
    }

    #[test]
    fn decision_key_omits_missing_resource_id() {
        let user = Uuid::new_v4();
        assert!(!decision_key(user, "tenant", "read", None).ends_with(':'));
        assert!(decision_key(user, "tenant", "read", Some("t1")).ends_with(":t1"));
    }
}
