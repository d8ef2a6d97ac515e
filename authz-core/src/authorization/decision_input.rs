use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use serde::Serialize;

/// The record submitted to the engine for a single evaluation. Everything
/// here is assembled server-side; callers cannot influence the pinned role
/// and permission lists or the resource coordinates.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionInput {
    pub user: UserInput,
    pub resource: ResourceInput,
    pub action: String,
    pub time: TimeInput,
    pub context: ContextInput,
    pub tenant: TenantInput,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    pub id: String,
    pub email: String,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
    pub tenant_id: String,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceInput {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeInput {
    pub timestamp: String,
    pub day_of_week: String,
    pub hour: u32,
    pub minute: u32,
    pub is_weekend: bool,
    pub is_business_hours: bool,
}

impl TimeInput {
    pub fn from_datetime(now: DateTime<Utc>) -> Self {
        let weekday = now.weekday();
        let is_weekend = matches!(weekday, Weekday::Sat | Weekday::Sun);
        let hour = now.hour();
        Self {
            timestamp: now.to_rfc3339(),
            day_of_week: weekday_name(weekday).to_string(),
            hour,
            minute: now.minute(),
            is_weekend,
            is_business_hours: !is_weekend && (9..18).contains(&hour),
        }
    }
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    pub method: String,
    pub path: String,
    pub mfa_verified: bool,
    /// Seconds since the access token was issued.
    pub session_age: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantInput {
    pub id: String,
    pub slug: String,
    pub status: String,
    pub settings: serde_json::Value,
}
