//! User account records and their subscription/status attributes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{resolve_event_date, StoredObject};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionPlan {
    Free,
    Pro,
}

impl std::fmt::Display for SubscriptionPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Pro => write!(f, "pro"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
    Canceled,
}

/// Wire-side attribute bag for a `users` object.
#[derive(Debug, Clone, Deserialize)]
pub struct UserMetadata {
    pub email: String,
    pub subscription_plan: SubscriptionPlan,
    pub status: UserStatus,
    pub signup_date: Option<String>,
    #[serde(default)]
    pub properties_count: u32,
    #[serde(default)]
    pub total_spent: f64,
}

/// Validated user account as consumed by the aggregator.
///
/// `signup_at` is resolved to UTC at the store boundary; `None` marks a
/// malformed signup date (the record still counts toward totals, but
/// matches no calendar bucket).
#[derive(Debug, Clone, Serialize)]
pub struct UserAccount {
    pub id: String,
    pub email: String,
    pub plan: SubscriptionPlan,
    pub status: UserStatus,
    pub properties_count: u32,
    pub total_spent: f64,
    pub signup_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<StoredObject<UserMetadata>> for UserAccount {
    fn from(obj: StoredObject<UserMetadata>) -> Self {
        let signup_at = resolve_event_date(obj.metadata.signup_date.as_deref(), obj.created_at);
        Self {
            id: obj.id,
            email: obj.metadata.email,
            plan: obj.metadata.subscription_plan,
            status: obj.metadata.status,
            properties_count: obj.metadata.properties_count,
            total_spent: obj.metadata.total_spent,
            signup_at,
            created_at: obj.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn stored(metadata: UserMetadata) -> StoredObject<UserMetadata> {
        StoredObject {
            id: "u-1".to_string(),
            metadata,
            created_at: Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn deserializes_wire_metadata() {
        let metadata: UserMetadata = serde_json::from_value(serde_json::json!({
            "email": "jane@example.com",
            "subscription_plan": "pro",
            "status": "active",
            "signup_date": "2024-01-05",
            "properties_count": 3,
            "total_spent": 120.5
        }))
        .unwrap();
        assert_eq!(metadata.subscription_plan, SubscriptionPlan::Pro);
        assert_eq!(metadata.status, UserStatus::Active);
        assert_eq!(metadata.properties_count, 3);
    }

    #[test]
    fn missing_numeric_fields_default_to_zero() {
        let metadata: UserMetadata = serde_json::from_value(serde_json::json!({
            "email": "jane@example.com",
            "subscription_plan": "free",
            "status": "inactive"
        }))
        .unwrap();
        assert_eq!(metadata.properties_count, 0);
        assert_eq!(metadata.total_spent, 0.0);
    }

    #[test]
    fn conversion_parses_signup_date() {
        let account = UserAccount::from(stored(UserMetadata {
            email: "jane@example.com".to_string(),
            subscription_plan: SubscriptionPlan::Free,
            status: UserStatus::Active,
            signup_date: Some("2024-01-05T12:00:00Z".to_string()),
            properties_count: 0,
            total_spent: 0.0,
        }));
        assert_eq!(account.signup_at.unwrap().date_naive().to_string(), "2024-01-05");
    }

    #[test]
    fn conversion_tolerates_malformed_signup_date() {
        let account = UserAccount::from(stored(UserMetadata {
            email: "jane@example.com".to_string(),
            subscription_plan: SubscriptionPlan::Free,
            status: UserStatus::Active,
            signup_date: Some("last tuesday".to_string()),
            properties_count: 0,
            total_spent: 0.0,
        }));
        assert!(account.signup_at.is_none());
    }
}
