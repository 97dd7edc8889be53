//! Login session records used for activity analytics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{resolve_event_date, StoredObject};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Desktop,
    Mobile,
    Tablet,
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Desktop => write!(f, "desktop"),
            Self::Mobile => write!(f, "mobile"),
            Self::Tablet => write!(f, "tablet"),
        }
    }
}

/// Wire-side attribute bag for a `user_sessions` object.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionMetadata {
    pub user_id: String,
    pub device_type: DeviceType,
    pub login_date: Option<String>,
    pub session_duration: Option<u32>,
    pub ip_address: Option<String>,
}

/// Validated login session as consumed by the aggregator.
///
/// A session's `user_id` may reference an account absent from the fetched
/// batch; consumers must tolerate the dangling reference.
#[derive(Debug, Clone, Serialize)]
pub struct LoginSession {
    pub id: String,
    pub user_id: String,
    pub device: DeviceType,
    pub session_duration_secs: Option<u32>,
    pub ip_address: Option<String>,
    pub login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<StoredObject<SessionMetadata>> for LoginSession {
    fn from(obj: StoredObject<SessionMetadata>) -> Self {
        let login_at = resolve_event_date(obj.metadata.login_date.as_deref(), obj.created_at);
        Self {
            id: obj.id,
            user_id: obj.metadata.user_id,
            device: obj.metadata.device_type,
            session_duration_secs: obj.metadata.session_duration,
            ip_address: obj.metadata.ip_address,
            login_at,
            created_at: obj.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn conversion_falls_back_to_created_at() {
        let created = Utc.with_ymd_and_hms(2024, 2, 1, 16, 30, 0).unwrap();
        let session = LoginSession::from(StoredObject {
            id: "s-1".to_string(),
            metadata: SessionMetadata {
                user_id: "u-1".to_string(),
                device_type: DeviceType::Mobile,
                login_date: None,
                session_duration: Some(540),
                ip_address: None,
            },
            created_at: created,
        });
        assert_eq!(session.login_at, Some(created));
        assert_eq!(session.device, DeviceType::Mobile);
    }

    #[test]
    fn device_type_deserializes_lowercase() {
        let metadata: SessionMetadata = serde_json::from_value(serde_json::json!({
            "user_id": "u-1",
            "device_type": "tablet",
            "login_date": "2024-02-01T08:00:00Z"
        }))
        .unwrap();
        assert_eq!(metadata.device_type, DeviceType::Tablet);
        assert!(metadata.session_duration.is_none());
    }
}
