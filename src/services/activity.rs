//! Recent-activity feed and activity-page metrics.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::session::LoginSession;
use crate::models::user::UserAccount;

const UNKNOWN_USER: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Login,
    Registration,
}

/// One row in the recent-activity feed.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityEvent {
    pub kind: ActivityKind,
    pub user_email: String,
    pub occurred_at: DateTime<Utc>,
    pub detail: String,
    pub ip_address: Option<String>,
}

/// Merge login and registration events into one feed, newest first,
/// truncated to `limit`.
///
/// A session may reference a user absent from the fetched batch; such
/// entries keep an "unknown" email instead of failing.
pub fn recent_activity(
    users: &[UserAccount],
    sessions: &[LoginSession],
    limit: usize,
) -> Vec<ActivityEvent> {
    let emails: HashMap<&str, &str> = users
        .iter()
        .map(|u| (u.id.as_str(), u.email.as_str()))
        .collect();

    let mut events = Vec::with_capacity(users.len() + sessions.len());
    for session in sessions {
        let Some(occurred_at) = session.login_at else {
            continue;
        };
        events.push(ActivityEvent {
            kind: ActivityKind::Login,
            user_email: emails
                .get(session.user_id.as_str())
                .copied()
                .unwrap_or(UNKNOWN_USER)
                .to_string(),
            occurred_at,
            detail: format!("Logged in from a {} device", session.device),
            ip_address: session.ip_address.clone(),
        });
    }
    for user in users {
        let Some(occurred_at) = user.signup_at else {
            continue;
        };
        events.push(ActivityEvent {
            kind: ActivityKind::Registration,
            user_email: user.email.clone(),
            occurred_at,
            detail: format!("Signed up for the {} plan", user.plan),
            ip_address: None,
        });
    }

    events.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
    events.truncate(limit);
    events
}

/// Headline numbers for the activity page.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityMetrics {
    pub total_activities: u64,
    pub activities_today: u64,
    pub unique_active_users: u64,
    pub avg_session_duration_secs: f64,
}

pub fn activity_metrics(
    users: &[UserAccount],
    sessions: &[LoginSession],
    as_of: DateTime<Utc>,
) -> ActivityMetrics {
    let today = as_of.date_naive();
    let activities_today = sessions
        .iter()
        .filter(|s| s.login_at.is_some_and(|d| d.date_naive() == today))
        .count() as u64;
    let unique_active_users = sessions
        .iter()
        .map(|s| s.user_id.as_str())
        .collect::<HashSet<_>>()
        .len() as u64;
    let avg_session_duration_secs = if sessions.is_empty() {
        0.0
    } else {
        sessions
            .iter()
            .map(|s| f64::from(s.session_duration_secs.unwrap_or(0)))
            .sum::<f64>()
            / sessions.len() as f64
    };

    ActivityMetrics {
        total_activities: (sessions.len() + users.len()) as u64,
        activities_today,
        unique_active_users,
        avg_session_duration_secs,
    }
}
