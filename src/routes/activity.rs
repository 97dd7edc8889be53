//! Activity route: headline numbers and the recent-activity feed.

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::{ApiResponse, AppError};
use crate::services::activity::{self, ActivityEvent, ActivityMetrics};
use crate::AppState;

/// Query parameters for the activity feed.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<usize>,
}

impl FeedQuery {
    const MAX_LIMIT: usize = 100;
    const DEFAULT_LIMIT: usize = 20;

    fn limit(&self) -> usize {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }
}

/// Payload for the activity page.
#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    pub metrics: ActivityMetrics,
    pub feed: Vec<ActivityEvent>,
}

/// GET /api/v1/activity — activity metrics plus the merged feed.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<ApiResponse<ActivityResponse>>, AppError> {
    let (users, sessions) =
        tokio::try_join!(state.store.fetch_users(), state.store.fetch_sessions())?;
    let as_of = Utc::now();

    Ok(ApiResponse::success(ActivityResponse {
        metrics: activity::activity_metrics(&users, &sessions, as_of),
        feed: activity::recent_activity(&users, &sessions, query.limit()),
    }))
}
