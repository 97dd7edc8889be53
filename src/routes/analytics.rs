//! Analytics routes: chart series and distribution breakdowns.

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::{ApiResponse, AppError};
use crate::services::analytics::{
    self, ActivityPoint, DeviceBreakdown, EngagementMetrics, GrowthPoint, RevenuePoint,
    UserMetrics, DEFAULT_SERIES_DAYS,
};
use crate::AppState;

/// Query parameters for the series endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct SeriesQuery {
    pub days: Option<u32>,
}

impl SeriesQuery {
    /// Longest chart window the UI may request.
    const MAX_DAYS: u32 = 365;

    fn days(&self) -> u32 {
        self.days
            .unwrap_or(DEFAULT_SERIES_DAYS)
            .clamp(1, Self::MAX_DAYS)
    }
}

/// GET /api/v1/analytics/user-growth — daily signups and running totals.
pub async fn user_growth(
    State(state): State<AppState>,
    Query(query): Query<SeriesQuery>,
) -> Result<Json<ApiResponse<Vec<GrowthPoint>>>, AppError> {
    let users = state.store.fetch_users().await?;
    Ok(ApiResponse::success(analytics::user_growth_series(
        &users,
        query.days(),
        Utc::now(),
    )))
}

/// GET /api/v1/analytics/revenue — daily paid revenue and running totals.
pub async fn revenue(
    State(state): State<AppState>,
    Query(query): Query<SeriesQuery>,
) -> Result<Json<ApiResponse<Vec<RevenuePoint>>>, AppError> {
    let payments = state.store.fetch_payments().await?;
    Ok(ApiResponse::success(analytics::revenue_series(
        &payments,
        query.days(),
        Utc::now(),
    )))
}

/// GET /api/v1/analytics/activity — daily logins and registrations.
pub async fn activity(
    State(state): State<AppState>,
    Query(query): Query<SeriesQuery>,
) -> Result<Json<ApiResponse<Vec<ActivityPoint>>>, AppError> {
    let (users, sessions) =
        tokio::try_join!(state.store.fetch_users(), state.store.fetch_sessions())?;
    Ok(ApiResponse::success(analytics::activity_series(
        &users,
        &sessions,
        query.days(),
        Utc::now(),
    )))
}

/// GET /api/v1/analytics/hourly-activity — hour-of-day login histogram.
pub async fn hourly_activity(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<u64>>>, AppError> {
    let sessions = state.store.fetch_sessions().await?;
    let histogram = analytics::hourly_activity_histogram(&sessions);
    Ok(ApiResponse::success(histogram.to_vec()))
}

/// Distribution and engagement payload for the analytics page.
#[derive(Debug, Serialize)]
pub struct AnalyticsOverview {
    pub engagement: EngagementMetrics,
    pub devices: DeviceBreakdown,
    pub users: UserMetrics,
}

/// GET /api/v1/analytics/overview — engagement averages plus subscription,
/// device, and status distributions.
pub async fn overview(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<AnalyticsOverview>>, AppError> {
    let snapshot = state.store.fetch_snapshot().await?;
    Ok(ApiResponse::success(AnalyticsOverview {
        engagement: analytics::engagement_metrics(
            &snapshot.users,
            &snapshot.sessions,
            &snapshot.payments,
        ),
        devices: analytics::device_breakdown(&snapshot.sessions),
        users: analytics::user_metrics(&snapshot.users, Utc::now()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_query_defaults_and_clamps() {
        assert_eq!(SeriesQuery { days: None }.days(), 30);
        assert_eq!(SeriesQuery { days: Some(0) }.days(), 1);
        assert_eq!(SeriesQuery { days: Some(90) }.days(), 90);
        assert_eq!(SeriesQuery { days: Some(10_000) }.days(), 365);
    }
}
