//! Dashboard route: headline metrics, cards, and 30-day series.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;

use crate::errors::{ApiResponse, AppError};
use crate::services::analytics::{
    self, DashboardMetrics, GrowthPoint, MetricCard, RevenuePoint, DEFAULT_SERIES_DAYS,
};
use crate::AppState;

/// Payload for the dashboard page.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub metrics: DashboardMetrics,
    pub cards: Vec<MetricCard>,
    pub user_growth: Vec<GrowthPoint>,
    pub revenue: Vec<RevenuePoint>,
}

/// GET /api/v1/dashboard — everything the dashboard page renders.
pub async fn overview(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardResponse>>, AppError> {
    let snapshot = state.store.fetch_snapshot().await?;
    let as_of = Utc::now();

    let metrics = analytics::dashboard_metrics(
        &snapshot.users,
        &snapshot.sessions,
        &snapshot.payments,
        as_of,
    );
    let cards = analytics::summary_cards(&metrics);
    let user_growth = analytics::user_growth_series(&snapshot.users, DEFAULT_SERIES_DAYS, as_of);
    let revenue = analytics::revenue_series(&snapshot.payments, DEFAULT_SERIES_DAYS, as_of);

    Ok(ApiResponse::success(DashboardResponse {
        metrics,
        cards,
        user_growth,
        revenue,
    }))
}
