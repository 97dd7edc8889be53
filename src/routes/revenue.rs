//! Revenue route: payment list with totals, breakdown, and trend.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;

use crate::errors::{ApiResponse, AppError};
use crate::models::payment::PaymentRecord;
use crate::services::analytics::{self, PaymentBreakdown, RevenueTrend};
use crate::AppState;

/// Window used for the period-over-period comparison.
const TREND_WINDOW_DAYS: u32 = 15;

/// Payload for the revenue page.
#[derive(Debug, Serialize)]
pub struct RevenueResponse {
    pub total_revenue: f64,
    pub monthly_recurring_revenue: f64,
    pub breakdown: PaymentBreakdown,
    pub trend: RevenueTrend,
    pub records: Vec<PaymentRecord>,
}

/// GET /api/v1/revenue — all payment records plus revenue statistics.
pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<RevenueResponse>>, AppError> {
    let payments = state.store.fetch_payments().await?;
    let as_of = Utc::now();

    Ok(ApiResponse::success(RevenueResponse {
        total_revenue: analytics::total_revenue(&payments),
        monthly_recurring_revenue: analytics::monthly_recurring_revenue(&payments, as_of),
        breakdown: analytics::payment_breakdown(&payments),
        trend: analytics::revenue_trend(&payments, TREND_WINDOW_DAYS, as_of),
        records: payments,
    }))
}
