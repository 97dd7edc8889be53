//! Route definitions for the DepositShield admin API.

pub mod activity;
pub mod analytics;
pub mod dashboard;
pub mod health;
pub mod revenue;
pub mod users;

use axum::http::HeaderValue;
use axum::routing::get;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Build the application router with tracing, compression, and CORS
/// restricted to the configured frontend origin.
pub fn router(state: AppState) -> Router {
    let cors = match state.config.frontend_url.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new().allow_origin(origin),
        Err(_) => {
            tracing::warn!(
                frontend_url = %state.config.frontend_url,
                "Invalid frontend URL, falling back to permissive CORS"
            );
            CorsLayer::permissive()
        }
    };

    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .route("/api/v1/dashboard", get(dashboard::overview))
        .route("/api/v1/analytics/user-growth", get(analytics::user_growth))
        .route("/api/v1/analytics/revenue", get(analytics::revenue))
        .route("/api/v1/analytics/activity", get(analytics::activity))
        .route(
            "/api/v1/analytics/hourly-activity",
            get(analytics::hourly_activity),
        )
        .route("/api/v1/analytics/overview", get(analytics::overview))
        .route("/api/v1/users", get(users::list))
        .route("/api/v1/revenue", get(revenue::list))
        .route("/api/v1/activity", get(activity::list))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
        .with_state(state)
}
