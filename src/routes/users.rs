//! Users route: account list with status and plan statistics.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;

use crate::errors::{ApiResponse, AppError};
use crate::models::user::UserAccount;
use crate::services::analytics::{self, UserMetrics};
use crate::AppState;

/// Payload for the users page.
#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub metrics: UserMetrics,
    pub users: Vec<UserAccount>,
}

/// GET /api/v1/users — all accounts plus the users-page statistics.
pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<UsersResponse>>, AppError> {
    let users = state.store.fetch_users().await?;
    let metrics = analytics::user_metrics(&users, Utc::now());
    Ok(ApiResponse::success(UsersResponse { metrics, users }))
}
