pub mod config;
pub mod errors;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

use crate::config::AppConfig;
use crate::store::RecordStore;

/// Shared application state passed to all Axum handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: RecordStore,
    pub config: AppConfig,
}
