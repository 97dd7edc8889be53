use std::env;

/// Application configuration loaded once at startup.
///
/// The record store client receives this struct explicitly; nothing in the
/// crate reads the process environment after `from_env` returns.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub record_store_url: String,
    pub record_store_bucket: String,
    pub record_store_read_key: String,
    pub record_store_fetch_limit: u32,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            record_store_url: env::var("RECORD_STORE_URL")
                .unwrap_or_else(|_| "https://api.cosmicjs.com/v3".to_string()),
            record_store_bucket: env::var("RECORD_STORE_BUCKET")?,
            record_store_read_key: env::var("RECORD_STORE_READ_KEY")?,
            record_store_fetch_limit: env::var("RECORD_STORE_FETCH_LIMIT")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap_or(1000),
            host: env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("BACKEND_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        })
    }
}
