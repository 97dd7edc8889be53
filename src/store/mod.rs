//! HTTP client for the external headless record store.
//!
//! The store owns all three collections; this client only reads snapshots.
//! An absent collection surfaces as HTTP 404 and resolves to an empty
//! vector — only transport, authorization, and server failures become
//! errors. Individual objects that fail validation are logged and skipped
//! so a single corrupt record never blanks a whole report.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::payment::{PaymentMetadata, PaymentRecord};
use crate::models::session::{LoginSession, SessionMetadata};
use crate::models::user::{UserAccount, UserMetadata};
use crate::models::StoredObject;

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Read-only client for the record store's object API.
#[derive(Debug, Clone)]
pub struct RecordStore {
    http: reqwest::Client,
    objects_url: reqwest::Url,
    read_key: String,
    fetch_limit: u32,
}

/// One fresh read of all three collections.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub users: Vec<UserAccount>,
    pub sessions: Vec<LoginSession>,
    pub payments: Vec<PaymentRecord>,
}

/// Wire envelope for object list responses.
#[derive(Debug, Deserialize)]
struct ObjectsEnvelope {
    #[serde(default)]
    objects: Vec<serde_json::Value>,
}

impl RecordStore {
    /// Build a client from the explicit application configuration.
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        let objects_url = format!(
            "{}/buckets/{}/objects",
            config.record_store_url.trim_end_matches('/'),
            config.record_store_bucket
        )
        .parse()
        .map_err(|e| AppError::Config(format!("invalid record store URL: {e}")))?;
        Ok(Self {
            http,
            objects_url,
            read_key: config.record_store_read_key.clone(),
            fetch_limit: config.record_store_fetch_limit,
        })
    }

    pub async fn fetch_users(&self) -> Result<Vec<UserAccount>, AppError> {
        let objects = self.fetch_collection("users").await?;
        Ok(decode_objects::<UserMetadata>(objects, "users")
            .map(UserAccount::from)
            .collect())
    }

    pub async fn fetch_sessions(&self) -> Result<Vec<LoginSession>, AppError> {
        let objects = self.fetch_collection("user_sessions").await?;
        Ok(decode_objects::<SessionMetadata>(objects, "user_sessions")
            .map(LoginSession::from)
            .collect())
    }

    pub async fn fetch_payments(&self) -> Result<Vec<PaymentRecord>, AppError> {
        let objects = self.fetch_collection("revenue_records").await?;
        Ok(decode_objects::<PaymentMetadata>(objects, "revenue_records")
            .map(PaymentRecord::from)
            .collect())
    }

    /// Fetch all three collections concurrently.
    pub async fn fetch_snapshot(&self) -> Result<Snapshot, AppError> {
        let (users, sessions, payments) = tokio::try_join!(
            self.fetch_users(),
            self.fetch_sessions(),
            self.fetch_payments(),
        )?;
        Ok(Snapshot {
            users,
            sessions,
            payments,
        })
    }

    /// Cheap reachability probe for the readiness endpoint.
    pub async fn ping(&self) -> Result<(), AppError> {
        let response = self
            .http
            .get(self.objects_url.clone())
            .query(&[("read_key", self.read_key.as_str()), ("limit", "1")])
            .send()
            .await?;
        // An empty bucket answers 404 but is still reachable.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        response.error_for_status()?;
        Ok(())
    }

    async fn fetch_collection(
        &self,
        object_type: &str,
    ) -> Result<Vec<serde_json::Value>, AppError> {
        let query = serde_json::json!({ "type": object_type }).to_string();
        let limit = self.fetch_limit.to_string();
        let response = self
            .http
            .get(self.objects_url.clone())
            .query(&[
                ("read_key", self.read_key.as_str()),
                ("query", query.as_str()),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(object_type, "Collection absent, treating as empty");
            return Ok(Vec::new());
        }

        let envelope: ObjectsEnvelope = response.error_for_status()?.json().await?;
        tracing::debug!(object_type, count = envelope.objects.len(), "Fetched collection");
        Ok(envelope.objects)
    }
}

/// Decode raw objects one at a time, skipping (and logging) records that
/// fail validation.
fn decode_objects<M: DeserializeOwned>(
    objects: Vec<serde_json::Value>,
    object_type: &str,
) -> impl Iterator<Item = StoredObject<M>> + '_ {
    objects.into_iter().filter_map(move |value| {
        match serde_json::from_value::<StoredObject<M>>(value) {
            Ok(object) => Some(object),
            Err(e) => {
                tracing::warn!(object_type, error = %e, "Skipping malformed record");
                None
            }
        }
    })
}
