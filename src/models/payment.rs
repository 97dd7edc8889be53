//! Payment records backing the revenue analytics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{resolve_event_date, StoredObject};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    DebitCard,
}

/// Wire-side attribute bag for a `revenue_records` object.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentMetadata {
    pub user_id: String,
    #[serde(default)]
    pub amount: f64,
    pub status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub payment_date: Option<String>,
}

/// Validated payment record as consumed by the aggregator.
///
/// `paid_at` being `None` excludes the payment from calendar buckets but
/// not from status-based totals.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentRecord {
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    pub status: PaymentStatus,
    pub method: PaymentMethod,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<StoredObject<PaymentMetadata>> for PaymentRecord {
    fn from(obj: StoredObject<PaymentMetadata>) -> Self {
        let paid_at = resolve_event_date(obj.metadata.payment_date.as_deref(), obj.created_at);
        Self {
            id: obj.id,
            user_id: obj.metadata.user_id,
            amount: obj.metadata.amount,
            status: obj.metadata.status,
            method: obj.metadata.payment_method,
            paid_at,
            created_at: obj.created_at,
        }
    }
}
