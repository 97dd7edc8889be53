//! End-to-end integration test for the fetch → aggregate → serve pipeline.
//!
//! Spins up a stub record store on a local port serving fixture objects,
//! points the real `RecordStore` client at it, and exercises the full Axum
//! router over HTTP. No external services required.

use std::collections::HashMap;

use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use depositshield::config::AppConfig;
use depositshield::routes::router;
use depositshield::store::RecordStore;
use depositshield::AppState;

/// Serve `app` on a random local port, returning its base URL.
async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}")
}

/// Stub store answering the object API with fixtures; collections not in
/// the map answer 404, which the client must treat as empty.
fn stub_store(fixtures: HashMap<String, Value>) -> Router {
    Router::new().route(
        "/buckets/{bucket}/objects",
        get(move |Query(params): Query<HashMap<String, String>>| {
            let fixtures = fixtures.clone();
            async move {
                let object_type = params
                    .get("query")
                    .and_then(|q| serde_json::from_str::<Value>(q).ok())
                    .and_then(|v| v["type"].as_str().map(str::to_string))
                    .unwrap_or_default();
                let response: Response = match fixtures.get(&object_type) {
                    Some(objects) => Json(json!({ "objects": objects })).into_response(),
                    None => StatusCode::NOT_FOUND.into_response(),
                };
                response
            }
        }),
    )
}

async fn app_against(fixtures: HashMap<String, Value>) -> String {
    let store_url = serve(stub_store(fixtures)).await;
    let config = AppConfig {
        record_store_url: store_url,
        record_store_bucket: "test-bucket".to_string(),
        record_store_read_key: "test-key".to_string(),
        record_store_fetch_limit: 1000,
        host: "127.0.0.1".to_string(),
        port: 0,
        frontend_url: "http://localhost:3000".to_string(),
    };
    let store = RecordStore::new(&config).expect("store client");
    serve(router(AppState { store, config })).await
}

fn fixtures_with_activity() -> HashMap<String, Value> {
    let today = Utc::now().date_naive();
    let last_month = today - Duration::days(45);

    let users = json!([
        {
            "id": "u-1",
            "created_at": format!("{today}T08:00:00Z"),
            "metadata": {
                "email": "pro@example.com",
                "subscription_plan": "pro",
                "status": "active",
                "signup_date": format!("{today}T08:00:00Z"),
                "properties_count": 2,
                "total_spent": 10.0
            }
        },
        {
            "id": "u-2",
            "created_at": format!("{last_month}T08:00:00Z"),
            "metadata": {
                "email": "free@example.com",
                "subscription_plan": "free",
                "status": "inactive",
                "signup_date": format!("{last_month}T08:00:00Z")
            }
        },
        // Malformed object: no metadata. Must be skipped, not fatal.
        { "id": "u-bad", "created_at": format!("{today}T08:00:00Z") }
    ]);

    let sessions = json!([
        {
            "id": "s-1",
            "created_at": format!("{today}T09:00:00Z"),
            "metadata": {
                "user_id": "u-1",
                "device_type": "desktop",
                "login_date": format!("{today}T09:00:00Z"),
                "session_duration": 600
            }
        },
        {
            "id": "s-2",
            "created_at": format!("{today}T10:00:00Z"),
            "metadata": {
                "user_id": "ghost",
                "device_type": "mobile",
                "login_date": format!("{today}T10:00:00Z")
            }
        }
    ]);

    let payments = json!([
        {
            "id": "p-1",
            "created_at": format!("{today}T09:30:00Z"),
            "metadata": {
                "user_id": "u-1",
                "amount": 5.0,
                "status": "paid",
                "payment_method": "credit_card",
                "payment_date": format!("{today}T09:30:00Z")
            }
        },
        {
            "id": "p-2",
            "created_at": format!("{today}T09:45:00Z"),
            "metadata": {
                "user_id": "u-1",
                "amount": 99.0,
                "status": "failed",
                "payment_method": "debit_card",
                "payment_date": format!("{today}T09:45:00Z")
            }
        }
    ]);

    HashMap::from([
        ("users".to_string(), users),
        ("user_sessions".to_string(), sessions),
        ("revenue_records".to_string(), payments),
    ])
}

#[tokio::test]
async fn dashboard_aggregates_fixture_snapshot() {
    let base = app_against(fixtures_with_activity()).await;

    let body: Value = reqwest::get(format!("{base}/api/v1/dashboard"))
        .await
        .expect("request")
        .json()
        .await
        .expect("json body");

    assert!(body["error"].is_null());
    let metrics = &body["data"]["metrics"];
    // The malformed user object is skipped at the store boundary.
    assert_eq!(metrics["total_users"], 2);
    assert_eq!(metrics["new_users_today"], 1);
    assert_eq!(metrics["free_users"], 1);
    assert_eq!(metrics["pro_users"], 1);
    assert_eq!(metrics["conversion_rate"], 50.0);
    assert_eq!(metrics["total_revenue"], 5.0);
    assert_eq!(metrics["monthly_recurring_revenue"], 5.0);
    assert_eq!(metrics["total_logins"], 2);
    // Both sessions are in the trailing window; the ghost user still counts.
    assert_eq!(metrics["active_users"], 2);

    let cards = body["data"]["cards"].as_array().expect("cards array");
    assert_eq!(cards.len(), 4);
    assert_eq!(cards[1]["value"], "$5");

    let growth = body["data"]["user_growth"].as_array().expect("growth");
    assert_eq!(growth.len(), 30);
    assert_eq!(growth.last().expect("last point")["total_users"], 2);
}

#[tokio::test]
async fn series_endpoints_honor_days_and_shape() {
    let base = app_against(fixtures_with_activity()).await;

    let growth: Value = reqwest::get(format!("{base}/api/v1/analytics/user-growth?days=7"))
        .await
        .expect("request")
        .json()
        .await
        .expect("json body");
    assert_eq!(growth["data"].as_array().expect("series").len(), 7);

    let hourly: Value = reqwest::get(format!("{base}/api/v1/analytics/hourly-activity"))
        .await
        .expect("request")
        .json()
        .await
        .expect("json body");
    let histogram = hourly["data"].as_array().expect("histogram");
    assert_eq!(histogram.len(), 24);
    let total: u64 = histogram.iter().filter_map(Value::as_u64).sum();
    assert_eq!(total, 2);
}

#[tokio::test]
async fn activity_feed_tolerates_dangling_user_reference() {
    let base = app_against(fixtures_with_activity()).await;

    let body: Value = reqwest::get(format!("{base}/api/v1/activity?limit=2"))
        .await
        .expect("request")
        .json()
        .await
        .expect("json body");

    let feed = body["data"]["feed"].as_array().expect("feed");
    assert_eq!(feed.len(), 2);
    // Newest first: the ghost login at 10:00 precedes the u-1 login at 09:00.
    assert_eq!(feed[0]["user_email"], "unknown");
    assert_eq!(body["data"]["metrics"]["unique_active_users"], 2);
}

#[tokio::test]
async fn absent_collections_yield_zeroed_dashboard() {
    // Store with no collections at all: every fetch answers 404.
    let base = app_against(HashMap::new()).await;

    let body: Value = reqwest::get(format!("{base}/api/v1/dashboard"))
        .await
        .expect("request")
        .json()
        .await
        .expect("json body");

    assert!(body["error"].is_null());
    let metrics = &body["data"]["metrics"];
    assert_eq!(metrics["total_users"], 0);
    assert_eq!(metrics["conversion_rate"], 0.0);
    assert_eq!(metrics["total_revenue"], 0.0);
    assert_eq!(metrics["active_users"], 0);
}

#[tokio::test]
async fn readiness_reports_store_connectivity() {
    let base = app_against(HashMap::new()).await;

    let live = reqwest::get(format!("{base}/health/live"))
        .await
        .expect("request");
    assert_eq!(live.status(), StatusCode::OK);

    let ready: Value = reqwest::get(format!("{base}/health/ready"))
        .await
        .expect("request")
        .json()
        .await
        .expect("json body");
    assert_eq!(ready["data"]["record_store"], "connected");
}
