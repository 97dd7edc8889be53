//! Pure aggregation core turning record snapshots into dashboard metrics
//! and chart-ready time series.
//!
//! Conventions fixed here, and rendered as-is by the admin UI:
//! - All calendar bucketing is UTC.
//! - Monthly recurring revenue is the sum of paid amounts dated within the
//!   current calendar month.
//! - "Active users" are distinct users with a login in the trailing
//!   30 days.
//! - Cumulative series carry pre-window totals instead of resetting at the
//!   window edge.
//!
//! Every function is total: empty inputs produce zeroed results, records
//! with unresolvable dates match no bucket, and rates are always finite.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};
use serde::Serialize;

use crate::models::payment::{PaymentRecord, PaymentStatus};
use crate::models::session::{DeviceType, LoginSession};
use crate::models::user::{SubscriptionPlan, UserAccount, UserStatus};
use crate::services::format::{format_count, format_currency, format_growth_percent};

/// Trailing window defining an "active" user.
pub const ACTIVE_USER_WINDOW_DAYS: i64 = 30;

/// Default length of chart series.
pub const DEFAULT_SERIES_DAYS: u32 = 30;

/// Scalar metrics for the main dashboard page.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardMetrics {
    pub total_users: u64,
    pub new_users_today: u64,
    pub new_users_this_month: u64,
    pub free_users: u64,
    pub pro_users: u64,
    pub conversion_rate: f64,
    pub total_revenue: f64,
    pub monthly_recurring_revenue: f64,
    pub total_logins: u64,
    pub active_users: u64,
}

/// Compute the dashboard headline metrics as of a reference instant.
///
/// `as_of` is injectable so calendar-relative figures are deterministic
/// under test; callers pass `Utc::now()`.
pub fn dashboard_metrics(
    users: &[UserAccount],
    sessions: &[LoginSession],
    payments: &[PaymentRecord],
    as_of: DateTime<Utc>,
) -> DashboardMetrics {
    let today = as_of.date_naive();
    let month_start = today.with_day(1).unwrap_or(today);

    let total_users = users.len() as u64;
    let new_users_today = users
        .iter()
        .filter(|u| u.signup_at.is_some_and(|d| d.date_naive() == today))
        .count() as u64;
    let new_users_this_month = users
        .iter()
        .filter(|u| u.signup_at.is_some_and(|d| d.date_naive() >= month_start))
        .count() as u64;
    let free_users = users
        .iter()
        .filter(|u| u.plan == SubscriptionPlan::Free)
        .count() as u64;
    let pro_users = users
        .iter()
        .filter(|u| u.plan == SubscriptionPlan::Pro)
        .count() as u64;
    let conversion_rate = if total_users > 0 {
        pro_users as f64 / total_users as f64 * 100.0
    } else {
        0.0
    };

    let window_start = as_of - Duration::days(ACTIVE_USER_WINDOW_DAYS);
    let active_users = sessions
        .iter()
        .filter(|s| s.login_at.is_some_and(|d| d > window_start && d <= as_of))
        .map(|s| s.user_id.as_str())
        .collect::<HashSet<_>>()
        .len() as u64;

    DashboardMetrics {
        total_users,
        new_users_today,
        new_users_this_month,
        free_users,
        pro_users,
        conversion_rate,
        total_revenue: total_revenue(payments),
        monthly_recurring_revenue: monthly_recurring_revenue(payments, as_of),
        total_logins: sessions.len() as u64,
        active_users,
    }
}

/// All-time collected revenue: the sum of paid amounts. Payment-date
/// validity is irrelevant here; only the status gates inclusion.
pub fn total_revenue(payments: &[PaymentRecord]) -> f64 {
    payments
        .iter()
        .filter(|p| p.status == PaymentStatus::Paid)
        .map(|p| p.amount)
        .sum()
}

/// Monthly recurring revenue: paid amounts dated within `as_of`'s calendar
/// month.
pub fn monthly_recurring_revenue(payments: &[PaymentRecord], as_of: DateTime<Utc>) -> f64 {
    let today = as_of.date_naive();
    payments
        .iter()
        .filter(|p| p.status == PaymentStatus::Paid)
        .filter(|p| {
            p.paid_at.is_some_and(|d| {
                let date = d.date_naive();
                date.year() == today.year() && date.month() == today.month()
            })
        })
        .map(|p| p.amount)
        .sum()
}

/// One calendar-day slot in a time series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub count: u64,
}

/// Bucket records into the `days` consecutive calendar days ending at
/// `as_of` inclusive, in ascending order, zero-filling empty days.
///
/// A record lands in the bucket matching its resolved date, ignoring
/// time-of-day; records whose date resolves to `None` or falls outside the
/// window match no bucket.
pub fn bucket_by_day<T>(
    records: &[T],
    date_of: impl Fn(&T) -> Option<DateTime<Utc>>,
    days: u32,
    as_of: DateTime<Utc>,
) -> Vec<DayBucket> {
    let days = days.max(1) as usize;
    let end = as_of.date_naive();
    let start = end - Duration::days(days as i64 - 1);

    let mut counts = vec![0u64; days];
    for record in records {
        let Some(date) = date_of(record).map(|d| d.date_naive()) else {
            continue;
        };
        if date < start || date > end {
            continue;
        }
        counts[(date - start).num_days() as usize] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(offset, count)| DayBucket {
            date: start + Duration::days(offset as i64),
            count,
        })
        .collect()
}

/// One day of the user growth series.
#[derive(Debug, Clone, Serialize)]
pub struct GrowthPoint {
    pub date: NaiveDate,
    pub signups: u64,
    pub total_users: u64,
}

/// Daily signups with a true running total.
///
/// The cumulative count is seeded with signups strictly before the window
/// start, so the series never resets to zero at the window edge.
pub fn user_growth_series(
    users: &[UserAccount],
    days: u32,
    as_of: DateTime<Utc>,
) -> Vec<GrowthPoint> {
    let buckets = bucket_by_day(users, |u| u.signup_at, days, as_of);
    let Some(window_start) = buckets.first().map(|b| b.date) else {
        return Vec::new();
    };

    let mut total = users
        .iter()
        .filter(|u| u.signup_at.is_some_and(|d| d.date_naive() < window_start))
        .count() as u64;

    buckets
        .into_iter()
        .map(|b| {
            total += b.count;
            GrowthPoint {
                date: b.date,
                signups: b.count,
                total_users: total,
            }
        })
        .collect()
}

/// One day of the revenue series.
#[derive(Debug, Clone, Serialize)]
pub struct RevenuePoint {
    pub date: NaiveDate,
    pub revenue: f64,
    pub cumulative_revenue: f64,
}

/// Daily paid revenue plus running recognized revenue.
///
/// Only `Paid` payments contribute. The cumulative figure carries all paid
/// revenue dated before the window start.
pub fn revenue_series(
    payments: &[PaymentRecord],
    days: u32,
    as_of: DateTime<Utc>,
) -> Vec<RevenuePoint> {
    let days = days.max(1) as usize;
    let end = as_of.date_naive();
    let start = end - Duration::days(days as i64 - 1);

    let mut daily = vec![0f64; days];
    let mut carried = 0f64;
    for payment in payments.iter().filter(|p| p.status == PaymentStatus::Paid) {
        let Some(date) = payment.paid_at.map(|d| d.date_naive()) else {
            continue;
        };
        if date < start {
            carried += payment.amount;
        } else if date <= end {
            daily[(date - start).num_days() as usize] += payment.amount;
        }
    }

    let mut cumulative = carried;
    daily
        .into_iter()
        .enumerate()
        .map(|(offset, revenue)| {
            cumulative += revenue;
            RevenuePoint {
                date: start + Duration::days(offset as i64),
                revenue,
                cumulative_revenue: cumulative,
            }
        })
        .collect()
}

/// One day of the combined activity series.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityPoint {
    pub date: NaiveDate,
    pub logins: u64,
    pub registrations: u64,
    pub total: u64,
}

/// Daily logins and registrations with their sum.
pub fn activity_series(
    users: &[UserAccount],
    sessions: &[LoginSession],
    days: u32,
    as_of: DateTime<Utc>,
) -> Vec<ActivityPoint> {
    let logins = bucket_by_day(sessions, |s| s.login_at, days, as_of);
    let registrations = bucket_by_day(users, |u| u.signup_at, days, as_of);

    logins
        .into_iter()
        .zip(registrations)
        .map(|(l, r)| ActivityPoint {
            date: l.date,
            logins: l.count,
            registrations: r.count,
            total: l.count + r.count,
        })
        .collect()
}

/// Hour-of-day login histogram over all sessions, irrespective of calendar
/// date. Slot 0 is midnight UTC.
pub fn hourly_activity_histogram(sessions: &[LoginSession]) -> [u64; 24] {
    let mut histogram = [0u64; 24];
    for session in sessions {
        if let Some(login_at) = session.login_at {
            histogram[login_at.hour() as usize] += 1;
        }
    }
    histogram
}

/// Status and plan partition of the user base, for the users page.
///
/// `active_users` here is status-based, unlike the session-based figure in
/// [`DashboardMetrics`].
#[derive(Debug, Clone, Serialize)]
pub struct UserMetrics {
    pub total_users: u64,
    pub active_users: u64,
    pub inactive_users: u64,
    pub canceled_users: u64,
    pub free_users: u64,
    pub pro_users: u64,
    pub new_users_this_month: u64,
    pub conversion_rate: f64,
}

pub fn user_metrics(users: &[UserAccount], as_of: DateTime<Utc>) -> UserMetrics {
    let today = as_of.date_naive();
    let month_start = today.with_day(1).unwrap_or(today);

    let total_users = users.len() as u64;
    let count_status =
        |status: UserStatus| users.iter().filter(|u| u.status == status).count() as u64;
    let pro_users = users
        .iter()
        .filter(|u| u.plan == SubscriptionPlan::Pro)
        .count() as u64;

    UserMetrics {
        total_users,
        active_users: count_status(UserStatus::Active),
        inactive_users: count_status(UserStatus::Inactive),
        canceled_users: count_status(UserStatus::Canceled),
        free_users: total_users - pro_users,
        pro_users,
        new_users_this_month: users
            .iter()
            .filter(|u| u.signup_at.is_some_and(|d| d.date_naive() >= month_start))
            .count() as u64,
        conversion_rate: if total_users > 0 {
            pro_users as f64 / total_users as f64 * 100.0
        } else {
            0.0
        },
    }
}

/// Session counts per device type.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceBreakdown {
    pub desktop: u64,
    pub mobile: u64,
    pub tablet: u64,
}

pub fn device_breakdown(sessions: &[LoginSession]) -> DeviceBreakdown {
    let count = |device: DeviceType| sessions.iter().filter(|s| s.device == device).count() as u64;
    DeviceBreakdown {
        desktop: count(DeviceType::Desktop),
        mobile: count(DeviceType::Mobile),
        tablet: count(DeviceType::Tablet),
    }
}

/// Transaction counts per payment status.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentBreakdown {
    pub total: u64,
    pub paid: u64,
    pub failed: u64,
    pub refunded: u64,
}

pub fn payment_breakdown(payments: &[PaymentRecord]) -> PaymentBreakdown {
    let count =
        |status: PaymentStatus| payments.iter().filter(|p| p.status == status).count() as u64;
    PaymentBreakdown {
        total: payments.len() as u64,
        paid: count(PaymentStatus::Paid),
        failed: count(PaymentStatus::Failed),
        refunded: count(PaymentStatus::Refunded),
    }
}

/// Paid revenue in the trailing window compared to the window before it.
#[derive(Debug, Clone, Serialize)]
pub struct RevenueTrend {
    pub window_days: u32,
    pub current: f64,
    pub previous: f64,
    pub growth: String,
}

pub fn revenue_trend(
    payments: &[PaymentRecord],
    window_days: u32,
    as_of: DateTime<Utc>,
) -> RevenueTrend {
    let window = Duration::days(i64::from(window_days.max(1)));
    let current_start = as_of - window;
    let previous_start = current_start - window;

    let paid_in = |from: DateTime<Utc>, to: DateTime<Utc>| {
        payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Paid)
            .filter(|p| p.paid_at.is_some_and(|d| d > from && d <= to))
            .map(|p| p.amount)
            .sum::<f64>()
    };

    let current = paid_in(current_start, as_of);
    let previous = paid_in(previous_start, current_start);
    RevenueTrend {
        window_days: window_days.max(1),
        current,
        previous,
        growth: format_growth_percent(current, previous),
    }
}

/// Cross-collection engagement averages for the analytics page.
#[derive(Debug, Clone, Serialize)]
pub struct EngagementMetrics {
    pub avg_sessions_per_user: f64,
    pub avg_revenue_per_pro_user: f64,
    pub avg_session_duration_secs: f64,
}

pub fn engagement_metrics(
    users: &[UserAccount],
    sessions: &[LoginSession],
    payments: &[PaymentRecord],
) -> EngagementMetrics {
    let pro_users = users
        .iter()
        .filter(|u| u.plan == SubscriptionPlan::Pro)
        .count();

    let avg_sessions_per_user = if users.is_empty() {
        0.0
    } else {
        sessions.len() as f64 / users.len() as f64
    };
    let avg_revenue_per_pro_user = if pro_users == 0 {
        0.0
    } else {
        total_revenue(payments) / pro_users as f64
    };
    let avg_session_duration_secs = if sessions.is_empty() {
        0.0
    } else {
        sessions
            .iter()
            .map(|s| f64::from(s.session_duration_secs.unwrap_or(0)))
            .sum::<f64>()
            / sessions.len() as f64
    };

    EngagementMetrics {
        avg_sessions_per_user,
        avg_revenue_per_pro_user,
        avg_session_duration_secs,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

/// One headline card on the dashboard page.
#[derive(Debug, Clone, Serialize)]
pub struct MetricCard {
    pub title: String,
    pub value: String,
    pub change: String,
    pub trend: Trend,
}

/// The dashboard's four headline cards, with display-ready values.
pub fn summary_cards(metrics: &DashboardMetrics) -> Vec<MetricCard> {
    let users_at_month_start = metrics.total_users.saturating_sub(metrics.new_users_this_month);
    let revenue_before_this_month = metrics.total_revenue - metrics.monthly_recurring_revenue;

    vec![
        MetricCard {
            title: "Total Users".to_string(),
            value: format_count(metrics.total_users),
            change: format_growth_percent(metrics.total_users as f64, users_at_month_start as f64),
            trend: if metrics.new_users_this_month > 0 {
                Trend::Up
            } else {
                Trend::Neutral
            },
        },
        MetricCard {
            title: "Total Revenue".to_string(),
            value: format_currency(metrics.total_revenue),
            change: format_growth_percent(metrics.total_revenue, revenue_before_this_month),
            trend: if metrics.monthly_recurring_revenue > 0.0 {
                Trend::Up
            } else {
                Trend::Neutral
            },
        },
        MetricCard {
            title: "Active Users".to_string(),
            value: format_count(metrics.active_users),
            change: if metrics.total_users > 0 {
                format!(
                    "{:.1}% of total",
                    metrics.active_users as f64 / metrics.total_users as f64 * 100.0
                )
            } else {
                "0.0% of total".to_string()
            },
            trend: if metrics.active_users > 0 {
                Trend::Up
            } else if metrics.total_users > 0 {
                Trend::Down
            } else {
                Trend::Neutral
            },
        },
        MetricCard {
            title: "Conversion Rate".to_string(),
            value: format!("{:.1}%", metrics.conversion_rate),
            change: format!("{} pro users", metrics.pro_users),
            trend: if metrics.conversion_rate > 10.0 {
                Trend::Up
            } else {
                Trend::Neutral
            },
        },
    ]
}
