//! Aggregate rows and analytics payloads.

use crate::models::customer::CustomerRef;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;

/// Status name -> order count.
pub type StatusDistribution = BTreeMap<String, i64>;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct CityCount {
    pub city: Option<String>,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AgeBucket {
    pub age_group: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TrafficSourceCount {
    pub traffic_source: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TopCustomer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub order_count: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MonthlyCount {
    pub month: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MonthStatusCount {
    pub month: String,
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CityItemStats {
    pub city: Option<String>,
    pub avg_items: f64,
    pub order_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyTrend {
    pub month: String,
    pub total_orders: i64,
    pub delivered_orders: i64,
    pub delivery_rate: f64,
    pub total_items: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CityShare {
    pub city: Option<String>,
    pub order_count: i64,
    pub percentage: f64,
}

/// Days between `created_at` and `delivered_at` over delivered orders.
/// All zero when nothing has been delivered.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct DeliveryDays {
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeliveryTimeline {
    pub delivered_orders: i64,
    pub average_days: f64,
    pub min_days: f64,
    pub max_days: f64,
}

#[derive(Debug, Serialize)]
pub struct OverviewStats {
    pub total_customers: i64,
    pub total_orders: i64,
    pub status_distribution: StatusDistribution,
    pub average_items_per_order: f64,
    pub delivery_rate: f64,
    pub top_cities: Vec<CityCount>,
}

#[derive(Debug, Serialize)]
pub struct CustomerStats {
    pub gender_distribution: BTreeMap<String, i64>,
    pub age_distribution: Vec<AgeBucket>,
    pub traffic_sources: Vec<TrafficSourceCount>,
    pub top_customers: Vec<TopCustomer>,
}

#[derive(Debug, Serialize)]
pub struct OrderStats {
    pub monthly_trends: Vec<MonthlyCount>,
    pub completion_by_month: Vec<MonthStatusCount>,
    pub city_stats: Vec<CityItemStats>,
    /// Null when no order has both timestamps.
    pub average_delivery_days: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct OrderAnalyticsSummary {
    pub monthly_trends: Vec<MonthlyTrend>,
    pub top_customers: Vec<TopCustomer>,
    pub delivery_timeline: DeliveryTimeline,
    pub city_distribution: Vec<CityShare>,
}

/// Metrics over every order of one customer (independent of list filters).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CustomerOrderAnalytics {
    pub total_orders: i64,
    pub delivered_orders: i64,
    pub delivery_rate: f64,
    pub status_breakdown: StatusDistribution,
    pub total_items: i64,
    pub average_items_per_order: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LifetimeMetrics {
    pub total_orders: i64,
    pub total_items: i64,
    pub first_order_at: Option<NaiveDateTime>,
    pub last_order_at: Option<NaiveDateTime>,
    pub delivery_rate: f64,
    pub return_rate: f64,
    pub cancellation_rate: f64,
    pub delivery_days: DeliveryDays,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimelineEvent {
    pub event: &'static str,
    pub at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineEntry {
    pub order_id: i64,
    pub status: String,
    pub num_of_item: Option<i64>,
    pub events: Vec<TimelineEvent>,
}

#[derive(Debug, Serialize)]
pub struct OrderHistory {
    pub customer: CustomerRef,
    pub lifetime: LifetimeMetrics,
    pub timeline: Vec<TimelineEntry>,
}
