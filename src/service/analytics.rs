//! Global aggregates: overview, demographics, monthly trends, delivery times.

use crate::error::AppError;
use crate::models::{
    AgeBucket, CityCount, CityItemStats, CityShare, CustomerStats, DeliveryDays,
    DeliveryTimeline, MonthStatusCount, MonthlyCount, MonthlyTrend, OrderAnalyticsSummary,
    OrderStats, OrderStatus, OverviewStats, StatusDistribution, TopCustomer, TrafficSourceCount,
};
use crate::response::{percentage, rounded_or_zero};
use crate::service::bind_all;
use crate::sql::FilterBuilder;
use sqlx::SqliteConnection;
use std::collections::BTreeMap;

const TOP_CITIES: i64 = 5;
const TOP_N: i64 = 10;
/// Cities need more orders than this to appear in per-city item averages.
const CITY_STATS_MIN_ORDERS: i64 = 10;

/// Delivered-order count plus duration statistics in days.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeliveryAggregate {
    pub delivered_orders: i64,
    pub days: DeliveryDays,
}

pub struct AnalyticsService;

impl AnalyticsService {
    pub async fn overview(conn: &mut SqliteConnection) -> Result<OverviewStats, AppError> {
        let total_customers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *conn)
            .await?;
        let total_orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&mut *conn)
            .await?;
        let status_distribution = Self::status_distribution(conn).await?;
        let avg_items: Option<f64> =
            sqlx::query_scalar("SELECT AVG(num_of_item) FROM orders WHERE num_of_item IS NOT NULL")
                .fetch_one(&mut *conn)
                .await?;
        let top_cities = sqlx::query_as::<_, CityCount>(
            "SELECT city, COUNT(*) AS count FROM users \
             GROUP BY city ORDER BY count DESC, city ASC LIMIT ?",
        )
        .bind(TOP_CITIES)
        .fetch_all(&mut *conn)
        .await?;

        let delivered = status_distribution
            .get(OrderStatus::Delivered.as_str())
            .copied()
            .unwrap_or(0);
        Ok(OverviewStats {
            total_customers,
            total_orders,
            status_distribution,
            average_items_per_order: rounded_or_zero(avg_items),
            delivery_rate: percentage(delivered, total_orders),
            top_cities,
        })
    }

    pub async fn customer_stats(conn: &mut SqliteConnection) -> Result<CustomerStats, AppError> {
        let genders: Vec<(String, i64)> = sqlx::query_as(
            "SELECT gender, COUNT(*) FROM users WHERE gender IS NOT NULL GROUP BY gender",
        )
        .fetch_all(&mut *conn)
        .await?;

        let age_distribution = sqlx::query_as::<_, AgeBucket>(
            r#"
            SELECT
                CASE
                    WHEN age < 25 THEN '18-24'
                    WHEN age < 35 THEN '25-34'
                    WHEN age < 45 THEN '35-44'
                    WHEN age < 55 THEN '45-54'
                    WHEN age < 65 THEN '55-64'
                    ELSE '65+'
                END AS age_group,
                COUNT(*) AS count
            FROM users
            WHERE age IS NOT NULL
            GROUP BY age_group
            ORDER BY age_group
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        let traffic_sources = sqlx::query_as::<_, TrafficSourceCount>(
            "SELECT traffic_source, COUNT(*) AS count FROM users \
             WHERE traffic_source IS NOT NULL \
             GROUP BY traffic_source ORDER BY count DESC, traffic_source ASC LIMIT ?",
        )
        .bind(TOP_N)
        .fetch_all(&mut *conn)
        .await?;

        let top_customers = Self::top_customers(conn, TOP_N).await?;

        Ok(CustomerStats {
            gender_distribution: genders.into_iter().collect::<BTreeMap<_, _>>(),
            age_distribution,
            traffic_sources,
            top_customers,
        })
    }

    pub async fn order_stats(conn: &mut SqliteConnection) -> Result<OrderStats, AppError> {
        let monthly_trends = sqlx::query_as::<_, MonthlyCount>(
            "SELECT strftime('%Y-%m', created_at) AS month, COUNT(*) AS count \
             FROM orders WHERE created_at IS NOT NULL \
             GROUP BY month HAVING month IS NOT NULL ORDER BY month",
        )
        .fetch_all(&mut *conn)
        .await?;

        let completion_by_month = sqlx::query_as::<_, MonthStatusCount>(
            "SELECT strftime('%Y-%m', created_at) AS month, status, COUNT(*) AS count \
             FROM orders WHERE created_at IS NOT NULL \
             GROUP BY month, status HAVING month IS NOT NULL ORDER BY month, status",
        )
        .fetch_all(&mut *conn)
        .await?;

        let city_rows: Vec<(Option<String>, Option<f64>, i64)> = sqlx::query_as(
            "SELECT u.city, AVG(o.num_of_item) AS avg_items, COUNT(o.order_id) AS order_count \
             FROM users u JOIN orders o ON u.id = o.user_id \
             GROUP BY u.city HAVING order_count > ? \
             ORDER BY avg_items DESC, u.city ASC LIMIT ?",
        )
        .bind(CITY_STATS_MIN_ORDERS)
        .bind(TOP_N)
        .fetch_all(&mut *conn)
        .await?;
        let city_stats = city_rows
            .into_iter()
            .map(|(city, avg_items, order_count)| CityItemStats {
                city,
                avg_items: rounded_or_zero(avg_items),
                order_count,
            })
            .collect();

        let delivery = Self::delivery_days(conn, None).await?;
        let average_delivery_days =
            (delivery.delivered_orders > 0).then_some(delivery.days.average);

        Ok(OrderStats {
            monthly_trends,
            completion_by_month,
            city_stats,
            average_delivery_days,
        })
    }

    pub async fn order_summary(
        conn: &mut SqliteConnection,
    ) -> Result<OrderAnalyticsSummary, AppError> {
        let month_rows: Vec<(String, i64, i64, i64)> = sqlx::query_as(
            "SELECT strftime('%Y-%m', created_at) AS month, COUNT(*), \
                    COALESCE(SUM(CASE WHEN status = ? THEN 1 ELSE 0 END), 0), \
                    COALESCE(SUM(num_of_item), 0) \
             FROM orders WHERE created_at IS NOT NULL \
             GROUP BY month HAVING month IS NOT NULL ORDER BY month",
        )
        .bind(OrderStatus::Delivered.as_str())
        .fetch_all(&mut *conn)
        .await?;
        let monthly_trends = month_rows
            .into_iter()
            .map(|(month, total_orders, delivered_orders, total_items)| MonthlyTrend {
                month,
                total_orders,
                delivered_orders,
                delivery_rate: percentage(delivered_orders, total_orders),
                total_items,
            })
            .collect();

        let top_customers = Self::top_customers(conn, TOP_N).await?;

        let delivery = Self::delivery_days(conn, None).await?;
        let delivery_timeline = DeliveryTimeline {
            delivered_orders: delivery.delivered_orders,
            average_days: delivery.days.average,
            min_days: delivery.days.min,
            max_days: delivery.days.max,
        };

        let total_orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&mut *conn)
            .await?;
        let city_rows: Vec<(Option<String>, i64)> = sqlx::query_as(
            "SELECT u.city, COUNT(*) AS order_count \
             FROM orders o JOIN users u ON u.id = o.user_id \
             GROUP BY u.city ORDER BY order_count DESC, u.city ASC LIMIT ?",
        )
        .bind(TOP_N)
        .fetch_all(&mut *conn)
        .await?;
        let city_distribution = city_rows
            .into_iter()
            .map(|(city, order_count)| CityShare {
                city,
                order_count,
                percentage: percentage(order_count, total_orders),
            })
            .collect();

        Ok(OrderAnalyticsSummary {
            monthly_trends,
            top_customers,
            delivery_timeline,
            city_distribution,
        })
    }

    pub async fn status_distribution(
        conn: &mut SqliteConnection,
    ) -> Result<StatusDistribution, AppError> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM orders GROUP BY status")
                .fetch_all(&mut *conn)
                .await?;
        Ok(rows.into_iter().collect())
    }

    /// Customers ranked by number of orders.
    pub async fn top_customers(
        conn: &mut SqliteConnection,
        limit: i64,
    ) -> Result<Vec<TopCustomer>, AppError> {
        let rows = sqlx::query_as::<_, TopCustomer>(
            "SELECT u.id, u.first_name, u.last_name, u.email, COUNT(o.order_id) AS order_count \
             FROM users u JOIN orders o ON u.id = o.user_id \
             GROUP BY u.id, u.first_name, u.last_name, u.email \
             ORDER BY order_count DESC, u.id ASC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }

    /// Delivery duration (`delivered_at - created_at`, days) over delivered
    /// orders with both timestamps, optionally for one customer.
    pub async fn delivery_days(
        conn: &mut SqliteConnection,
        user_id: Option<i64>,
    ) -> Result<DeliveryAggregate, AppError> {
        let clause = FilterBuilder::new()
            .eq("status", Some(OrderStatus::Delivered.as_str()))
            .eq("user_id", user_id)
            .build();
        let sql = format!(
            "SELECT COUNT(*), AVG(days), MIN(days), MAX(days) FROM ( \
                SELECT julianday(delivered_at) - julianday(created_at) AS days \
                FROM orders{} AND created_at IS NOT NULL AND delivered_at IS NOT NULL \
             ) WHERE days IS NOT NULL",
            clause.sql
        );
        tracing::debug!(sql = %sql, params = ?clause.params, "query");
        let (delivered_orders, avg, min, max): (i64, Option<f64>, Option<f64>, Option<f64>) =
            bind_all(sqlx::query_as(&sql), &clause.params)
                .fetch_one(&mut *conn)
                .await?;
        Ok(DeliveryAggregate {
            delivered_orders,
            days: DeliveryDays {
                average: rounded_or_zero(avg),
                min: rounded_or_zero(min),
                max: rounded_or_zero(max),
            },
        })
    }
}
