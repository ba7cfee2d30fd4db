//! Customer lookups, per-customer order lists, analytics and history.

use crate::error::AppError;
use crate::models::{
    Customer, CustomerFilter, CustomerOrderAnalytics, CustomerOrderQuery, CustomerRef,
    CustomerSummary, LifetimeMetrics, Order, OrderHistory, OrderStatus, PageRequest,
    StatusDistribution, TimelineEntry, TimelineEvent,
};
use crate::response::{percentage, rounded_or_zero};
use crate::service::analytics::AnalyticsService;
use crate::service::{bind_all, bind_all_scalar};
use crate::sql::FilterBuilder;
use sqlx::SqliteConnection;

const CUSTOMER_COLUMNS: &str = "id, first_name, last_name, email, age, gender, state, \
     street_address, postal_code, city, country, latitude, longitude, traffic_source, created_at";

const SUMMARY_COLUMNS: &str =
    "id, first_name, last_name, email, age, gender, city, state, country, created_at";

pub(crate) const ORDER_COLUMNS: &str = "order_id, user_id, status, gender, created_at, \
     returned_at, shipped_at, delivered_at, num_of_item";

pub struct CustomerService;

impl CustomerService {
    /// Filtered page of customers, newest first, plus the filtered total.
    pub async fn list(
        conn: &mut SqliteConnection,
        filter: &CustomerFilter,
        page: PageRequest,
    ) -> Result<(Vec<CustomerSummary>, u64), AppError> {
        let clause = FilterBuilder::new()
            .contains("city", filter.city.as_deref())
            .eq("gender", filter.gender.clone())
            .contains_any(&["first_name", "last_name", "email"], filter.search.as_deref())
            .build();

        let count_sql = format!("SELECT COUNT(*) FROM users{}", clause.sql);
        tracing::debug!(sql = %count_sql, params = ?clause.params, "query");
        let total: i64 = bind_all_scalar(sqlx::query_scalar(&count_sql), &clause.params)
            .fetch_one(&mut *conn)
            .await?;

        let sql = format!(
            "SELECT {} FROM users{} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            SUMMARY_COLUMNS, clause.sql
        );
        tracing::debug!(sql = %sql, params = ?clause.params, "query");
        let rows = bind_all(sqlx::query_as::<_, CustomerSummary>(&sql), &clause.params)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut *conn)
            .await?;
        Ok((rows, total.max(0) as u64))
    }

    pub async fn find(conn: &mut SqliteConnection, id: i64) -> Result<Option<Customer>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = ?", CUSTOMER_COLUMNS);
        tracing::debug!(sql = %sql, id, "query");
        let row = sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row)
    }

    /// Customer or `404 Customer not found`.
    pub async fn require(conn: &mut SqliteConnection, id: i64) -> Result<Customer, AppError> {
        Self::find(conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Customer not found".into()))
    }

    /// Every order of a customer, newest first.
    pub async fn orders(conn: &mut SqliteConnection, user_id: i64) -> Result<Vec<Order>, AppError> {
        let sql = format!(
            "SELECT {} FROM orders WHERE user_id = ? ORDER BY created_at DESC, order_id DESC",
            ORDER_COLUMNS
        );
        tracing::debug!(sql = %sql, user_id, "query");
        let rows = sqlx::query_as::<_, Order>(&sql)
            .bind(user_id)
            .fetch_all(&mut *conn)
            .await?;
        Ok(rows)
    }

    /// One page of a customer's orders with optional status filter and allow-listed sort.
    pub async fn orders_page(
        conn: &mut SqliteConnection,
        user_id: i64,
        query: CustomerOrderQuery,
        page: PageRequest,
    ) -> Result<(Vec<Order>, u64), AppError> {
        let clause = FilterBuilder::new()
            .eq("user_id", Some(user_id))
            .eq("status", query.status.map(|s| s.as_str()))
            .build();

        let count_sql = format!("SELECT COUNT(*) FROM orders{}", clause.sql);
        tracing::debug!(sql = %count_sql, params = ?clause.params, "query");
        let total: i64 = bind_all_scalar(sqlx::query_scalar(&count_sql), &clause.params)
            .fetch_one(&mut *conn)
            .await?;

        let sql = format!(
            "SELECT {} FROM orders{} ORDER BY {} {}, order_id {} LIMIT ? OFFSET ?",
            ORDER_COLUMNS,
            clause.sql,
            query.sort_by.column(),
            query.sort_order.keyword(),
            query.sort_order.keyword()
        );
        tracing::debug!(sql = %sql, params = ?clause.params, "query");
        let rows = bind_all(sqlx::query_as::<_, Order>(&sql), &clause.params)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut *conn)
            .await?;
        Ok((rows, total.max(0) as u64))
    }

    /// Metrics over all of a customer's orders. Zero orders gives zero rates.
    pub async fn order_analytics(
        conn: &mut SqliteConnection,
        user_id: i64,
    ) -> Result<CustomerOrderAnalytics, AppError> {
        let status_breakdown = Self::status_breakdown(conn, user_id).await?;
        let (total_orders, total_items, avg_items): (i64, i64, Option<f64>) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(num_of_item), 0), AVG(num_of_item) \
             FROM orders WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;
        let delivered_orders = count_of(&status_breakdown, OrderStatus::Delivered);
        Ok(CustomerOrderAnalytics {
            total_orders,
            delivered_orders,
            delivery_rate: percentage(delivered_orders, total_orders),
            status_breakdown,
            total_items,
            average_items_per_order: rounded_or_zero(avg_items),
        })
    }

    /// Lifetime metrics and a chronological per-order event timeline.
    pub async fn order_history(
        conn: &mut SqliteConnection,
        customer: &Customer,
    ) -> Result<OrderHistory, AppError> {
        let sql = format!(
            "SELECT {} FROM orders WHERE user_id = ? ORDER BY created_at ASC, order_id ASC",
            ORDER_COLUMNS
        );
        tracing::debug!(sql = %sql, user_id = customer.id, "query");
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(customer.id)
            .fetch_all(&mut *conn)
            .await?;
        let status_breakdown = Self::status_breakdown(conn, customer.id).await?;
        let delivery_days = AnalyticsService::delivery_days(conn, Some(customer.id)).await?;

        let total_orders = orders.len() as i64;
        let lifetime = LifetimeMetrics {
            total_orders,
            total_items: orders.iter().filter_map(|o| o.num_of_item).sum(),
            first_order_at: orders.iter().filter_map(|o| o.created_at).min(),
            last_order_at: orders.iter().filter_map(|o| o.created_at).max(),
            delivery_rate: percentage(
                count_of(&status_breakdown, OrderStatus::Delivered),
                total_orders,
            ),
            return_rate: percentage(
                count_of(&status_breakdown, OrderStatus::Returned),
                total_orders,
            ),
            cancellation_rate: percentage(
                count_of(&status_breakdown, OrderStatus::Cancelled),
                total_orders,
            ),
            delivery_days: delivery_days.days,
        };

        Ok(OrderHistory {
            customer: CustomerRef::from(customer),
            lifetime,
            timeline: orders.iter().map(timeline_entry).collect(),
        })
    }

    async fn status_breakdown(
        conn: &mut SqliteConnection,
        user_id: i64,
    ) -> Result<StatusDistribution, AppError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM orders WHERE user_id = ? GROUP BY status",
        )
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows.into_iter().collect())
    }
}

fn count_of(distribution: &StatusDistribution, status: OrderStatus) -> i64 {
    distribution.get(status.as_str()).copied().unwrap_or(0)
}

fn timeline_entry(order: &Order) -> TimelineEntry {
    let mut events: Vec<TimelineEvent> = [
        ("created", order.created_at),
        ("shipped", order.shipped_at),
        ("delivered", order.delivered_at),
        ("returned", order.returned_at),
    ]
    .into_iter()
    .filter_map(|(event, at)| at.map(|at| TimelineEvent { event, at }))
    .collect();
    events.sort_by_key(|e| e.at);
    TimelineEntry {
        order_id: order.order_id,
        status: order.status.clone(),
        num_of_item: order.num_of_item,
        events,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn timeline_skips_missing_timestamps_and_sorts() {
        let order = Order {
            order_id: 9,
            user_id: 1,
            status: "Returned".into(),
            gender: None,
            created_at: Some(at(1, 9)),
            returned_at: Some(at(9, 12)),
            shipped_at: None,
            delivered_at: Some(at(4, 15)),
            num_of_item: Some(2),
        };
        let entry = timeline_entry(&order);
        let names: Vec<&str> = entry.events.iter().map(|e| e.event).collect();
        assert_eq!(names, vec!["created", "delivered", "returned"]);
    }
}
