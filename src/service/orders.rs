//! Order listing, lookup and status updates.

use crate::error::AppError;
use crate::models::{
    BulkStatusEntry, BulkStatusOutcome, OrderDetail, OrderFilter, OrderListItem, OrderStatus,
    PageRequest,
};
use crate::service::{bind_all, bind_all_scalar, StatusChange};
use crate::sql::FilterBuilder;
use chrono::Utc;
use sqlx::SqliteConnection;

/// Most items accepted by one bulk status request.
pub const BULK_LIMIT: usize = 100;

const LIST_COLUMNS: &str = "o.order_id, o.user_id, o.status, o.gender, o.created_at, \
     o.returned_at, o.shipped_at, o.delivered_at, o.num_of_item, \
     u.first_name, u.last_name, u.email, u.city";

const DETAIL_COLUMNS: &str = "o.order_id, o.user_id, o.status, o.gender, o.created_at, \
     o.returned_at, o.shipped_at, o.delivered_at, o.num_of_item, \
     u.first_name, u.last_name, u.email, u.city, u.state, u.country";

pub struct OrderService;

impl OrderService {
    /// Filtered page of orders, newest first. Orders whose user is missing are
    /// still listed (customer fields null), so rows and total agree.
    pub async fn list(
        conn: &mut SqliteConnection,
        filter: &OrderFilter,
        page: PageRequest,
    ) -> Result<(Vec<OrderListItem>, u64), AppError> {
        let clause = FilterBuilder::new()
            .eq("o.status", filter.status.map(|s| s.as_str()))
            .eq("o.user_id", filter.user_id)
            .build();

        let count_sql = format!("SELECT COUNT(*) FROM orders o{}", clause.sql);
        tracing::debug!(sql = %count_sql, params = ?clause.params, "query");
        let total: i64 = bind_all_scalar(sqlx::query_scalar(&count_sql), &clause.params)
            .fetch_one(&mut *conn)
            .await?;

        let sql = format!(
            "SELECT {} FROM orders o LEFT JOIN users u ON o.user_id = u.id{} \
             ORDER BY o.created_at DESC, o.order_id DESC LIMIT ? OFFSET ?",
            LIST_COLUMNS, clause.sql
        );
        tracing::debug!(sql = %sql, params = ?clause.params, "query");
        let rows = bind_all(sqlx::query_as::<_, OrderListItem>(&sql), &clause.params)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut *conn)
            .await?;
        Ok((rows, total.max(0) as u64))
    }

    pub async fn find(
        conn: &mut SqliteConnection,
        order_id: i64,
    ) -> Result<Option<OrderDetail>, AppError> {
        let sql = format!(
            "SELECT {} FROM orders o LEFT JOIN users u ON o.user_id = u.id WHERE o.order_id = ?",
            DETAIL_COLUMNS
        );
        tracing::debug!(sql = %sql, order_id, "query");
        let row = sqlx::query_as::<_, OrderDetail>(&sql)
            .bind(order_id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row)
    }

    /// Order or `404 Order not found`.
    pub async fn require(conn: &mut SqliteConnection, order_id: i64) -> Result<OrderDetail, AppError> {
        Self::find(conn, order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".into()))
    }

    /// Set status (stamping the matching timestamp with now) and optionally
    /// the item count. Returns false when the order does not exist.
    pub async fn apply_status(
        conn: &mut SqliteConnection,
        order_id: i64,
        change: StatusChange,
    ) -> Result<bool, AppError> {
        let mut sets = vec!["status = ?".to_string()];
        let stamp_column = change.status.timestamp_column();
        if let Some(column) = stamp_column {
            sets.push(format!("{} = ?", column));
        }
        if change.num_of_item.is_some() {
            sets.push("num_of_item = ?".to_string());
        }
        let sql = format!("UPDATE orders SET {} WHERE order_id = ?", sets.join(", "));
        tracing::debug!(sql = %sql, order_id, status = %change.status, "update");

        let mut query = sqlx::query(&sql).bind(change.status.as_str());
        if stamp_column.is_some() {
            query = query.bind(Utc::now().naive_utc());
        }
        if let Some(n) = change.num_of_item {
            query = query.bind(n);
        }
        let result = query.bind(order_id).execute(&mut *conn).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Update then re-read, `404 Order not found` when missing.
    pub async fn update(
        conn: &mut SqliteConnection,
        order_id: i64,
        change: StatusChange,
    ) -> Result<OrderDetail, AppError> {
        if !Self::apply_status(conn, order_id, change).await? {
            return Err(AppError::NotFound("Order not found".into()));
        }
        tracing::info!(order_id, status = %change.status, "order status updated");
        Self::require(conn, order_id).await
    }

    /// Apply each `(order_id, status)` independently. Failures, malformed
    /// entries included, are collected; successful items stay committed.
    pub async fn bulk_update_status(
        conn: &mut SqliteConnection,
        items: &[BulkStatusEntry],
    ) -> Result<BulkStatusOutcome, AppError> {
        if items.is_empty() {
            return Err(AppError::BadRequest("No updates provided".into()));
        }
        if items.len() > BULK_LIMIT {
            return Err(AppError::BadRequest(format!(
                "Bulk update limited to {} items",
                BULK_LIMIT
            )));
        }

        let mut updated_count = 0usize;
        let mut errors = Vec::new();
        for (index, entry) in items.iter().enumerate() {
            let item = match entry.item(index + 1) {
                Ok(item) => item,
                Err(message) => {
                    errors.push(message);
                    continue;
                }
            };
            let status: OrderStatus = match item.status.parse() {
                Ok(s) => s,
                Err(_) => {
                    errors.push(format!(
                        "Invalid status '{}' for order {}",
                        item.status, item.order_id
                    ));
                    continue;
                }
            };
            let change = StatusChange {
                status,
                num_of_item: None,
            };
            if Self::apply_status(conn, item.order_id, change).await? {
                updated_count += 1;
            } else {
                errors.push(format!("Order {} not found", item.order_id));
            }
        }
        tracing::info!(
            requested = items.len(),
            updated = updated_count,
            failed = errors.len(),
            "bulk status update"
        );

        Ok(BulkStatusOutcome {
            message: format!("Updated {} of {} orders", updated_count, items.len()),
            requested: items.len(),
            updated_count,
            errors,
        })
    }
}
