//! Order rows, the status enum, and update payloads.

use crate::error::AppError;
use crate::sql::{SortField, SortOrder};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Fulfilment status. Intended flow is Pending -> Shipped -> Delivered, with
/// Cancelled / Returned reachable earlier; transitions are not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OrderStatus {
    Pending,
    Shipped,
    Delivered,
    Cancelled,
    Returned,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
        OrderStatus::Returned,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Returned => "Returned",
        }
    }

    /// Timestamp column stamped with the current time when an order enters this status.
    pub fn timestamp_column(self) -> Option<&'static str> {
        match self {
            OrderStatus::Shipped => Some("shipped_at"),
            OrderStatus::Delivered => Some("delivered_at"),
            OrderStatus::Returned => Some("returned_at"),
            OrderStatus::Pending | OrderStatus::Cancelled => None,
        }
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "Invalid status '{}'. Allowed: Pending, Shipped, Delivered, Cancelled, Returned",
                    s
                ))
            })
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every stored order column.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub order_id: i64,
    pub user_id: i64,
    pub status: String,
    pub gender: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub returned_at: Option<NaiveDateTime>,
    pub shipped_at: Option<NaiveDateTime>,
    pub delivered_at: Option<NaiveDateTime>,
    pub num_of_item: Option<i64>,
}

/// Order list row with the purchaser's name and city. Customer fields are
/// null when `user_id` points at no user.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderListItem {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub order: Order,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub city: Option<String>,
}

/// `GET /api/orders/{id}`: order plus customer contact and location.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub order: Order,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

/// Validated filters for the global order list.
#[derive(Debug, Default, Clone)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub user_id: Option<i64>,
}

/// Validated filters and ordering for one customer's orders.
#[derive(Debug, Default, Clone, Copy)]
pub struct CustomerOrderQuery {
    pub status: Option<OrderStatus>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

/// `PUT /api/orders/{id}` body.
#[derive(Debug, Deserialize)]
pub struct UpdateOrderRequest {
    pub status: Option<String>,
    pub num_of_item: Option<i64>,
}

/// One `(order_id, status)` pair of a bulk update. Status stays a raw string so
/// an unknown value fails that item only.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkStatusItem {
    pub order_id: i64,
    pub status: String,
}

/// A bulk entry as sent. Its shape is checked per entry, so one malformed
/// entry is reported in `errors` instead of rejecting the whole batch.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct BulkStatusEntry(pub Value);

impl BulkStatusEntry {
    /// `position` is 1-based and names the entry when its order id is unusable.
    pub fn item(&self, position: usize) -> Result<BulkStatusItem, String> {
        let order_id = self
            .0
            .get("order_id")
            .and_then(Value::as_i64)
            .ok_or_else(|| format!("Update {} has no valid order_id", position))?;
        let status = self
            .0
            .get("status")
            .and_then(Value::as_str)
            .ok_or_else(|| format!("Missing status for order {}", order_id))?;
        Ok(BulkStatusItem {
            order_id,
            status: status.to_string(),
        })
    }
}

/// Accepts `{"updates": [...]}` or a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum BulkStatusRequest {
    Wrapped { updates: Vec<BulkStatusEntry> },
    Bare(Vec<BulkStatusEntry>),
}

impl BulkStatusRequest {
    pub fn into_items(self) -> Vec<BulkStatusEntry> {
        match self {
            BulkStatusRequest::Wrapped { updates } => updates,
            BulkStatusRequest::Bare(items) => items,
        }
    }
}

/// Result of a bulk update: partial failure is reported, not raised.
#[derive(Debug, Serialize, PartialEq)]
pub struct BulkStatusOutcome {
    pub message: String,
    pub requested: usize,
    pub updated_count: usize,
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parsing_is_exact() {
        assert_eq!("Delivered".parse::<OrderStatus>().unwrap(), OrderStatus::Delivered);
        assert!("delivered".parse::<OrderStatus>().is_err());
        assert!("Complete".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn only_fulfilment_states_carry_a_timestamp() {
        assert_eq!(OrderStatus::Shipped.timestamp_column(), Some("shipped_at"));
        assert_eq!(OrderStatus::Delivered.timestamp_column(), Some("delivered_at"));
        assert_eq!(OrderStatus::Returned.timestamp_column(), Some("returned_at"));
        assert_eq!(OrderStatus::Pending.timestamp_column(), None);
        assert_eq!(OrderStatus::Cancelled.timestamp_column(), None);
    }

    #[test]
    fn bulk_request_accepts_both_shapes() {
        let wrapped: BulkStatusRequest =
            serde_json::from_str(r#"{"updates":[{"order_id":1,"status":"Shipped"}]}"#).unwrap();
        let bare: BulkStatusRequest =
            serde_json::from_str(r#"[{"order_id":1,"status":"Shipped"}]"#).unwrap();
        assert_eq!(wrapped.into_items().len(), 1);
        assert_eq!(bare.into_items()[0].item(1).unwrap().order_id, 1);
    }

    #[test]
    fn malformed_bulk_entries_fail_individually() {
        let request: BulkStatusRequest = serde_json::from_str(
            r#"[{"order_id":"x","status":"Shipped"},{"order_id":7},42,{"order_id":8,"status":"Shipped"}]"#,
        )
        .unwrap();
        let results: Vec<_> = request
            .into_items()
            .iter()
            .enumerate()
            .map(|(i, entry)| entry.item(i + 1))
            .collect();
        assert_eq!(results[0], Err("Update 1 has no valid order_id".to_string()));
        assert_eq!(results[1], Err("Missing status for order 7".to_string()));
        assert_eq!(results[2], Err("Update 3 has no valid order_id".to_string()));
        assert_eq!(
            results[3],
            Ok(BulkStatusItem {
                order_id: 8,
                status: "Shipped".into()
            })
        );
    }
}
