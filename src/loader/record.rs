//! CSV header lookup and per-field coercion into typed user/order rows.

use crate::error::LoadError;
use crate::models::OrderStatus;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use std::collections::HashMap;
use thiserror::Error;

/// Why a single row was skipped. Never fatal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("missing value for {0}")]
    Missing(&'static str),
    #[error("invalid {column} '{value}'")]
    Invalid { column: &'static str, value: String },
}

/// Column positions resolved from the header row.
#[derive(Debug, Clone)]
pub struct Columns {
    by_name: HashMap<String, usize>,
}

impl Columns {
    pub fn from_headers(headers: &StringRecord) -> Self {
        let by_name = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().trim_start_matches('\u{feff}').to_string(), i))
            .collect();
        Columns { by_name }
    }

    pub fn require(&self, table: &'static str, column: &'static str) -> Result<usize, LoadError> {
        self.by_name
            .get(column)
            .copied()
            .ok_or(LoadError::MissingColumn { table, column })
    }

    pub fn optional(&self, column: &str) -> Option<usize> {
        self.by_name.get(column).copied()
    }
}

/// Trimmed field, `None` when the column is absent or the value is empty.
fn field(record: &StringRecord, index: Option<usize>) -> Option<&str> {
    index
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn text(record: &StringRecord, index: Option<usize>) -> Option<String> {
    field(record, index).map(str::to_string)
}

fn required<'r>(
    record: &'r StringRecord,
    index: usize,
    column: &'static str,
) -> Result<&'r str, RowError> {
    field(record, Some(index)).ok_or(RowError::Missing(column))
}

fn invalid(column: &'static str, value: &str) -> RowError {
    RowError::Invalid {
        column,
        value: value.to_string(),
    }
}

/// Integer, also accepting whole floats such as `42.0`.
fn parse_int(column: &'static str, value: &str) -> Result<i64, RowError> {
    if let Ok(n) = value.parse::<i64>() {
        return Ok(n);
    }
    match value.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 => Ok(f as i64),
        _ => Err(invalid(column, value)),
    }
}

fn optional_int(
    record: &StringRecord,
    index: Option<usize>,
    column: &'static str,
) -> Result<Option<i64>, RowError> {
    field(record, index).map(|v| parse_int(column, v)).transpose()
}

fn optional_float(
    record: &StringRecord,
    index: Option<usize>,
    column: &'static str,
) -> Result<Option<f64>, RowError> {
    field(record, index)
        .map(|v| v.parse::<f64>().map_err(|_| invalid(column, v)))
        .transpose()
}

fn gender(record: &StringRecord, index: Option<usize>) -> Option<String> {
    field(record, index).map(str::to_uppercase)
}

/// Parse a timestamp in any accepted form and normalize it to naive UTC.
///
/// Accepted: RFC 3339, `YYYY-MM-DD HH:MM:SS[.f][±HH:MM]` with an optional
/// trailing ` UTC`, `YYYY-MM-DDTHH:MM:SS[.f]`, and a bare `YYYY-MM-DD`
/// (midnight).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    let s = s.strip_suffix(" UTC").unwrap_or(s).trim_end();
    for fmt in ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.naive_utc());
        }
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// One coerced `users` row.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub state: Option<String>,
    pub street_address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub traffic_source: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

/// Column layout of a users file.
#[derive(Debug, Clone)]
pub struct UserColumns {
    id: usize,
    first_name: usize,
    last_name: usize,
    email: Option<usize>,
    age: Option<usize>,
    gender: Option<usize>,
    state: Option<usize>,
    street_address: Option<usize>,
    postal_code: Option<usize>,
    city: Option<usize>,
    country: Option<usize>,
    latitude: Option<usize>,
    longitude: Option<usize>,
    traffic_source: Option<usize>,
    created_at: Option<usize>,
}

impl UserColumns {
    pub fn resolve(columns: &Columns) -> Result<Self, LoadError> {
        Ok(UserColumns {
            id: columns.require("users", "id")?,
            first_name: columns.require("users", "first_name")?,
            last_name: columns.require("users", "last_name")?,
            email: columns.optional("email"),
            age: columns.optional("age"),
            gender: columns.optional("gender"),
            state: columns.optional("state"),
            street_address: columns.optional("street_address"),
            postal_code: columns.optional("postal_code"),
            city: columns.optional("city"),
            country: columns.optional("country"),
            latitude: columns.optional("latitude"),
            longitude: columns.optional("longitude"),
            traffic_source: columns.optional("traffic_source"),
            created_at: columns.optional("created_at"),
        })
    }

    pub fn parse(&self, record: &StringRecord) -> Result<UserRecord, RowError> {
        let id = parse_int("id", required(record, self.id, "id")?)?;
        let email = match field(record, self.email) {
            Some(e) if !e.contains('@') => return Err(invalid("email", e)),
            other => other.map(str::to_string),
        };
        let created_at = match field(record, self.created_at) {
            Some(raw) => Some(parse_timestamp(raw).ok_or_else(|| invalid("created_at", raw))?),
            None => None,
        };
        Ok(UserRecord {
            id,
            first_name: required(record, self.first_name, "first_name")?.to_string(),
            last_name: required(record, self.last_name, "last_name")?.to_string(),
            email,
            age: optional_int(record, self.age, "age")?,
            gender: gender(record, self.gender),
            state: text(record, self.state),
            street_address: text(record, self.street_address),
            postal_code: text(record, self.postal_code),
            city: text(record, self.city),
            country: text(record, self.country),
            latitude: optional_float(record, self.latitude, "latitude")?,
            longitude: optional_float(record, self.longitude, "longitude")?,
            traffic_source: text(record, self.traffic_source),
            created_at,
        })
    }
}

/// One coerced `orders` row.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub order_id: i64,
    pub user_id: i64,
    pub status: OrderStatus,
    pub gender: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub returned_at: Option<NaiveDateTime>,
    pub shipped_at: Option<NaiveDateTime>,
    pub delivered_at: Option<NaiveDateTime>,
    pub num_of_item: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct OrderColumns {
    order_id: usize,
    user_id: usize,
    status: usize,
    gender: Option<usize>,
    created_at: Option<usize>,
    returned_at: Option<usize>,
    shipped_at: Option<usize>,
    delivered_at: Option<usize>,
    num_of_item: Option<usize>,
}

impl OrderColumns {
    pub fn resolve(columns: &Columns) -> Result<Self, LoadError> {
        Ok(OrderColumns {
            order_id: columns.require("orders", "order_id")?,
            user_id: columns.require("orders", "user_id")?,
            status: columns.require("orders", "status")?,
            gender: columns.optional("gender"),
            created_at: columns.optional("created_at"),
            returned_at: columns.optional("returned_at"),
            shipped_at: columns.optional("shipped_at"),
            delivered_at: columns.optional("delivered_at"),
            num_of_item: columns.optional("num_of_item"),
        })
    }

    /// Timestamps that do not parse become `None`; ids, status and item
    /// count must be valid.
    pub fn parse(&self, record: &StringRecord) -> Result<OrderRecord, RowError> {
        let raw_status = required(record, self.status, "status")?;
        let status: OrderStatus = raw_status
            .parse()
            .map_err(|_| invalid("status", raw_status))?;
        let num_of_item = optional_int(record, self.num_of_item, "num_of_item")?;
        if let Some(n) = num_of_item.filter(|n| *n < 0) {
            return Err(invalid("num_of_item", &n.to_string()));
        }
        let stamp = |index| field(record, index).and_then(parse_timestamp);
        Ok(OrderRecord {
            order_id: parse_int("order_id", required(record, self.order_id, "order_id")?)?,
            user_id: parse_int("user_id", required(record, self.user_id, "user_id")?)?,
            status,
            gender: gender(record, self.gender),
            created_at: stamp(self.created_at),
            returned_at: stamp(self.returned_at),
            shipped_at: stamp(self.shipped_at),
            delivered_at: stamp(self.delivered_at),
            num_of_item,
        })
    }
}
