//! Customer (users table) rows.

use crate::models::order::Order;
use chrono::NaiveDateTime;
use serde::Serialize;

/// Columns shown in the customer list.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CustomerSummary {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

/// Every stored user column.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Customer {
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

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// `GET /api/customers/{id}`: the customer plus all orders, newest first.
#[derive(Debug, Serialize)]
pub struct CustomerDetail {
    #[serde(flatten)]
    pub customer: Customer,
    pub orders: Vec<Order>,
}

/// Compact customer header used by the per-customer order endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerRef {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl From<&Customer> for CustomerRef {
    fn from(c: &Customer) -> Self {
        CustomerRef {
            id: c.id,
            name: c.full_name(),
            email: c.email.clone(),
            city: c.city.clone(),
            state: c.state.clone(),
            country: c.country.clone(),
        }
    }
}

/// Validated filters for the customer list.
#[derive(Debug, Default, Clone)]
pub struct CustomerFilter {
    pub search: Option<String>,
    pub city: Option<String>,
    /// Upper-cased before matching.
    pub gender: Option<String>,
}
