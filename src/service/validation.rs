//! Request validation: query strings and bodies into typed, checked inputs.

use crate::error::AppError;
use crate::models::{
    CustomerFilter, CustomerOrderQuery, OrderFilter, OrderStatus, UpdateOrderRequest,
};
use crate::sql::{SortField, SortOrder};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// A single letter, either case.
const GENDER_PATTERN: &str = r"^[A-Za-z]$";

pub struct RequestValidator;

/// A validated `PUT /api/orders/{id}` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub status: OrderStatus,
    pub num_of_item: Option<i64>,
}

impl RequestValidator {
    /// Numeric path id; anything else is a bad request.
    pub fn path_id(raw: &str, kind: &str) -> Result<i64, AppError> {
        raw.trim()
            .parse()
            .map_err(|_| AppError::BadRequest(format!("Invalid {} id '{}'", kind, raw)))
    }

    pub fn customer_filter(params: &HashMap<String, String>) -> Result<CustomerFilter, AppError> {
        let gender = match non_empty(params, "gender") {
            Some(g) => {
                if !gender_pattern()?.is_match(g) {
                    return Err(AppError::BadRequest(format!(
                        "Invalid gender '{}'. Use a single letter such as M or F",
                        g
                    )));
                }
                Some(g.to_uppercase())
            }
            None => None,
        };
        Ok(CustomerFilter {
            search: non_empty(params, "search").map(str::to_string),
            city: non_empty(params, "city").map(str::to_string),
            gender,
        })
    }

    pub fn order_filter(params: &HashMap<String, String>) -> Result<OrderFilter, AppError> {
        let status = non_empty(params, "status").map(str::parse::<OrderStatus>).transpose()?;
        let user_id = non_empty(params, "user_id")
            .map(|s| {
                s.parse::<i64>()
                    .map_err(|_| AppError::BadRequest("user_id must be an integer".into()))
            })
            .transpose()?;
        Ok(OrderFilter { status, user_id })
    }

    pub fn customer_order_query(
        params: &HashMap<String, String>,
    ) -> Result<CustomerOrderQuery, AppError> {
        Ok(CustomerOrderQuery {
            status: non_empty(params, "status").map(str::parse::<OrderStatus>).transpose()?,
            sort_by: non_empty(params, "sort_by")
                .map(str::parse::<SortField>)
                .transpose()?
                .unwrap_or_default(),
            sort_order: non_empty(params, "sort_order")
                .map(str::parse::<SortOrder>)
                .transpose()?
                .unwrap_or_default(),
        })
    }

    pub fn status_change(body: UpdateOrderRequest) -> Result<StatusChange, AppError> {
        let raw = body
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::BadRequest("Missing required field: status".into()))?;
        let status: OrderStatus = raw.parse()?;
        if let Some(n) = body.num_of_item {
            if n < 0 {
                return Err(AppError::BadRequest("num_of_item must be zero or greater".into()));
            }
        }
        Ok(StatusChange {
            status,
            num_of_item: body.num_of_item,
        })
    }
}

/// Compiled once per process.
fn gender_pattern() -> Result<&'static Regex, AppError> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(GENDER_PATTERN))
        .as_ref()
        .map_err(|e| AppError::BadRequest(format!("invalid gender pattern: {}", e)))
}

fn non_empty<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    params.get(key).map(|s| s.trim()).filter(|s| !s.is_empty())
}
