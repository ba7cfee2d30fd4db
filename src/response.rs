//! Response envelope helpers: pagination metadata and rounding of derived metrics.

use serde::Serialize;

/// `{page, per_page, total, pages}` attached to every list response.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub pages: u64,
}

impl Pagination {
    pub fn new(page: u32, per_page: u32, total: u64) -> Self {
        let pages = if per_page == 0 {
            0
        } else {
            total.div_ceil(u64::from(per_page))
        };
        Pagination {
            page,
            per_page,
            total,
            pages,
        }
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part / whole * 100`, rounded; 0 when `whole` is 0.
pub fn percentage(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round2(part as f64 * 100.0 / whole as f64)
}

/// Rounded average for an optional SQL aggregate; NULL becomes 0.
pub fn rounded_or_zero(value: Option<f64>) -> f64 {
    value.map(round2).unwrap_or(0.0)
}
