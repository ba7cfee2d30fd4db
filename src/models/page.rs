//! Page / per_page parsing shared by every list endpoint.

use crate::error::AppError;
use std::collections::HashMap;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    /// Read `page` and `per_page` from query parameters. `per_page` above the
    /// maximum is clamped; zero, negative or non-numeric values are rejected.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, AppError> {
        let page = parse_positive(params, "page")?.unwrap_or(u64::from(DEFAULT_PAGE));
        let per_page = parse_positive(params, "per_page")?.unwrap_or(u64::from(DEFAULT_PER_PAGE));
        let page = u32::try_from(page)
            .map_err(|_| AppError::BadRequest("page is out of range".into()))?;
        let per_page = per_page.min(u64::from(MAX_PER_PAGE)) as u32;
        Ok(PageRequest { page, per_page })
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.per_page)
    }
}

/// Positive integer parameter. Values too large for `u64` saturate so that
/// clamping still applies to them.
fn parse_positive(params: &HashMap<String, String>, key: &str) -> Result<Option<u64>, AppError> {
    let Some(raw) = params.get(key).map(|s| s.trim()).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::BadRequest(format!("{} must be an integer", key)));
    }
    let n = digits.parse::<u64>().unwrap_or(u64::MAX);
    if negative || n < 1 {
        return Err(AppError::BadRequest(format!("{} must be at least 1", key)));
    }
    Ok(Some(n))
}
