//! Extract query-string parameters plus validated pagination for list endpoints.

use crate::error::AppError;
use crate::models::PageRequest;
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use std::collections::HashMap;

/// Raw query parameters and the `page` / `per_page` pair already checked.
/// Rejects with a JSON 400 instead of axum's plain-text rejection.
#[derive(Clone, Debug)]
pub struct ListParams {
    pub page: PageRequest,
    pub params: HashMap<String, String>,
}

#[async_trait]
impl<S> FromRequestParts<S> for ListParams
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .map_err(|e| AppError::BadRequest(format!("Invalid query string: {}", e.body_text())))?;
        let page = PageRequest::from_params(&params)?;
        Ok(ListParams { page, params })
    }
}
