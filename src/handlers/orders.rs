//! Order handlers: list, detail, single and bulk status updates.

use crate::error::AppError;
use crate::extractors::ListParams;
use crate::models::{BulkStatusRequest, OrderDetail, OrderListItem, UpdateOrderRequest};
use crate::response::Pagination;
use crate::service::{OrderService, RequestValidator};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::IntoResponse,
    Json,
};
use serde::Serialize;

#[derive(Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<OrderListItem>,
    pub pagination: Pagination,
}

#[derive(Serialize)]
pub struct OrderUpdateResponse {
    pub message: String,
    pub order: OrderDetail,
}

/// GET /api/orders
pub async fn list_orders(
    State(state): State<AppState>,
    list: ListParams,
) -> Result<impl IntoResponse, AppError> {
    let filter = RequestValidator::order_filter(&list.params)?;
    let mut conn = state.db.connect().await?;
    let (orders, total) = OrderService::list(&mut conn, &filter, list.page).await?;
    Ok(Json(OrderListResponse {
        orders,
        pagination: Pagination::new(list.page.page, list.page.per_page, total),
    }))
}

/// GET /api/orders/:id
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = RequestValidator::path_id(&id, "order")?;
    let mut conn = state.db.connect().await?;
    let order = OrderService::require(&mut conn, id).await?;
    Ok(Json(order))
}

/// PUT /api/orders/:id
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateOrderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = RequestValidator::path_id(&id, "order")?;
    let Json(body) = payload?;
    let change = RequestValidator::status_change(body)?;
    let mut conn = state.db.connect().await?;
    let order = OrderService::update(&mut conn, id, change).await?;
    Ok(Json(OrderUpdateResponse {
        message: format!("Order {} updated to {}", id, change.status),
        order,
    }))
}

/// PUT /api/orders/bulk/status
pub async fn bulk_update_status(
    State(state): State<AppState>,
    payload: Result<Json<BulkStatusRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = payload?;
    let items = body.into_items();
    let mut conn = state.db.connect().await?;
    let outcome = OrderService::bulk_update_status(&mut conn, &items).await?;
    Ok(Json(outcome))
}
