//! Customer handlers: list, detail, per-customer orders, order history.

use crate::error::AppError;
use crate::extractors::ListParams;
use crate::models::{
    CustomerDetail, CustomerOrderAnalytics, CustomerRef, CustomerSummary, Order, OrderStatus,
};
use crate::response::Pagination;
use crate::service::{CustomerService, RequestValidator};
use crate::sql::{SortField, SortOrder};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Serialize;

#[derive(Serialize)]
pub struct CustomerListResponse {
    pub customers: Vec<CustomerSummary>,
    pub pagination: Pagination,
}

#[derive(Serialize)]
pub struct AppliedOrderFilters {
    pub status: Option<OrderStatus>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

#[derive(Serialize)]
pub struct CustomerOrdersResponse {
    pub customer: CustomerRef,
    pub orders: Vec<Order>,
    pub pagination: Pagination,
    pub analytics: CustomerOrderAnalytics,
    pub filters: AppliedOrderFilters,
}

/// GET /api/customers
pub async fn list_customers(
    State(state): State<AppState>,
    list: ListParams,
) -> Result<impl IntoResponse, AppError> {
    let filter = RequestValidator::customer_filter(&list.params)?;
    let mut conn = state.db.connect().await?;
    let (customers, total) = CustomerService::list(&mut conn, &filter, list.page).await?;
    Ok(Json(CustomerListResponse {
        customers,
        pagination: Pagination::new(list.page.page, list.page.per_page, total),
    }))
}

/// GET /api/customers/:id
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = RequestValidator::path_id(&id, "customer")?;
    let mut conn = state.db.connect().await?;
    let customer = CustomerService::require(&mut conn, id).await?;
    let orders = CustomerService::orders(&mut conn, id).await?;
    Ok(Json(CustomerDetail { customer, orders }))
}

/// GET /api/customers/:id/orders
pub async fn get_customer_orders(
    State(state): State<AppState>,
    Path(id): Path<String>,
    list: ListParams,
) -> Result<impl IntoResponse, AppError> {
    let id = RequestValidator::path_id(&id, "customer")?;
    let query = RequestValidator::customer_order_query(&list.params)?;
    let mut conn = state.db.connect().await?;
    let customer = CustomerService::require(&mut conn, id).await?;
    let (orders, total) = CustomerService::orders_page(&mut conn, id, query, list.page).await?;
    let analytics = CustomerService::order_analytics(&mut conn, id).await?;
    Ok(Json(CustomerOrdersResponse {
        customer: CustomerRef::from(&customer),
        orders,
        pagination: Pagination::new(list.page.page, list.page.per_page, total),
        analytics,
        filters: AppliedOrderFilters {
            status: query.status,
            sort_by: query.sort_by,
            sort_order: query.sort_order,
        },
    }))
}

/// GET /api/customers/:id/order-history
pub async fn get_customer_order_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = RequestValidator::path_id(&id, "customer")?;
    let mut conn = state.db.connect().await?;
    let customer = CustomerService::require(&mut conn, id).await?;
    let history = CustomerService::order_history(&mut conn, &customer).await?;
    Ok(Json(history))
}
