//! `/api` routes for customers, orders and statistics.

use crate::handlers::{
    bulk_update_status, customer_stats, get_customer, get_customer_order_history,
    get_customer_orders, get_order, list_customers, list_orders, order_stats, order_summary,
    overview, update_order,
};
use crate::state::AppState;
use axum::{
    routing::{get, put},
    Router,
};

pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/customers", get(list_customers))
        .route("/api/customers/:id", get(get_customer))
        .route("/api/customers/:id/orders", get(get_customer_orders))
        .route(
            "/api/customers/:id/order-history",
            get(get_customer_order_history),
        )
        .route("/api/orders", get(list_orders))
        .route("/api/orders/bulk/status", put(bulk_update_status))
        .route("/api/orders/analytics/summary", get(order_summary))
        .route("/api/orders/:id", get(get_order).put(update_order))
        .route("/api/stats/overview", get(overview))
        .route("/api/stats/customers", get(customer_stats))
        .route("/api/stats/orders", get(order_stats))
        .with_state(state)
}
