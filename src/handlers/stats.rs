//! Statistics handlers. Read-only aggregates over both tables.

use crate::error::AppError;
use crate::service::AnalyticsService;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};

/// GET /api/stats/overview
pub async fn overview(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut conn = state.db.connect().await?;
    Ok(Json(AnalyticsService::overview(&mut conn).await?))
}

/// GET /api/stats/customers
pub async fn customer_stats(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut conn = state.db.connect().await?;
    Ok(Json(AnalyticsService::customer_stats(&mut conn).await?))
}

/// GET /api/stats/orders
pub async fn order_stats(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut conn = state.db.connect().await?;
    Ok(Json(AnalyticsService::order_stats(&mut conn).await?))
}

/// GET /api/orders/analytics/summary
pub async fn order_summary(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut conn = state.db.connect().await?;
    Ok(Json(AnalyticsService::order_summary(&mut conn).await?))
}
