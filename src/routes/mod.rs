//! Router assembly: common routes, the `/api` surface and the shared layers.

mod api;
mod common;
pub use api::api_routes;
pub use common::common_routes;

use crate::config::AppConfig;
use crate::error::ErrorBody;
use crate::state::AppState;
use axum::{http::StatusCode, response::IntoResponse, Json, Router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "Resource not found".into(),
        }),
    )
}

/// Full application router.
pub fn app(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .merge(api_routes(state))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                // must stay outside Cors: Cors needs a Default response body
                .layer(RequestBodyLimitLayer::new(config.body_limit_bytes))
                .layer(CorsLayer::permissive()),
        )
}
