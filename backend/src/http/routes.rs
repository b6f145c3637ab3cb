use axum::{Router, http::Method, routing::get};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::AppState;
use super::handlers;
use crate::config::CorsOrigins;

pub fn create_router(state: AppState, origins: &CorsOrigins) -> Router {
    Router::new()
        .route("/get_stock_data", get(handlers::get_stock_data))
        .route("/get_last_updated", get(handlers::get_last_updated))
        .route("/health", get(handlers::health))
        .layer(cors_layer(origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Read-only cross-origin access for the configured origins.
pub fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods([Method::GET]);

    match origins {
        CorsOrigins::Any => layer.allow_origin(Any),
        CorsOrigins::List(list) => layer.allow_origin(AllowOrigin::list(list.iter().cloned())),
    }
}
