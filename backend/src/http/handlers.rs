use axum::{Json, extract::State};
use serde::Serialize;

use market::SnapshotView;

use super::AppState;
use crate::error::ApiError;

/// `GET /get_stock_data`
pub async fn get_stock_data(State(state): State<AppState>) -> Result<Json<SnapshotView>, ApiError> {
    state.query.get_quotes().await.map(Json)
}

#[derive(Debug, Serialize)]
pub struct LastUpdatedResponse {
    pub last_updated: Option<String>,
}

/// `GET /get_last_updated`
pub async fn get_last_updated(State(state): State<AppState>) -> Json<LastUpdatedResponse> {
    Json(LastUpdatedResponse {
        last_updated: state.query.last_updated(),
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
