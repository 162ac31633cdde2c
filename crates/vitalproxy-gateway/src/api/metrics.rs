use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use vitalproxy_core::domain::Metric;

use crate::app_state::AppState;

use super::ApiResult;

/// `GET /metrics`: newest first; empty when no store is active.
pub async fn list_metrics(State(app): State<AppState>) -> Json<Vec<Metric>> {
    Json(app.recorder().list().await)
}

/// `POST /metrics`: direct write; 503 when no store is active.
pub async fn save_metric(
    State(app): State<AppState>,
    body: Result<Json<Metric>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(metric) = body?;
    app.recorder().try_record(metric).await?;
    Ok((StatusCode::OK, Json(json!({ "message": "Metric saved" }))))
}
