use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use vitalproxy_core::domain::PatientFeatures;
use vitalproxy_core::error::VitalError;

use crate::app_state::AppState;

use super::ApiResult;

/// `POST /predict`
///
/// The scorer call runs on its own task: if the client goes away the call and
/// its metric write still complete.
pub async fn predict(
    State(app): State<AppState>,
    body: Result<Json<PatientFeatures>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(features) = body?;

    let proxy = app.proxy();
    let scored = tokio::spawn(async move { proxy.predict(features).await })
        .await
        .map_err(|e| VitalError::Internal(format!("scoring task failed: {e}")))??;

    Ok(([(header::CONTENT_TYPE, "application/json")], scored).into_response())
}
