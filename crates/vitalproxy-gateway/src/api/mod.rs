//! JSON API handlers (`/predict`, `/metrics`) and the error envelope.

pub mod metrics;
pub mod predict;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use vitalproxy_core::error::VitalError;

/// `VitalError` rendered as `{"detail": ..., "code": ...}`.
#[derive(Debug)]
pub struct HttpError(pub VitalError);

impl From<VitalError> for HttpError {
    fn from(e: VitalError) -> Self {
        Self(e)
    }
}

/// Body extraction failures (missing field, wrong type, bad JSON, wrong
/// content type) are all client validation errors.
impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        Self(VitalError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let code = self.0.client_code();
        let status =
            StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(json!({
            "detail": self.0.to_string(),
            "code": code.as_str(),
        }));
        (status, body).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, HttpError>;
