//! Axum router wiring and cross-origin policy.

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::{api, app_state::AppState, ops};

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.cfg().server.cors_origins);

    Router::new()
        .route("/", get(ops::root))
        .route("/health", get(ops::health))
        .route("/predict", post(api::predict::predict))
        .route(
            "/metrics",
            get(api::metrics::list_metrics).post(api::metrics::save_metric),
        )
        .route("/ops/readyz", get(ops::readyz))
        .route("/ops/metrics", get(ops::metrics))
        .layer(cors)
        .with_state(state)
}

/// Fixed origin allow-list with credentials. Methods and headers are mirrored
/// from the preflight, since wildcards are not allowed alongside credentials.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
