pub mod response;

use crate::features::{self, FeatureState};
use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;

/// Hard cap on request bodies. Multipart uploads above this are cut off
/// by the framework (413) before the per-file limit check ever runs;
/// the cap sits well above the 5 MiB file limit so the friendlier 400
/// path handles everything that can be parsed.
pub const MAX_REQUEST_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Create the application router with all routes and middleware
pub fn create_router(state: FeatureState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api", features::router())
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Coversum Server",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

/// Liveness check that verifies store connectivity
async fn health(State(state): State<FeatureState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable")
        },
    }
}
