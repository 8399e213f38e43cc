use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// Service banner at the root path.
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "service": "Opora Support API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
