use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use service_core::observability::get_metrics;

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "document-portal",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Reports whether the catalog backend answers.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let catalog = match &state.mongo {
        Some(mongo) => match mongo.health_check().await {
            Ok(()) => "up",
            Err(e) => {
                tracing::warn!("MongoDB readiness check failed: {}", e);
                "down"
            }
        },
        None => "memory",
    };

    if catalog == "down" {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "not ready", "catalog": catalog })),
        )
    } else {
        (StatusCode::OK, Json(json!({ "status": "ready", "catalog": catalog })))
    }
}

pub async fn metrics_endpoint() -> impl IntoResponse {
    get_metrics()
}
