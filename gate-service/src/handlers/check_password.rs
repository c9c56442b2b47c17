use crate::startup::GateState;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use metrics::counter;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::json;
use service_core::utils::secrets_match;

pub const ACCESS_GRANTED: &str = "Akses diberikan";
pub const WRONG_PASSWORD: &str = "Password salah";

#[derive(Debug, Default, Deserialize)]
pub struct CheckPasswordRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckPasswordResponse {
    pub success: bool,
    pub message: String,
}

/// Compares the submitted password with the configured internal secret.
///
/// A body that is missing, not JSON, or lacks `password` is treated as a
/// wrong password rather than a client error, so callers only ever see the
/// 200/401 verdicts.
pub async fn check_password(State(state): State<GateState>, body: Bytes) -> impl IntoResponse {
    let request: CheckPasswordRequest = serde_json::from_slice(&body).unwrap_or_default();

    if secrets_match(state.internal_password.expose_secret(), &request.password) {
        counter!("gate_checks_total", "outcome" => "granted").increment(1);
        tracing::info!("Internal access granted");
        (
            StatusCode::OK,
            Json(CheckPasswordResponse {
                success: true,
                message: ACCESS_GRANTED.to_string(),
            }),
        )
    } else {
        counter!("gate_checks_total", "outcome" => "denied").increment(1);
        tracing::info!("Internal access denied");
        (
            StatusCode::UNAUTHORIZED,
            Json(CheckPasswordResponse {
                success: false,
                message: WRONG_PASSWORD.to_string(),
            }),
        )
    }
}

pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "message": "Method not allowed" })),
    )
}
