use crate::dtos::{GateRequest, GateResponse, SessionResponse};
use crate::error::PortalError;
use crate::models::PortalSession;
use crate::startup::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use service_core::error::AppError;
use service_core::middleware::RequestId;

const ACCESS_GRANTED: &str = "Akses diberikan";

/// Submits the internal password to gate-service. A denial answers 401 with
/// the gate's message; an unreachable gate answers 502 and never counts as a
/// wrong password.
pub async fn unlock_internal(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    mut session: PortalSession,
    body: Bytes,
) -> Result<Response, AppError> {
    // Unparseable bodies are judged as an empty password.
    let request: GateRequest = serde_json::from_slice(&body).unwrap_or_default();

    match state
        .gate
        .submit_internal_secret(&mut session.state, &request.password, Some(&request_id.0))
        .await
    {
        Ok(_) => {
            session.save().await?;
            tracing::info!(request_id = %request_id.0, "Internal section unlocked");
            Ok(Json(GateResponse {
                success: true,
                message: ACCESS_GRANTED.to_string(),
            })
            .into_response())
        }
        Err(PortalError::Denied(message)) => Ok((
            StatusCode::UNAUTHORIZED,
            Json(GateResponse {
                success: false,
                message,
            }),
        )
            .into_response()),
        Err(e) => Err(e.into()),
    }
}

pub async fn lock_internal(mut session: PortalSession) -> Result<Json<SessionResponse>, AppError> {
    session.state.lock_internal();
    session.save().await?;

    Ok(Json(SessionResponse::from(&session.state)))
}
