use crate::dtos::{CategoriesResponse, SessionResponse, SessionUpdate};
use crate::models::{CategoryFilter, PortalSession, Section};
use axum::Json;
use service_core::error::AppError;

pub async fn get_session(session: PortalSession) -> Json<SessionResponse> {
    Json(SessionResponse::from(&session.state))
}

/// Applies search, category and section changes. Switching to Eksternal
/// relocks the Internal section; the other filters carry over.
pub async fn update_session(
    mut session: PortalSession,
    Json(update): Json<SessionUpdate>,
) -> Result<Json<SessionResponse>, AppError> {
    update.apply(&mut session.state);
    session.save().await?;

    Ok(Json(SessionResponse::from(&session.state)))
}

pub async fn list_categories() -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        categories: CategoryFilter::ALL.to_vec(),
        sections: Section::ALL.to_vec(),
    })
}
