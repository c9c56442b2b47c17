use crate::dtos::CatalogResponse;
use crate::error::PortalError;
use crate::models::PortalSession;
use crate::services::catalog_view;
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    response::Redirect,
    Json,
};
use service_core::error::AppError;

/// The catalog as the visitor's current filters and gate state allow.
pub async fn get_catalog(
    State(state): State<AppState>,
    session: PortalSession,
) -> Result<Json<CatalogResponse>, AppError> {
    let documents = state.catalog.documents().await?;
    let view = catalog_view(&documents, &session.state);

    Ok(Json(CatalogResponse::from(view)))
}

/// Redirects to the stored download link. Internal documents stay behind the
/// gate here too, so a guessed id does not bypass it.
pub async fn download_document(
    State(state): State<AppState>,
    session: PortalSession,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let document = state
        .catalog
        .find(&id)
        .await?
        .ok_or_else(|| PortalError::NotFound(id.clone()))?;

    if !session.state.can_view(document.section) {
        tracing::info!(document_id = %id, "Download refused for locked section");
        return Err(PortalError::Locked.into());
    }

    if !is_followable(&document.download_url) {
        tracing::warn!(document_id = %id, url = %document.download_url, "Document has no usable download link");
        return Err(PortalError::NotFound(id).into());
    }

    metrics::counter!("portal_downloads_total", "section" => document.section.as_str())
        .increment(1);

    Ok(Redirect::to(&document.download_url))
}

/// Placeholder links such as `#` are stored but never followed.
fn is_followable(url: &str) -> bool {
    url.starts_with("https://")
        || url.starts_with("http://")
        || (url.starts_with('/') && !url.starts_with("//"))
}
