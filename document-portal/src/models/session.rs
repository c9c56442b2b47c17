use crate::models::{CategoryFilter, Section};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use tower_sessions::Session;

const SESSION_STATE_KEY: &str = "portal_state";

/// Browsing state of one visitor. Created with the session, mutated only
/// through the setters below, discarded when the session expires.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    search_term: String,
    selected_category: CategoryFilter,
    selected_section: Section,
    internal_unlocked: bool,
    admin_authenticated: bool,
}

impl SessionState {
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn selected_category(&self) -> CategoryFilter {
        self.selected_category
    }

    pub fn selected_section(&self) -> Section {
        self.selected_section
    }

    pub fn internal_unlocked(&self) -> bool {
        self.internal_unlocked
    }

    pub fn admin_authenticated(&self) -> bool {
        self.admin_authenticated
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn select_category(&mut self, category: CategoryFilter) {
        self.selected_category = category;
    }

    /// Switching sections keeps the search term and category. Leaving for
    /// Eksternal relocks the Internal section.
    pub fn select_section(&mut self, section: Section) {
        self.selected_section = section;
        if section == Section::Eksternal {
            self.internal_unlocked = false;
        }
    }

    pub fn unlock_internal(&mut self) {
        self.internal_unlocked = true;
    }

    pub fn lock_internal(&mut self) {
        self.internal_unlocked = false;
    }

    /// Whether documents of `section` may be shown or downloaded.
    pub fn can_view(&self, section: Section) -> bool {
        !section.is_gated() || self.internal_unlocked
    }

    pub fn sign_in_admin(&mut self) {
        self.admin_authenticated = true;
    }

    pub fn sign_out_admin(&mut self) {
        self.admin_authenticated = false;
    }
}

/// The visitor's `SessionState` loaded from the session store. Handlers that
/// change it call [`PortalSession::save`].
pub struct PortalSession {
    session: Session,
    pub state: SessionState,
}

impl PortalSession {
    pub async fn save(&self) -> Result<(), AppError> {
        self.session
            .insert(SESSION_STATE_KEY, &self.state)
            .await
            .map_err(|e| {
                tracing::error!("Failed to persist session state: {}", e);
                AppError::InternalError(anyhow::anyhow!("Failed to persist session: {}", e))
            })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for PortalSession
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(status, msg)| (status, msg).into_response())?;

        let state: SessionState = match session.get(SESSION_STATE_KEY).await {
            Ok(state) => state.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Discarding unreadable session state: {}", e);
                SessionState::default()
            }
        };

        Ok(PortalSession { session, state })
    }
}

/// A session that passed the admin gate.
pub struct AdminSession(pub PortalSession);

#[async_trait]
impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = PortalSession::from_request_parts(parts, state).await?;

        if !session.state.admin_authenticated() {
            return Err(AppError::Unauthorized(anyhow::anyhow!("Admin login required"))
                .into_response());
        }

        Ok(AdminSession(session))
    }
}
