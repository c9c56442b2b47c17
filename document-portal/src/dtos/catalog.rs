use crate::models::{
    Category, CategoryFilter, DocumentRecord, FileType, Section, SessionState,
};
use crate::services::filter::CatalogView;
use serde::{Deserialize, Serialize};

pub const EMPTY_STATE_MESSAGE: &str = "Tidak ada dokumen ditemukan";
pub const LOCKED_MESSAGE: &str = "Masukkan password untuk membuka dokumen internal";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub file_type: FileType,
    pub section: Section,
    pub thumbnail_url: Option<String>,
    pub download_url: String,
    pub created_at: String,
}

impl From<DocumentRecord> for DocumentResponse {
    fn from(doc: DocumentRecord) -> Self {
        Self {
            id: doc.id,
            title: doc.title,
            description: doc.description,
            category: doc.category,
            file_type: doc.file_type,
            section: doc.section,
            thumbnail_url: doc.thumbnail_url,
            download_url: doc.download_url,
            created_at: doc.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CatalogState {
    Locked,
    Empty,
    Ok,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub state: CatalogState,
    pub documents: Vec<DocumentResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<CatalogView> for CatalogResponse {
    fn from(view: CatalogView) -> Self {
        match view {
            CatalogView::Locked => Self {
                state: CatalogState::Locked,
                documents: Vec::new(),
                message: Some(LOCKED_MESSAGE.to_string()),
            },
            CatalogView::Empty => Self {
                state: CatalogState::Empty,
                documents: Vec::new(),
                message: Some(EMPTY_STATE_MESSAGE.to_string()),
            },
            CatalogView::Documents(docs) => Self {
                state: CatalogState::Ok,
                documents: docs.into_iter().map(DocumentResponse::from).collect(),
                message: None,
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub search_term: String,
    pub selected_category: CategoryFilter,
    pub selected_section: Section,
    pub internal_unlocked: bool,
    pub admin_authenticated: bool,
}

impl From<&SessionState> for SessionResponse {
    fn from(state: &SessionState) -> Self {
        Self {
            search_term: state.search_term().to_string(),
            selected_category: state.selected_category(),
            selected_section: state.selected_section(),
            internal_unlocked: state.internal_unlocked(),
            admin_authenticated: state.admin_authenticated(),
        }
    }
}

/// Partial update of the browsing filters; absent fields are left alone.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUpdate {
    pub search_term: Option<String>,
    pub selected_category: Option<CategoryFilter>,
    pub selected_section: Option<Section>,
}

impl SessionUpdate {
    pub fn apply(self, state: &mut SessionState) {
        if let Some(term) = self.search_term {
            state.set_search_term(term);
        }
        if let Some(category) = self.selected_category {
            state.select_category(category);
        }
        if let Some(section) = self.selected_section {
            state.select_section(section);
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<CategoryFilter>,
    pub sections: Vec<Section>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GateRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GateResponse {
    pub success: bool,
    pub message: String,
}
