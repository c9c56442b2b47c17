pub mod admin;
pub mod catalog;

pub use admin::{AdminLoginRequest, DeleteParams, UploadResponse};
pub use catalog::{
    CatalogResponse, CatalogState, CategoriesResponse, DocumentResponse, GateRequest,
    GateResponse, SessionResponse, SessionUpdate,
};
