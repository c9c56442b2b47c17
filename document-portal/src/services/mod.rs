pub mod catalog;
pub mod editor;
pub mod filter;
pub mod gate;
pub mod storage;

pub use catalog::{CatalogRepository, CatalogStore, InMemoryCatalog, MongoCatalog};
pub use editor::{AdminEditor, DocumentForm};
pub use filter::{catalog_view, visible_documents, CatalogView};
pub use gate::{AccessGate, AdminGate, GateClient, SecretVerifier, Unlocked};
pub use storage::{Bucket, FileUpload, LocalObjectStore, ObjectStore, PublicUrl, UploadClass};
