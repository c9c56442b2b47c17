pub mod document;
pub mod session;

pub use document::{Category, CategoryFilter, DocumentFields, DocumentRecord, FileType, Section};
pub use session::{AdminSession, PortalSession, SessionState};
