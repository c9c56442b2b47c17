pub mod admin;
pub mod catalog;
pub mod gate;
pub mod health;
pub mod session;

pub use admin::{
    admin_login, admin_logout, create_document, delete_document, update_document, upload_file,
};
pub use catalog::{download_document, get_catalog};
pub use gate::{lock_internal, unlock_internal};
pub use health::{health_check, metrics_endpoint, readiness_check};
pub use session::{get_session, list_categories, update_session};
