//! service-core: Shared infrastructure for the document portal services.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
pub mod utils;

