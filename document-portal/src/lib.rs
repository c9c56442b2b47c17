//! Document-sharing portal: a filtered catalog split into an open Eksternal
//! section and an Internal section behind a password checked by
//! gate-service, plus an admin editor for the catalog and its files.

pub mod config;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
