//! Secret-check endpoint guarding the portal's Internal section.
//!
//! The internal secret lives only in this process; the portal forwards a
//! visitor's candidate and learns nothing but the verdict.
pub mod config;
pub mod handlers;
pub mod startup;
