use crate::services::storage::UploadClass;
use service_core::error::AppError;
use thiserror::Error;

/// Failures of portal operations, grouped the way callers must react to them:
/// validation errors happen before any network call, gate denials and
/// transport failures are reported differently, and backend errors carry the
/// underlying message. None of them is fatal; every one can be retried.
#[derive(Debug, Error)]
pub enum PortalError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Invalid(#[from] validator::ValidationErrors),

    #[error("{class} exceeds the {limit_mib} MiB limit")]
    FileTooLarge { class: UploadClass, limit_mib: u64 },

    #[error("{0}")]
    Denied(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Internal section is locked")]
    Locked,

    #[error("connection failed")]
    Transport(#[source] anyhow::Error),

    #[error("Catalog error: {0}")]
    Catalog(anyhow::Error),

    #[error("Storage error: {0}")]
    Storage(anyhow::Error),

    #[error("Document {0} not found")]
    NotFound(String),

    #[error("Another operation is still in progress")]
    Busy,

    /// The write went through; only the refresh of the catalog failed.
    #[error("Document {id} was saved but the catalog could not be reloaded")]
    ReloadFailed {
        id: String,
        #[source]
        source: Box<PortalError>,
    },
}

impl From<mongodb::error::Error> for PortalError {
    fn from(err: mongodb::error::Error) -> Self {
        PortalError::Catalog(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for PortalError {
    fn from(err: std::io::Error) -> Self {
        PortalError::Storage(anyhow::Error::new(err))
    }
}

impl From<PortalError> for AppError {
    fn from(err: PortalError) -> Self {
        match err {
            PortalError::Validation(msg) => AppError::BadRequest(anyhow::anyhow!(msg)),
            PortalError::Invalid(errors) => AppError::ValidationError(errors),
            e @ PortalError::FileTooLarge { .. } => {
                AppError::PayloadTooLarge(anyhow::anyhow!(e.to_string()))
            }
            PortalError::Denied(msg) | PortalError::Unauthorized(msg) => {
                AppError::Unauthorized(anyhow::anyhow!(msg))
            }
            e @ PortalError::Locked => AppError::Forbidden(anyhow::anyhow!(e.to_string())),
            PortalError::Transport(source) => {
                tracing::warn!(error = %source, "Gate service unreachable");
                AppError::BadGateway("connection failed".to_string())
            }
            PortalError::Catalog(e) => AppError::DatabaseError(e),
            PortalError::Storage(e) => AppError::StorageError(e),
            e @ PortalError::NotFound(_) => AppError::NotFound(anyhow::anyhow!(e.to_string())),
            e @ PortalError::Busy => AppError::Conflict(anyhow::anyhow!(e.to_string())),
            PortalError::ReloadFailed { id, source } => AppError::DatabaseError(anyhow::anyhow!(
                "Document {} was saved but the catalog could not be reloaded: {}",
                id,
                source
            )),
        }
    }
}
