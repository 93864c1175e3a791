//! Error types for mapping operations.

use statmap_model::DataSetVersionId;
use thiserror::Error;

use crate::store::StoreError;

/// Errors from mapping operations.
#[derive(Debug, Error)]
pub enum MappingError {
    /// No mapping record exists for the data set version.
    #[error("mapping for data set version {0} not found")]
    NotFound(DataSetVersionId),
    /// The request addresses something that does not exist or breaks an invariant.
    #[error("invalid mapping update at {path}: {message}")]
    Validation { path: String, message: String },
    /// A record already exists; auto-mapping only runs when a record is first created.
    #[error("mapping for data set version {0} already exists")]
    AlreadyExists(DataSetVersionId),
    #[error("operation cancelled")]
    Cancelled,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("mapping task failed")]
    Task(#[source] tokio::task::JoinError),
}

impl MappingError {
    pub(crate) fn validation(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            path: path.into(),
            message: message.into(),
        }
    }

    /// True for errors a caller should surface as "not found".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, MappingError>;
