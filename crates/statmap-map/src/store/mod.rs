//! Persistence of mapping records.
//!
//! A store keeps one record per target data set version. Besides whole
//! record reads and writes it supports targeted updates of scalar fields at a
//! [`MappingPath`], so an edit to one entry never rewrites its siblings.
//!
//! - [`MemoryMappingStore`] keeps JSON documents in memory
//! - [`FileMappingStore`] keeps one JSON file per version, written atomically

mod file;
mod memory;

use std::path::PathBuf;

use serde_json::Value;
use statmap_model::{DataSetVersionId, DataSetVersionMapping};
use thiserror::Error;

use crate::path::{MappingField, MappingPath};

pub use file::{FileMappingStore, StoredMappingMetadata};
pub use memory::MemoryMappingStore;

/// Store operation error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// File I/O error.
    #[error("Failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize mapping record")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to deserialize mapping record at {location}")]
    Deserialization {
        location: String,
        #[source]
        source: serde_json::Error,
    },

    /// Atomic write failed (temp file couldn't be renamed).
    #[error("Failed to complete save operation")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The record exists but has no entry at the addressed path.
    #[error("No entry at {path} in mapping for {id}")]
    MissingPath { id: DataSetVersionId, path: String },

    /// The record addressed by a partial update does not exist.
    #[error("No mapping stored for {0}")]
    MissingRecord(DataSetVersionId),

    /// The stored document belongs to a different target version.
    #[error("Mapping at {location} is for {found}, expected {expected}")]
    VersionMismatch {
        location: String,
        expected: DataSetVersionId,
        found: String,
    },

    #[error("Mapping store lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                operation, path, ..
            } => format!("Could not {} the file at {}", operation, path.display()),
            Self::Serialization { .. } => {
                "An error occurred while saving the mapping.".to_string()
            }
            Self::Deserialization { location, .. } => format!(
                "The stored mapping at {location} could not be read. It may be corrupted."
            ),
            Self::AtomicWriteFailed { target_path, .. } => format!(
                "Could not save the mapping to {}. Please check disk space and permissions.",
                target_path.display()
            ),
            Self::MissingPath { path, .. } => format!("The mapping has no entry at {path}."),
            Self::MissingRecord(id) => format!("No mapping has been created for version {id}."),
            Self::VersionMismatch {
                location, expected, ..
            } => format!(
                "The stored mapping at {location} does not belong to version {expected}."
            ),
            Self::LockPoisoned => {
                "The mapping store is unavailable after an earlier failure.".to_string()
            }
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// One scalar write; `None` removes the field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldWrite {
    pub field: MappingField,
    pub value: Option<Value>,
}

impl FieldWrite {
    pub fn set(field: MappingField, value: impl Into<Value>) -> Self {
        Self {
            field,
            value: Some(value.into()),
        }
    }

    pub fn clear(field: MappingField) -> Self {
        Self { field, value: None }
    }
}

/// Storage seam for mapping records.
pub trait MappingStore: Send + Sync {
    fn load(&self, id: &DataSetVersionId) -> StoreResult<Option<DataSetVersionMapping>>;

    /// Writes a whole record unless one is stored for its target version.
    ///
    /// The check and the write happen under one lock. Returns `false`, leaving
    /// the stored record untouched, when one already exists.
    fn insert(&self, mapping: &DataSetVersionMapping) -> StoreResult<bool>;

    fn delete(&self, id: &DataSetVersionId) -> StoreResult<bool>;

    fn exists(&self, id: &DataSetVersionId) -> StoreResult<bool> {
        Ok(self.load(id)?.is_some())
    }

    /// Raw JSON of the entry at `path`, if the record and entry exist.
    fn read_path(&self, id: &DataSetVersionId, path: &MappingPath) -> StoreResult<Option<Value>>;

    /// Applies every write to the entry at `path` as one atomic update.
    ///
    /// Either all writes land or none do; other entries are untouched.
    fn write_fields(
        &self,
        id: &DataSetVersionId,
        path: &MappingPath,
        writes: &[FieldWrite],
    ) -> StoreResult<()>;
}

/// Applies `writes` to the entry object at `path` inside `document`.
pub(crate) fn apply_field_writes(
    document: &mut Value,
    id: &DataSetVersionId,
    path: &MappingPath,
    writes: &[FieldWrite],
) -> StoreResult<()> {
    let missing = || StoreError::MissingPath {
        id: id.clone(),
        path: path.to_string(),
    };
    let entry = document
        .pointer_mut(&path.pointer())
        .and_then(Value::as_object_mut)
        .ok_or_else(missing)?;
    // Build the new entry aside and swap it in so a failure cannot leave a
    // half-written entry behind.
    let mut updated = entry.clone();
    for write in writes {
        match &write.value {
            Some(value) => {
                updated.insert(write.field.name().to_string(), value.clone());
            }
            None => {
                updated.remove(write.field.name());
            }
        }
    }
    *entry = updated;
    Ok(())
}

/// Checks that `document` is the record of `id`.
pub(crate) fn ensure_version(
    document: &Value,
    id: &DataSetVersionId,
    location: impl Into<String>,
) -> StoreResult<()> {
    let found = document
        .get("targetVersionId")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if found == id.as_str() {
        return Ok(());
    }
    Err(StoreError::VersionMismatch {
        location: location.into(),
        expected: id.clone(),
        found: found.to_string(),
    })
}

pub(crate) fn to_document(mapping: &DataSetVersionMapping) -> StoreResult<Value> {
    serde_json::to_value(mapping).map_err(|source| StoreError::Serialization { source })
}

pub(crate) fn from_document(
    document: Value,
    location: impl Into<String>,
) -> StoreResult<DataSetVersionMapping> {
    serde_json::from_value(document).map_err(|source| StoreError::Deserialization {
        location: location.into(),
        source,
    })
}
