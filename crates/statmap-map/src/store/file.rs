//! File-system store for mapping records.
//!
//! Each record is stored as a JSON file named after its target data set
//! version: `{encoded_id}.json`, where lowercase ASCII letters, digits and
//! `-` are kept and every other byte is written as `_XX` (uppercase hex).
//! Distinct ids therefore never share a file, even on case-insensitive file
//! systems. Writes go to a temp file first and are renamed into place, so a
//! crash never leaves a truncated record.

use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use statmap_model::{DataSetVersionId, DataSetVersionMapping};

use super::{
    FieldWrite, MappingStore, StoreError, StoreResult, apply_field_writes, ensure_version,
    from_document, to_document,
};
use crate::path::MappingPath;

/// Store keeping one JSON file per mapping record.
#[derive(Debug)]
pub struct FileMappingStore {
    /// Base directory for mapping files.
    base_dir: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

/// Metadata about a stored mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMappingMetadata {
    pub source_version_id: DataSetVersionId,
    pub target_version_id: DataSetVersionId,
    pub file_path: PathBuf,
    /// Number of entries, filter columns included.
    pub entry_count: usize,
    /// Entries that no candidate corresponds to.
    pub unmapped_count: usize,
}

impl FileMappingStore {
    /// Create a store at the given directory.
    ///
    /// The directory will be created if it doesn't exist.
    pub fn new(base_dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir).map_err(|source| StoreError::Io {
            operation: "create directory",
            path: base_dir.clone(),
            source,
        })?;
        Ok(Self {
            base_dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of the file holding the record for `id`.
    pub fn record_path(&self, id: &DataSetVersionId) -> PathBuf {
        self.base_dir.join(format!("{}.json", encode_id(id.as_str())))
    }

    /// List all stored mappings, ordered by target version id.
    pub fn list(&self) -> StoreResult<Vec<StoredMappingMetadata>> {
        let entries = fs::read_dir(&self.base_dir).map_err(|source| StoreError::Io {
            operation: "read",
            path: self.base_dir.clone(),
            source,
        })?;
        let mut metadata = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                operation: "read",
                path: self.base_dir.clone(),
                source,
            })?;
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(document) = read_document(&path)? else {
                continue;
            };
            match from_document(document, path.display().to_string()) {
                Ok(mapping) => metadata.push(StoredMappingMetadata {
                    entry_count: mapping.mapping_types().count(),
                    unmapped_count: mapping
                        .mapping_types()
                        .filter(|mapping_type| mapping_type.is_unmapped())
                        .count(),
                    source_version_id: mapping.source_version_id,
                    target_version_id: mapping.target_version_id,
                    file_path: path,
                }),
                Err(error) => {
                    tracing::warn!(
                        path = %path.display(),
                        %error,
                        "skipping unreadable mapping file"
                    );
                }
            }
        }
        metadata.sort_by(|a, b| a.target_version_id.cmp(&b.target_version_id));
        Ok(metadata)
    }

    /// Reads the document for `id`, rejecting one written for another version.
    fn load_document(&self, id: &DataSetVersionId) -> StoreResult<Option<Value>> {
        let path = self.record_path(id);
        let Some(document) = read_document(&path)? else {
            return Ok(None);
        };
        ensure_version(&document, id, path.display().to_string())?;
        Ok(Some(document))
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, ()>> {
        self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

impl MappingStore for FileMappingStore {
    fn load(&self, id: &DataSetVersionId) -> StoreResult<Option<DataSetVersionMapping>> {
        let path = self.record_path(id);
        match self.load_document(id)? {
            Some(document) => Ok(Some(from_document(document, path.display().to_string())?)),
            None => Ok(None),
        }
    }

    fn insert(&self, mapping: &DataSetVersionMapping) -> StoreResult<bool> {
        let document = to_document(mapping)?;
        let _guard = self.lock()?;
        let path = self.record_path(&mapping.target_version_id);
        if path.exists() {
            return Ok(false);
        }
        write_document_atomic(&path, &document)?;
        tracing::info!(
            version = %mapping.target_version_id,
            path = %path.display(),
            "saved new mapping record"
        );
        Ok(true)
    }

    fn delete(&self, id: &DataSetVersionId) -> StoreResult<bool> {
        let _guard = self.lock()?;
        let path = self.record_path(id);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|source| StoreError::Io {
            operation: "delete",
            path,
            source,
        })?;
        Ok(true)
    }

    fn exists(&self, id: &DataSetVersionId) -> StoreResult<bool> {
        Ok(self.record_path(id).exists())
    }

    fn read_path(&self, id: &DataSetVersionId, path: &MappingPath) -> StoreResult<Option<Value>> {
        Ok(self
            .load_document(id)?
            .and_then(|document| document.pointer(&path.pointer()).cloned()))
    }

    fn write_fields(
        &self,
        id: &DataSetVersionId,
        path: &MappingPath,
        writes: &[FieldWrite],
    ) -> StoreResult<()> {
        let _guard = self.lock()?;
        let mut document = self
            .load_document(id)?
            .ok_or_else(|| StoreError::MissingRecord(id.clone()))?;
        apply_field_writes(&mut document, id, path, writes)?;
        write_document_atomic(&self.record_path(id), &document)
    }
}

fn read_document(path: &Path) -> StoreResult<Option<Value>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path).map_err(|source| StoreError::Io {
        operation: "read",
        path: path.to_path_buf(),
        source,
    })?;
    let document = serde_json::from_str(&contents).map_err(|source| {
        StoreError::Deserialization {
            location: path.display().to_string(),
            source,
        }
    })?;
    Ok(Some(document))
}

fn write_document_atomic(path: &Path, document: &Value) -> StoreResult<()> {
    let bytes = serde_json::to_vec_pretty(document)
        .map_err(|source| StoreError::Serialization { source })?;
    let temp_path = path.with_extension("json.tmp");

    let mut file = File::create(&temp_path).map_err(|source| StoreError::Io {
        operation: "create",
        path: temp_path.clone(),
        source,
    })?;
    file.write_all(&bytes).map_err(|source| StoreError::Io {
        operation: "write",
        path: temp_path.clone(),
        source,
    })?;
    file.sync_all().map_err(|source| StoreError::Io {
        operation: "sync",
        path: temp_path.clone(),
        source,
    })?;

    fs::rename(&temp_path, path).map_err(|source| StoreError::AtomicWriteFailed {
        temp_path: temp_path.clone(),
        target_path: path.to_path_buf(),
        source,
    })
}

/// Encode an ID as a file stem that no other ID maps to.
fn encode_id(id: &str) -> String {
    let mut encoded = String::with_capacity(id.len());
    for byte in id.bytes() {
        if byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'-' {
            encoded.push(char::from(byte));
        } else {
            let _ = write!(encoded, "_{byte:02X}");
        }
    }
    encoded
}
