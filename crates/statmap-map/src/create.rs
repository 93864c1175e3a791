//! Creation and removal of mapping records.

use chrono::Utc;
use statmap_model::{DataSetMeta, DataSetVersionId, DataSetVersionMapping};
use tracing::{info, info_span};

use crate::automap::{AutoMapOptions, AutoMapper};
use crate::catalog::{CandidateCatalog, SourceShells};
use crate::error::{MappingError, Result};
use crate::store::MappingStore;

/// Dimension metadata of one data set version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionMeta {
    pub version_id: DataSetVersionId,
    pub meta: DataSetMeta,
}

impl VersionMeta {
    pub fn new(version_id: DataSetVersionId, meta: DataSetMeta) -> Self {
        Self { version_id, meta }
    }
}

/// Auto-maps `source` onto `target` and stores the resulting record.
///
/// Auto-mapping happens exactly once per target version. When a record
/// already exists this fails with [`MappingError::AlreadyExists`] so that
/// reviewer decisions are never overwritten.
pub fn create_mapping<S: MappingStore + ?Sized>(
    store: &S,
    source: &VersionMeta,
    target: &VersionMeta,
    options: AutoMapOptions,
) -> Result<DataSetVersionMapping> {
    let span = info_span!(
        "create_mapping",
        source_version = %source.version_id,
        target_version = %target.version_id
    );
    let _guard = span.enter();

    if source.version_id == target.version_id {
        return Err(MappingError::validation(
            "targetVersionId",
            "a version cannot be mapped onto itself",
        ));
    }
    if store.exists(&target.version_id)? {
        return Err(MappingError::AlreadyExists(target.version_id.clone()));
    }

    let shells = SourceShells::from_meta(&source.meta)?;
    let catalog = CandidateCatalog::from_meta(&target.meta);
    let mapping = AutoMapper::new(options).build(
        source.version_id.clone(),
        target.version_id.clone(),
        &shells,
        &catalog,
        Utc::now(),
    );

    // A concurrent create may have stored a record since the check above.
    if !store.insert(&mapping)? {
        return Err(MappingError::AlreadyExists(target.version_id.clone()));
    }
    info!(
        major_version_update = mapping.is_major_version_update(),
        "created mapping record"
    );
    Ok(mapping)
}

/// Loads the record for `version_id`, failing when there is none.
pub fn load_mapping<S: MappingStore + ?Sized>(
    store: &S,
    version_id: &DataSetVersionId,
) -> Result<DataSetVersionMapping> {
    store
        .load(version_id)?
        .ok_or_else(|| MappingError::NotFound(version_id.clone()))
}

/// Removes the record for `version_id`, failing when there is none.
pub fn delete_mapping<S: MappingStore + ?Sized>(
    store: &S,
    version_id: &DataSetVersionId,
) -> Result<()> {
    if !store.delete(version_id)? {
        return Err(MappingError::NotFound(version_id.clone()));
    }
    info!(version = %version_id, "deleted mapping record");
    Ok(())
}
