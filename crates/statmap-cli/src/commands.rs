use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use statmap_map::{
    FileMappingStore, HierarchyIndex, MappingReview, StoredMappingMetadata, UpdatedEntry,
    VersionMeta, apply_override, create_mapping, delete_mapping, load_mapping, project,
};
use statmap_model::{DataSetMeta, DataSetVersionId, DataSetVersionMapping};
use tracing::{debug, info, info_span};

use crate::types::{CreateRequest, OverrideRequest, ReconcileOutput, ReconcileRequest};

/// Reads data set metadata from a JSON file.
pub fn read_meta(path: &Path) -> Result<DataSetMeta> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let meta: DataSetMeta = serde_json::from_str(&contents)
        .with_context(|| format!("parse metadata {}", path.display()))?;
    debug!(
        path = %path.display(),
        levels = meta.locations.len(),
        filters = meta.filters.len(),
        indicators = meta.indicators.len(),
        "loaded metadata"
    );
    Ok(meta)
}

fn open_store(dir: &Path) -> Result<FileMappingStore> {
    FileMappingStore::new(dir)
        .map_err(|error| anyhow::anyhow!(error.user_message()))
        .with_context(|| format!("open mapping store {}", dir.display()))
}

pub fn run_create(request: &CreateRequest) -> Result<DataSetVersionMapping> {
    let span = info_span!("create", target_version = %request.target_version);
    let _guard = span.enter();
    let source = VersionMeta::new(
        request.source_version.clone(),
        read_meta(&request.source_meta)?,
    );
    let target = VersionMeta::new(
        request.target_version.clone(),
        read_meta(&request.target_meta)?,
    );
    let store = open_store(&request.store_dir)?;
    let mapping = create_mapping(&store, &source, &target, request.options)
        .with_context(|| format!("create mapping for {}", request.target_version))?;
    info!(path = %store.record_path(&mapping.target_version_id).display(), "mapping stored");
    Ok(mapping)
}

pub fn run_override(request: &OverrideRequest) -> Result<UpdatedEntry> {
    let store = open_store(&request.store_dir)?;
    apply_override(&store, &request.version, &request.target, &request.update)
        .with_context(|| format!("override {} in {}", request.target, request.version))
}

pub fn run_review(store_dir: &Path, version: &DataSetVersionId) -> Result<MappingReview> {
    let span = info_span!("review", version = %version);
    let _guard = span.enter();
    let store = open_store(store_dir)?;
    let record =
        load_mapping(&store, version).with_context(|| format!("load mapping for {version}"))?;
    Ok(project(&record))
}

pub fn run_list(store_dir: &Path) -> Result<Vec<StoredMappingMetadata>> {
    let store = open_store(store_dir)?;
    store
        .list()
        .map_err(|error| anyhow::anyhow!(error.user_message()))
        .context("list mappings")
}

pub fn run_delete(store_dir: &Path, version: &DataSetVersionId) -> Result<()> {
    let store = open_store(store_dir)?;
    delete_mapping(&store, version).with_context(|| format!("delete mapping for {version}"))
}

pub fn run_reconcile(request: &ReconcileRequest) -> Result<ReconcileOutput> {
    let meta = read_meta(&request.meta)?;
    let index = HierarchyIndex::build(&meta.filter_hierarchies, &meta.option_labels());
    if request.flat {
        let ids = index
            .expand_for_query(&request.selected)
            .context("expand selection")?;
        Ok(ReconcileOutput::Flat(ids))
    } else {
        let slices = index
            .reconcile(&request.selected)
            .context("reconcile selection")?;
        Ok(ReconcileOutput::Slices(slices))
    }
}
