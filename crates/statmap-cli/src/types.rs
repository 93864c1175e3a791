use std::path::PathBuf;

use statmap_map::{AutoMapOptions, MappingPath, MappingUpdate, Reconciliation};
use statmap_model::DataSetVersionId;

#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub store_dir: PathBuf,
    pub source_version: DataSetVersionId,
    pub source_meta: PathBuf,
    pub target_version: DataSetVersionId,
    pub target_meta: PathBuf,
    pub options: AutoMapOptions,
}

#[derive(Debug, Clone)]
pub struct OverrideRequest {
    pub store_dir: PathBuf,
    pub version: DataSetVersionId,
    pub target: MappingPath,
    pub update: MappingUpdate,
}

#[derive(Debug, Clone)]
pub struct ReconcileRequest {
    pub meta: PathBuf,
    pub selected: Vec<String>,
    pub flat: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutput {
    /// Selected id -> vertical slice.
    Slices(Reconciliation),
    /// Ids for the query engine.
    Flat(Vec<String>),
}
