#![deny(unsafe_code)]

//! Mapping between a live data set version and its replacement.
//!
//! - [`automap`] builds the baseline mapping when a record is created
//! - [`hierarchy`] expands filter selections along filter hierarchies
//! - [`overrides`] applies reviewer corrections to single entries
//! - [`projection`] partitions a record for review
//! - [`store`] persists records with targeted partial updates

pub mod automap;
pub mod catalog;
pub mod create;
pub mod error;
pub mod hierarchy;
pub mod overrides;
pub mod path;
pub mod projection;
pub mod service;
pub mod store;
pub mod utils;

pub use automap::{AutoMapOptions, AutoMapper, LabelMatching};
pub use catalog::{CandidateCatalog, FilterShell, SourceShell, SourceShells};
pub use create::{VersionMeta, create_mapping, delete_mapping, load_mapping};
pub use error::{MappingError, Result};
pub use hierarchy::{HierarchyError, HierarchyIndex, Reconciliation};
pub use overrides::{MappingUpdate, UpdatedEntry, apply_override, validate_target};
pub use path::{MappingField, MappingPath};
pub use projection::{
    FilterReview, MappingReview, PartitionedMappings, ReviewEntry, UnmappedSummary, project,
};
pub use service::MappingService;
pub use store::{
    FieldWrite, FileMappingStore, MappingStore, MemoryMappingStore, StoreError, StoreResult,
    StoredMappingMetadata,
};
