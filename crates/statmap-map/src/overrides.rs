//! Reviewer corrections to single mapping entries.
//!
//! An override rewrites the `type` and `candidateKey` of exactly one entry.
//! Both fields go to the store in one write, so a reader never observes a
//! mapped entry without a candidate key (or the reverse). Concurrent
//! reviewers editing the same entry are not serialized: the last write wins.

use serde::Serialize;
use serde_json::Value;
use statmap_model::{
    DataSetVersionId, DataSetVersionMapping, LabelSource, LocationOptionMapping, MappingEntry,
    MappingKind, MappingType, ModelError,
};
use tracing::{info, info_span};

use crate::error::{MappingError, Result};
use crate::path::{MappingField, MappingPath};
use crate::store::{FieldWrite, MappingStore};

/// A validated reviewer decision for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingUpdate {
    kind: MappingKind,
}

impl MappingUpdate {
    /// Builds an update from its wire parts.
    ///
    /// Only reviewer types are accepted; `AutoMapped` / `AutoNone` are
    /// reserved for the auto-mapper.
    pub fn from_parts(mapping_type: MappingType, candidate_key: Option<String>) -> Result<Self> {
        if mapping_type.is_auto() {
            return Err(MappingError::validation(
                MappingField::Type.name(),
                format!("{mapping_type} cannot be set by a reviewer"),
            ));
        }
        let candidate_key = candidate_key.filter(|key| !key.trim().is_empty());
        let kind = MappingKind::from_parts(mapping_type, candidate_key).map_err(|error| {
            let field = match error {
                ModelError::MissingCandidateKey { .. }
                | ModelError::UnexpectedCandidateKey { .. } => MappingField::CandidateKey,
                _ => MappingField::Type,
            };
            MappingError::validation(field.name(), error.to_string())
        })?;
        Ok(Self { kind })
    }

    pub fn manual_mapped(candidate_key: impl Into<String>) -> Self {
        Self {
            kind: MappingKind::ManualMapped {
                candidate_key: candidate_key.into(),
            },
        }
    }

    pub fn manual_none() -> Self {
        Self {
            kind: MappingKind::ManualNone,
        }
    }

    pub fn kind(&self) -> &MappingKind {
        &self.kind
    }

    /// Both field writes of the update; a `*None` type clears the candidate key.
    pub fn field_writes(&self) -> [FieldWrite; 2] {
        let candidate_key = match self.kind.candidate_key() {
            Some(key) => FieldWrite::set(MappingField::CandidateKey, key),
            None => FieldWrite::clear(MappingField::CandidateKey),
        };
        [
            FieldWrite::set(MappingField::Type, self.kind.mapping_type().as_str()),
            candidate_key,
        ]
    }
}

/// An entry as re-read from the store after an override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum UpdatedEntry {
    Location(LocationOptionMapping),
    Option(MappingEntry<LabelSource>),
}

impl UpdatedEntry {
    pub fn kind(&self) -> &MappingKind {
        match self {
            Self::Location(entry) => &entry.kind,
            Self::Option(entry) => &entry.kind,
        }
    }

    pub fn source_key(&self) -> &str {
        match self {
            Self::Location(entry) => &entry.source_key,
            Self::Option(entry) => &entry.source_key,
        }
    }

    pub fn public_id(&self) -> &str {
        match self {
            Self::Location(entry) => &entry.public_id,
            Self::Option(entry) => &entry.public_id,
        }
    }
}

/// Applies a reviewer decision to the entry at `target`.
///
/// Fails with [`MappingError::NotFound`] when no record exists for
/// `version_id`, and with [`MappingError::Validation`] when the path or the
/// candidate key does not exist in the record.
pub fn apply_override<S: MappingStore + ?Sized>(
    store: &S,
    version_id: &DataSetVersionId,
    target: &MappingPath,
    update: &MappingUpdate,
) -> Result<UpdatedEntry> {
    let span = info_span!("apply_override", version = %version_id, path = %target);
    let _guard = span.enter();

    let record = store
        .load(version_id)?
        .ok_or_else(|| MappingError::NotFound(version_id.clone()))?;
    validate_target(&record, target, update)?;

    store.write_fields(version_id, target, &update.field_writes())?;

    let raw = store
        .read_path(version_id, target)?
        .ok_or_else(|| MappingError::NotFound(version_id.clone()))?;
    let entry = decode_entry(target, raw)?;
    info!(
        source_key = %entry.source_key(),
        mapping_type = %entry.kind().mapping_type(),
        "applied manual override"
    );
    Ok(entry)
}

/// Checks that `target` names an existing entry and that the update's
/// candidate key exists among the candidates that entry may map to.
pub fn validate_target(
    record: &DataSetVersionMapping,
    target: &MappingPath,
    update: &MappingUpdate,
) -> Result<()> {
    let candidate_key = update.kind.candidate_key();
    let candidate_path = || format!("{target}/{}", MappingField::CandidateKey.name());

    match target {
        MappingPath::LocationOption { level, source_key } => {
            let mappings = record.locations.levels.get(level).ok_or_else(|| {
                MappingError::validation(
                    format!("locations/levels/{level}"),
                    format!("the mapping has no {} locations", level.label()),
                )
            })?;
            if !mappings.mappings.contains_key(source_key) {
                return Err(unknown_source(target));
            }
            if let Some(key) = candidate_key
                && mappings.candidate(key).is_none()
            {
                return Err(MappingError::validation(
                    candidate_path(),
                    format!("no {} candidate with key {key}", level.label()),
                ));
            }
        }
        MappingPath::Filter { .. } => {
            return Err(MappingError::validation(
                target.to_string(),
                "filter columns cannot be overridden, override their options instead",
            ));
        }
        MappingPath::FilterOption {
            filter_key,
            source_key,
        } => {
            let filter = record.filters.mappings.get(filter_key).ok_or_else(|| {
                MappingError::validation(
                    format!("filters/mappings/{filter_key}"),
                    format!("unknown filter {filter_key}"),
                )
            })?;
            if !filter.option_mappings.contains_key(source_key) {
                return Err(unknown_source(target));
            }
            if let Some(key) = candidate_key {
                let column = record.filters.mapped_candidate(filter_key).ok_or_else(|| {
                    MappingError::validation(
                        candidate_path(),
                        format!("filter {filter_key} is not mapped to a filter of the new version"),
                    )
                })?;
                if column.option(key).is_none() {
                    return Err(MappingError::validation(
                        candidate_path(),
                        format!("filter {} has no option with key {key}", column.key),
                    ));
                }
            }
        }
        MappingPath::Indicator { source_key } => {
            if !record.indicators.mappings.contains_key(source_key) {
                return Err(unknown_source(target));
            }
            if let Some(key) = candidate_key
                && record.indicators.candidate(key).is_none()
            {
                return Err(MappingError::validation(
                    candidate_path(),
                    format!("no indicator candidate with key {key}"),
                ));
            }
        }
    }
    Ok(())
}

fn unknown_source(target: &MappingPath) -> MappingError {
    MappingError::validation(
        target.to_string(),
        format!("unknown source key {}", target.source_key()),
    )
}

fn decode_entry(target: &MappingPath, raw: Value) -> Result<UpdatedEntry> {
    let decoded = match target {
        MappingPath::LocationOption { .. } => {
            serde_json::from_value(raw).map(UpdatedEntry::Location)
        }
        _ => serde_json::from_value(raw).map(UpdatedEntry::Option),
    };
    decoded.map_err(|source| {
        MappingError::Store(crate::store::StoreError::Deserialization {
            location: target.to_string(),
            source,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_types_are_rejected() {
        let err = MappingUpdate::from_parts(MappingType::AutoNone, None).unwrap_err();
        assert!(matches!(err, MappingError::Validation { ref path, .. } if path == "type"));
    }

    #[test]
    fn none_with_candidate_is_rejected() {
        let err =
            MappingUpdate::from_parts(MappingType::ManualNone, Some("C1".to_string())).unwrap_err();
        assert!(matches!(err, MappingError::Validation { ref path, .. } if path == "candidateKey"));
    }

    #[test]
    fn mapped_without_candidate_is_rejected() {
        assert!(MappingUpdate::from_parts(MappingType::ManualMapped, None).is_err());
        assert!(
            MappingUpdate::from_parts(MappingType::ManualMapped, Some("  ".to_string())).is_err()
        );
    }

    #[test]
    fn none_update_clears_candidate_key() {
        let [type_write, key_write] = MappingUpdate::manual_none().field_writes();
        assert_eq!(type_write, FieldWrite::set(MappingField::Type, "ManualNone"));
        assert_eq!(key_write, FieldWrite::clear(MappingField::CandidateKey));
    }
}
