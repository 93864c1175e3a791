//! Mapping entries and the per-version mapping record.
//!
//! A record holds, for every dimension type, one entry per source key of the
//! live version describing which candidate of the incoming version (if any)
//! it corresponds to.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::candidate::{FilterCandidate, LocationAttributes, LocationCandidate, OptionCandidate};
use crate::error::ModelError;
use crate::ids::DataSetVersionId;
use crate::level::GeographicLevel;

/// Wire tag of a mapping entry (`type` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MappingType {
    AutoMapped,
    AutoNone,
    ManualMapped,
    ManualNone,
}

impl MappingType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AutoMapped => "AutoMapped",
            Self::AutoNone => "AutoNone",
            Self::ManualMapped => "ManualMapped",
            Self::ManualNone => "ManualNone",
        }
    }

    pub fn is_auto(self) -> bool {
        matches!(self, Self::AutoMapped | Self::AutoNone)
    }

    /// `*Mapped` types carry a candidate key.
    pub fn is_mapped(self) -> bool {
        matches!(self, Self::AutoMapped | Self::ManualMapped)
    }

    pub fn is_unmapped(self) -> bool {
        !self.is_mapped()
    }
}

impl fmt::Display for MappingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MappingType {
    type Err = String;

    /// Accepts both the wire form (`ManualMapped`) and kebab case (`manual-mapped`).
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let compact: String = value
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match compact.as_str() {
            "automapped" => Ok(Self::AutoMapped),
            "autonone" => Ok(Self::AutoNone),
            "manualmapped" => Ok(Self::ManualMapped),
            "manualnone" => Ok(Self::ManualNone),
            _ => Err(format!("unknown mapping type: {value}")),
        }
    }
}

/// The state of one mapping entry.
///
/// Only the `*Mapped` variants hold a candidate key, so an entry can never be
/// mapped without a candidate or unmapped with one. On the wire this is the
/// pair of sibling fields `type` / `candidateKey`; a pair that breaks the rule
/// is rejected when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMappingKind", into = "RawMappingKind")]
pub enum MappingKind {
    AutoMapped { candidate_key: String },
    AutoNone,
    ManualMapped { candidate_key: String },
    ManualNone,
}

impl MappingKind {
    /// Builds a kind from its wire parts, enforcing the candidate key rule.
    pub fn from_parts(
        mapping_type: MappingType,
        candidate_key: Option<String>,
    ) -> Result<Self, ModelError> {
        match (mapping_type, candidate_key) {
            (MappingType::AutoMapped, Some(candidate_key)) => {
                Ok(Self::AutoMapped { candidate_key })
            }
            (MappingType::ManualMapped, Some(candidate_key)) => {
                Ok(Self::ManualMapped { candidate_key })
            }
            (MappingType::AutoNone, None) => Ok(Self::AutoNone),
            (MappingType::ManualNone, None) => Ok(Self::ManualNone),
            (mapping_type, None) => Err(ModelError::MissingCandidateKey {
                mapping_type: mapping_type.to_string(),
            }),
            (mapping_type, Some(candidate_key)) => Err(ModelError::UnexpectedCandidateKey {
                mapping_type: mapping_type.to_string(),
                candidate_key,
            }),
        }
    }

    pub fn mapping_type(&self) -> MappingType {
        match self {
            Self::AutoMapped { .. } => MappingType::AutoMapped,
            Self::AutoNone => MappingType::AutoNone,
            Self::ManualMapped { .. } => MappingType::ManualMapped,
            Self::ManualNone => MappingType::ManualNone,
        }
    }

    pub fn candidate_key(&self) -> Option<&str> {
        match self {
            Self::AutoMapped { candidate_key } | Self::ManualMapped { candidate_key } => {
                Some(candidate_key)
            }
            Self::AutoNone | Self::ManualNone => None,
        }
    }

    pub fn is_mapped(&self) -> bool {
        self.candidate_key().is_some()
    }

    pub fn is_unmapped(&self) -> bool {
        !self.is_mapped()
    }
}

/// Unchecked wire form of [`MappingKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMappingKind {
    #[serde(rename = "type")]
    pub mapping_type: MappingType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_key: Option<String>,
}

impl TryFrom<RawMappingKind> for MappingKind {
    type Error = ModelError;

    fn try_from(raw: RawMappingKind) -> Result<Self, Self::Error> {
        Self::from_parts(raw.mapping_type, raw.candidate_key)
    }
}

impl From<MappingKind> for RawMappingKind {
    fn from(kind: MappingKind) -> Self {
        let mapping_type = kind.mapping_type();
        let candidate_key = match kind {
            MappingKind::AutoMapped { candidate_key }
            | MappingKind::ManualMapped { candidate_key } => Some(candidate_key),
            MappingKind::AutoNone | MappingKind::ManualNone => None,
        };
        Self {
            mapping_type,
            candidate_key,
        }
    }
}

/// What the live version knew about a location option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSource {
    pub label: String,
    #[serde(flatten)]
    pub attributes: LocationAttributes,
}

/// What the live version knew about a filter, filter option or indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSource {
    pub label: String,
}

/// One correspondence between a source key and, optionally, a candidate key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingEntry<S> {
    pub source_key: String,
    pub source: S,
    /// Version-independent identifier; never rewritten by mapping.
    pub public_id: String,
    #[serde(flatten)]
    pub kind: MappingKind,
}

impl<S> MappingEntry<S> {
    pub fn mapping_type(&self) -> MappingType {
        self.kind.mapping_type()
    }

    pub fn candidate_key(&self) -> Option<&str> {
        self.kind.candidate_key()
    }
}

pub type LocationOptionMapping = MappingEntry<LocationSource>;
pub type FilterOptionMapping = MappingEntry<LabelSource>;
pub type IndicatorMapping = MappingEntry<LabelSource>;

/// Column-level entry for a filter plus the entries of its options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterMapping {
    #[serde(flatten)]
    pub entry: MappingEntry<LabelSource>,
    #[serde(default)]
    pub option_mappings: BTreeMap<String, FilterOptionMapping>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationLevelMappings {
    #[serde(default)]
    pub mappings: BTreeMap<String, LocationOptionMapping>,
    #[serde(default)]
    pub candidates: Vec<LocationCandidate>,
}

impl LocationLevelMappings {
    pub fn candidate(&self, key: &str) -> Option<&LocationCandidate> {
        self.candidates.iter().find(|candidate| candidate.key == key)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationMappingPlan {
    #[serde(default)]
    pub levels: BTreeMap<GeographicLevel, LocationLevelMappings>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterMappingPlan {
    #[serde(default)]
    pub mappings: BTreeMap<String, FilterMapping>,
    #[serde(default)]
    pub candidates: Vec<FilterCandidate>,
}

impl FilterMappingPlan {
    pub fn candidate(&self, key: &str) -> Option<&FilterCandidate> {
        self.candidates.iter().find(|candidate| candidate.key == key)
    }

    /// The candidate column a source filter is mapped to, if any.
    pub fn mapped_candidate(&self, filter_key: &str) -> Option<&FilterCandidate> {
        self.mappings
            .get(filter_key)
            .and_then(|mapping| mapping.entry.candidate_key())
            .and_then(|key| self.candidate(key))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorMappingPlan {
    #[serde(default)]
    pub mappings: BTreeMap<String, IndicatorMapping>,
    #[serde(default)]
    pub candidates: Vec<OptionCandidate>,
}

impl IndicatorMappingPlan {
    pub fn candidate(&self, key: &str) -> Option<&OptionCandidate> {
        self.candidates.iter().find(|candidate| candidate.key == key)
    }
}

/// Mapping record between a live data set version and its replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSetVersionMapping {
    pub source_version_id: DataSetVersionId,
    pub target_version_id: DataSetVersionId,
    #[serde(default)]
    pub locations: LocationMappingPlan,
    #[serde(default)]
    pub filters: FilterMappingPlan,
    #[serde(default)]
    pub indicators: IndicatorMappingPlan,
    pub created: DateTime<Utc>,
}

impl DataSetVersionMapping {
    /// Mapping types of every entry in the record, columns included.
    pub fn mapping_types(&self) -> impl Iterator<Item = MappingType> + '_ {
        let locations = self
            .locations
            .levels
            .values()
            .flat_map(|level| level.mappings.values())
            .map(MappingEntry::mapping_type);
        let filters = self.filters.mappings.values().flat_map(|filter| {
            std::iter::once(filter.entry.mapping_type())
                .chain(filter.option_mappings.values().map(MappingEntry::mapping_type))
        });
        let indicators = self
            .indicators
            .mappings
            .values()
            .map(MappingEntry::mapping_type);
        locations.chain(filters).chain(indicators)
    }

    /// True when something consumers could reference has no counterpart in
    /// the incoming version, which makes the replacement a breaking change.
    pub fn is_major_version_update(&self) -> bool {
        self.mapping_types().any(MappingType::is_unmapped)
    }

    /// Candidate key -> public identifier for every mapped entry.
    ///
    /// Publishing the incoming version hands each mapped candidate the public
    /// identifier of the source value it replaces.
    pub fn public_id_assignments(&self) -> PublicIdAssignments {
        let mut assignments = PublicIdAssignments::default();
        for (level, mappings) in &self.locations.levels {
            for entry in mappings.mappings.values() {
                if let Some(candidate) = entry.candidate_key() {
                    assignments
                        .locations
                        .entry(*level)
                        .or_default()
                        .insert(candidate.to_string(), entry.public_id.clone());
                }
            }
        }
        for filter in self.filters.mappings.values() {
            let Some(filter_candidate) = filter.entry.candidate_key() else {
                continue;
            };
            assignments
                .filters
                .insert(filter_candidate.to_string(), filter.entry.public_id.clone());
            for entry in filter.option_mappings.values() {
                if let Some(candidate) = entry.candidate_key() {
                    assignments
                        .filter_options
                        .entry(filter_candidate.to_string())
                        .or_default()
                        .insert(candidate.to_string(), entry.public_id.clone());
                }
            }
        }
        for entry in self.indicators.mappings.values() {
            if let Some(candidate) = entry.candidate_key() {
                assignments
                    .indicators
                    .insert(candidate.to_string(), entry.public_id.clone());
            }
        }
        assignments
    }
}

/// Public identifiers inherited by candidates of the incoming version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicIdAssignments {
    pub locations: BTreeMap<GeographicLevel, BTreeMap<String, String>>,
    pub filters: BTreeMap<String, String>,
    /// Keyed by candidate filter key, then candidate option key.
    pub filter_options: BTreeMap<String, BTreeMap<String, String>>,
    pub indicators: BTreeMap<String, String>,
}
