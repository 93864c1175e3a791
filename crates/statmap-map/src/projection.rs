//! Review view of a mapping record.
//!
//! Every location level, filter column and the indicator set is split into
//! three partitions: entries the auto-mapper resolved, entries that need or
//! have had a reviewer's attention, and candidates no entry refers to.
//! Unmapped entries are summarised as messages the UI links to by id.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use statmap_model::{
    DataSetVersionId, DataSetVersionMapping, FilterCandidate, GeographicLevel, LabelSource,
    LocationCandidate, LocationSource, MappingEntry, MappingType, OptionCandidate,
};
use tracing::debug;

use crate::utils::{slugify, unmapped_message};

/// A mapping entry with the candidate it resolves to, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEntry<S, C> {
    #[serde(flatten)]
    pub mapping: MappingEntry<S>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate: Option<C>,
}

/// The three partitions of one location level, filter column or the
/// indicator set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionedMappings<S, C> {
    /// Entries of type `AutoMapped`.
    pub auto_mapped: Vec<ReviewEntry<S, C>>,
    /// Entries of type `AutoNone`, `ManualNone` or `ManualMapped`.
    pub unmapped_and_manual: Vec<ReviewEntry<S, C>>,
    /// Candidates no entry refers to.
    pub new_candidates: Vec<C>,
}

impl<S, C> Default for PartitionedMappings<S, C> {
    fn default() -> Self {
        Self {
            auto_mapped: Vec::new(),
            unmapped_and_manual: Vec::new(),
            new_candidates: Vec::new(),
        }
    }
}

impl<S, C> PartitionedMappings<S, C> {
    fn entries(&self) -> impl Iterator<Item = &ReviewEntry<S, C>> {
        self.auto_mapped.iter().chain(&self.unmapped_and_manual)
    }

    /// Entries without a candidate (`AutoNone` and `ManualNone`).
    pub fn unmapped_count(&self) -> usize {
        self.unmapped_and_manual
            .iter()
            .filter(|entry| entry.mapping.kind.is_unmapped())
            .count()
    }

    /// Entries the reviewer has not looked at yet.
    pub fn pending_count(&self) -> usize {
        self.unmapped_and_manual
            .iter()
            .filter(|entry| entry.mapping.mapping_type() == MappingType::AutoNone)
            .count()
    }

    /// A group counts towards error summaries and completeness only when the
    /// new version still has something it could map to.
    pub fn is_live(&self) -> bool {
        !self.new_candidates.is_empty()
            || self.entries().any(|entry| entry.mapping.kind.is_mapped())
    }
}

/// Review of one filter column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterReview {
    /// Column-level entry and the candidate column it is mapped to.
    pub column: ReviewEntry<LabelSource, OptionCandidate>,
    pub options: PartitionedMappings<LabelSource, OptionCandidate>,
}

impl FilterReview {
    pub fn label(&self) -> &str {
        &self.column.mapping.source.label
    }

    pub fn is_live(&self) -> bool {
        self.options.is_live()
    }
}

/// Anchor-linked validation message for a group with unmapped entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmappedSummary {
    pub id: String,
    pub message: String,
}

/// Everything a reviewer sees for one mapping record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingReview {
    pub source_version_id: DataSetVersionId,
    pub target_version_id: DataSetVersionId,
    pub locations:
        BTreeMap<GeographicLevel, PartitionedMappings<LocationSource, LocationCandidate>>,
    pub filters: BTreeMap<String, FilterReview>,
    /// Candidate filter columns no source filter is mapped to.
    pub new_filters: Vec<FilterCandidate>,
    pub indicators: PartitionedMappings<LabelSource, OptionCandidate>,
    pub location_errors: Vec<UnmappedSummary>,
    pub filter_errors: Vec<UnmappedSummary>,
    pub indicator_errors: Vec<UnmappedSummary>,
    pub is_major_version_update: bool,
}

impl MappingReview {
    pub fn locations_complete(&self) -> bool {
        self.locations
            .values()
            .filter(|level| level.is_live())
            .all(|level| level.pending_count() == 0)
    }

    pub fn filters_complete(&self) -> bool {
        self.filters
            .values()
            .filter(|filter| filter.is_live())
            .all(|filter| filter.options.pending_count() == 0)
    }

    pub fn indicators_complete(&self) -> bool {
        !self.indicators.is_live() || self.indicators.pending_count() == 0
    }

    pub fn is_complete(&self) -> bool {
        self.locations_complete() && self.filters_complete() && self.indicators_complete()
    }

    /// All summaries: locations, then filters, then indicators.
    pub fn errors(&self) -> impl Iterator<Item = &UnmappedSummary> {
        self.location_errors
            .iter()
            .chain(&self.filter_errors)
            .chain(&self.indicator_errors)
    }
}

/// Builds the review of `record`.
pub fn project(record: &DataSetVersionMapping) -> MappingReview {
    let mut locations = BTreeMap::new();
    let mut location_errors = Vec::new();
    for (level, mappings) in &record.locations.levels {
        let partitioned = partition(mappings.mappings.values(), &mappings.candidates, |key| {
            mappings.candidate(key).cloned()
        });
        let unmapped = partitioned.unmapped_count();
        if partitioned.is_live() && unmapped > 0 {
            location_errors.push(UnmappedSummary {
                id: slugify(level.label()),
                message: unmapped_message(unmapped, level.label(), level.plural_label()),
            });
        }
        locations.insert(*level, partitioned);
    }

    let mut filters = BTreeMap::new();
    let mut filter_errors = Vec::new();
    for (filter_key, filter) in &record.filters.mappings {
        let column_candidate = record.filters.mapped_candidate(filter_key);
        let option_candidates = column_candidate
            .map(|candidate| candidate.options.as_slice())
            .unwrap_or_default();
        let options = partition(filter.option_mappings.values(), option_candidates, |key| {
            column_candidate.and_then(|candidate| candidate.option(key)).cloned()
        });
        let review = FilterReview {
            column: ReviewEntry {
                mapping: filter.entry.clone(),
                candidate: column_candidate.map(|candidate| OptionCandidate {
                    key: candidate.key.clone(),
                    label: candidate.label.clone(),
                }),
            },
            options,
        };
        let unmapped = review.options.unmapped_count();
        if review.is_live() && unmapped > 0 {
            let label = review.label();
            filter_errors.push(UnmappedSummary {
                id: slugify(label),
                message: unmapped_message(
                    unmapped,
                    &format!("{label} option"),
                    &format!("{label} options"),
                ),
            });
        }
        filters.insert(filter_key.clone(), review);
    }

    let referenced_columns: BTreeSet<&str> = record
        .filters
        .mappings
        .values()
        .filter_map(|filter| filter.entry.candidate_key())
        .collect();
    let new_filters = record
        .filters
        .candidates
        .iter()
        .filter(|candidate| !referenced_columns.contains(candidate.key.as_str()))
        .cloned()
        .collect();

    let indicators = partition(
        record.indicators.mappings.values(),
        &record.indicators.candidates,
        |key| record.indicators.candidate(key).cloned(),
    );
    let mut indicator_errors = Vec::new();
    let unmapped = indicators.unmapped_count();
    if indicators.is_live() && unmapped > 0 {
        indicator_errors.push(UnmappedSummary {
            id: "indicators".to_string(),
            message: unmapped_message(unmapped, "indicator", "indicators"),
        });
    }

    let review = MappingReview {
        source_version_id: record.source_version_id.clone(),
        target_version_id: record.target_version_id.clone(),
        locations,
        filters,
        new_filters,
        indicators,
        location_errors,
        filter_errors,
        indicator_errors,
        is_major_version_update: record.is_major_version_update(),
    };
    debug!(
        version = %review.target_version_id,
        errors = review.errors().count(),
        complete = review.is_complete(),
        "projected mapping review"
    );
    review
}

trait CandidateKey {
    fn key(&self) -> &str;
}

impl CandidateKey for LocationCandidate {
    fn key(&self) -> &str {
        &self.key
    }
}

impl CandidateKey for OptionCandidate {
    fn key(&self) -> &str {
        &self.key
    }
}

fn partition<'a, S, C>(
    entries: impl Iterator<Item = &'a MappingEntry<S>>,
    candidates: &[C],
    resolve: impl Fn(&str) -> Option<C>,
) -> PartitionedMappings<S, C>
where
    S: Clone + 'a,
    C: Clone + CandidateKey,
{
    let mut partitioned = PartitionedMappings::default();
    let mut referenced = BTreeSet::new();
    for entry in entries {
        let candidate = entry.candidate_key().and_then(&resolve);
        if let Some(key) = entry.candidate_key() {
            referenced.insert(key.to_string());
        }
        let review_entry = ReviewEntry {
            mapping: entry.clone(),
            candidate,
        };
        if entry.mapping_type() == MappingType::AutoMapped {
            partitioned.auto_mapped.push(review_entry);
        } else {
            partitioned.unmapped_and_manual.push(review_entry);
        }
    }
    partitioned.new_candidates = candidates
        .iter()
        .filter(|candidate| !referenced.contains(candidate.key()))
        .cloned()
        .collect();
    partitioned
}
