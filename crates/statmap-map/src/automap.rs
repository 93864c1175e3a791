//! Automatic baseline mapping between a live version and its replacement.
//!
//! Matching is first-match, not best-match: sources are visited in import
//! order and each takes the first unused candidate that matches it. A
//! candidate is never matched twice, so later sources that would have matched
//! an already used candidate end up `AutoNone`.
//!
//! The mapper only ever produces `AutoMapped` / `AutoNone` entries and never
//! looks at existing records; it runs once, when a record is created.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use statmap_model::{
    DataSetVersionId, DataSetVersionMapping, FilterCandidate, FilterMapping, FilterMappingPlan,
    IndicatorMappingPlan, LabelSource, LocationCandidate, LocationLevelMappings,
    LocationMappingPlan, LocationSource, MappingEntry, MappingKind, OptionCandidate,
};
use tracing::{debug, info};

use crate::catalog::{CandidateCatalog, FilterShell, SourceShell, SourceShells};

/// How labels are compared when no structural identity decides a match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LabelMatching {
    /// Labels must be byte-for-byte equal.
    #[default]
    Exact,
    /// Labels are compared after lower-casing both sides.
    IgnoreCase,
}

/// Options controlling the auto-mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoMapOptions {
    pub label_matching: LabelMatching,
    /// Let a candidate's previous code (`oldCode`) match a source code.
    pub use_old_codes: bool,
}

impl Default for AutoMapOptions {
    fn default() -> Self {
        Self {
            label_matching: LabelMatching::Exact,
            use_old_codes: true,
        }
    }
}

impl AutoMapOptions {
    /// Only current codes and exact labels count as a match.
    pub fn strict() -> Self {
        Self {
            label_matching: LabelMatching::Exact,
            use_old_codes: false,
        }
    }
}

/// Computes automatic mappings for every dimension of a record.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoMapper {
    options: AutoMapOptions,
}

impl AutoMapper {
    pub fn new(options: AutoMapOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> AutoMapOptions {
        self.options
    }

    /// Builds a complete record: every source entry mapped or `AutoNone`, and
    /// every candidate of the incoming version stored alongside.
    pub fn build(
        &self,
        source_version_id: DataSetVersionId,
        target_version_id: DataSetVersionId,
        shells: &SourceShells,
        catalog: &CandidateCatalog,
        created: DateTime<Utc>,
    ) -> DataSetVersionMapping {
        let mapping = DataSetVersionMapping {
            source_version_id,
            target_version_id,
            locations: self.map_location_levels(shells, catalog),
            filters: FilterMappingPlan {
                mappings: self.map_filters(&shells.filters, &catalog.filters),
                candidates: catalog.filters.clone(),
            },
            indicators: IndicatorMappingPlan {
                mappings: self.map_labels(&shells.indicators, &catalog.indicators),
                candidates: catalog.indicators.clone(),
            },
            created,
        };
        info!(
            source_version = %mapping.source_version_id,
            target_version = %mapping.target_version_id,
            entries = mapping.mapping_types().count(),
            unmapped = mapping.mapping_types().filter(|t| t.is_unmapped()).count(),
            "auto-mapping complete"
        );
        mapping
    }

    fn map_location_levels(
        &self,
        shells: &SourceShells,
        catalog: &CandidateCatalog,
    ) -> LocationMappingPlan {
        let levels: BTreeSet<_> = shells
            .locations
            .keys()
            .chain(catalog.locations.keys())
            .copied()
            .collect();
        let mut plan = LocationMappingPlan::default();
        for level in levels {
            let sources = shells.locations.get(&level).map(Vec::as_slice).unwrap_or_default();
            let candidates = catalog.location_candidates(level);
            plan.levels.insert(
                level,
                LocationLevelMappings {
                    mappings: self.map_locations(sources, candidates),
                    candidates: candidates.to_vec(),
                },
            );
        }
        plan
    }

    /// Maps location options of one geographic level.
    pub fn map_locations(
        &self,
        sources: &[SourceShell<LocationSource>],
        candidates: &[LocationCandidate],
    ) -> BTreeMap<String, MappingEntry<LocationSource>> {
        first_match(sources, candidates, |candidate| &candidate.key, |source, candidate| {
            self.location_matches(source, candidate)
        })
    }

    /// Maps label-only values (filter options, indicators).
    pub fn map_labels(
        &self,
        sources: &[SourceShell<LabelSource>],
        candidates: &[OptionCandidate],
    ) -> BTreeMap<String, MappingEntry<LabelSource>> {
        first_match(sources, candidates, |candidate| &candidate.key, |source, candidate| {
            self.labels_match(&source.label, &candidate.label)
        })
    }

    /// Maps filter columns, then the options of each mapped column against
    /// the options of the column it was matched with.
    pub fn map_filters(
        &self,
        sources: &[FilterShell],
        candidates: &[FilterCandidate],
    ) -> BTreeMap<String, FilterMapping> {
        let columns: Vec<SourceShell<LabelSource>> =
            sources.iter().map(|filter| filter.column.clone()).collect();
        let column_mappings = first_match(
            &columns,
            candidates,
            |candidate| &candidate.key,
            |source, candidate| self.labels_match(&source.label, &candidate.label),
        );

        let mut mappings = BTreeMap::new();
        for filter in sources {
            let Some(entry) = column_mappings.get(&filter.column.source_key) else {
                continue;
            };
            let option_candidates = entry
                .candidate_key()
                .and_then(|key| candidates.iter().find(|candidate| candidate.key == key))
                .map(|candidate| candidate.options.as_slice())
                .unwrap_or_default();
            mappings.insert(
                filter.column.source_key.clone(),
                FilterMapping {
                    entry: entry.clone(),
                    option_mappings: self.map_labels(&filter.options, option_candidates),
                },
            );
        }
        mappings
    }

    fn labels_match(&self, source: &str, candidate: &str) -> bool {
        match self.options.label_matching {
            LabelMatching::Exact => source == candidate,
            LabelMatching::IgnoreCase => source.to_lowercase() == candidate.to_lowercase(),
        }
    }

    /// Structural identity first (code, then urn+laEstab, then ukprn; the
    /// first attribute present on both sides decides), label only when
    /// neither side carries any structural attribute. A school's urn and
    /// laEstab form one identity, so an laEstab on only one side never matches.
    fn location_matches(&self, source: &LocationSource, candidate: &LocationCandidate) -> bool {
        let s = &source.attributes;
        let c = &candidate.attributes;
        if s.is_empty() && c.is_empty() {
            return self.labels_match(&source.label, &candidate.label);
        }

        if let Some(code) = s.code() {
            let old_code = c.old_code().filter(|_| self.options.use_old_codes);
            if c.code().is_some() || old_code.is_some() {
                return c.code() == Some(code) || old_code == Some(code);
            }
        }

        if let (Some(source_urn), Some(candidate_urn)) = (s.urn(), c.urn()) {
            return source_urn == candidate_urn && s.la_estab() == c.la_estab();
        }

        if let (Some(source_ukprn), Some(candidate_ukprn)) = (s.ukprn(), c.ukprn()) {
            return source_ukprn == candidate_ukprn;
        }

        false
    }
}

/// Assigns each source the first unused matching candidate, in input order.
fn first_match<S, C>(
    sources: &[SourceShell<S>],
    candidates: &[C],
    key_of: impl Fn(&C) -> &String,
    matches: impl Fn(&S, &C) -> bool,
) -> BTreeMap<String, MappingEntry<S>>
where
    S: Clone,
{
    let mut used = vec![false; candidates.len()];
    let mut entries = BTreeMap::new();
    for shell in sources {
        let found = candidates
            .iter()
            .enumerate()
            .find(|(idx, candidate)| !used[*idx] && matches(&shell.source, candidate));
        let kind = match found {
            Some((idx, candidate)) => {
                used[idx] = true;
                let candidate_key = key_of(candidate).clone();
                debug!(source_key = %shell.source_key, %candidate_key, "auto-mapped");
                MappingKind::AutoMapped { candidate_key }
            }
            None => {
                debug!(source_key = %shell.source_key, "no candidate matched");
                MappingKind::AutoNone
            }
        };
        entries.insert(shell.source_key.clone(), shell.to_entry(kind));
    }
    entries
}

#[cfg(test)]
mod tests {
    use statmap_model::{LocationAttributes, MappingType};

    use super::*;

    fn label_shell(key: &str, label: &str) -> SourceShell<LabelSource> {
        SourceShell {
            source_key: key.to_string(),
            source: LabelSource {
                label: label.to_string(),
            },
            public_id: format!("pub-{key}"),
        }
    }

    fn option(key: &str, label: &str) -> OptionCandidate {
        OptionCandidate {
            key: key.to_string(),
            label: label.to_string(),
        }
    }

    fn location_shell(
        key: &str,
        label: &str,
        attributes: LocationAttributes,
    ) -> SourceShell<LocationSource> {
        SourceShell {
            source_key: key.to_string(),
            source: LocationSource {
                label: label.to_string(),
                attributes,
            },
            public_id: format!("pub-{key}"),
        }
    }

    fn location(key: &str, label: &str, attributes: LocationAttributes) -> LocationCandidate {
        LocationCandidate {
            key: key.to_string(),
            label: label.to_string(),
            attributes,
        }
    }

    fn code(code: &str) -> LocationAttributes {
        LocationAttributes {
            code: Some(code.to_string()),
            ..LocationAttributes::default()
        }
    }

    #[test]
    fn label_match_maps_to_candidate_key() {
        let mapped = AutoMapper::default().map_labels(
            &[label_shell("F1O1", "X")],
            &[option("F1O1New", "X")],
        );
        assert_eq!(
            mapped["F1O1"].kind,
            MappingKind::AutoMapped {
                candidate_key: "F1O1New".to_string()
            }
        );
        assert_eq!(mapped["F1O1"].public_id, "pub-F1O1");
    }

    #[test]
    fn empty_candidates_leave_everything_unmapped() {
        let mapped = AutoMapper::default()
            .map_labels(&[label_shell("A", "a"), label_shell("B", "b")], &[]);
        assert!(mapped.values().all(|e| e.mapping_type() == MappingType::AutoNone));
    }

    #[test]
    fn candidate_is_used_once() {
        let mapped = AutoMapper::default().map_labels(
            &[label_shell("A", "Same"), label_shell("B", "Same")],
            &[option("C1", "Same")],
        );
        assert_eq!(mapped["A"].candidate_key(), Some("C1"));
        assert_eq!(mapped["B"].mapping_type(), MappingType::AutoNone);
    }

    #[test]
    fn first_candidate_in_list_order_wins() {
        let mapped = AutoMapper::default().map_labels(
            &[label_shell("A", "Same")],
            &[option("C2", "Same"), option("C1", "Same")],
        );
        assert_eq!(mapped["A"].candidate_key(), Some("C2"));
    }

    #[test]
    fn ignore_case_option_relaxes_labels() {
        let exact = AutoMapper::default()
            .map_labels(&[label_shell("A", "Total")], &[option("C", "TOTAL")]);
        assert_eq!(exact["A"].mapping_type(), MappingType::AutoNone);

        let relaxed = AutoMapper::new(AutoMapOptions {
            label_matching: LabelMatching::IgnoreCase,
            ..AutoMapOptions::default()
        })
        .map_labels(&[label_shell("A", "Total")], &[option("C", "TOTAL")]);
        assert_eq!(relaxed["A"].candidate_key(), Some("C"));
    }

    #[test]
    fn location_code_beats_label() {
        let mapped = AutoMapper::default().map_locations(
            &[location_shell("LA1", "Barnsley", code("E08000016"))],
            &[
                location("X", "Barnsley", code("E99999999")),
                location("Y", "Barnsley Metropolitan", code("E08000016")),
            ],
        );
        assert_eq!(mapped["LA1"].candidate_key(), Some("Y"));
    }

    #[test]
    fn location_old_code_matches_unless_strict() {
        let candidate = location(
            "New",
            "North Northamptonshire",
            LocationAttributes {
                code: Some("E06000061".to_string()),
                old_code: Some("E10000021".to_string()),
                ..LocationAttributes::default()
            },
        );
        let sources = [location_shell("Old", "Northamptonshire", code("E10000021"))];

        let mapped =
            AutoMapper::default().map_locations(&sources, std::slice::from_ref(&candidate));
        assert_eq!(mapped["Old"].candidate_key(), Some("New"));

        let strict =
            AutoMapper::new(AutoMapOptions::strict()).map_locations(&sources, &[candidate]);
        assert_eq!(strict["Old"].mapping_type(), MappingType::AutoNone);
    }

    #[test]
    fn school_urn_must_agree_on_la_estab() {
        let school = |la_estab: &str| LocationAttributes {
            urn: Some("100000".to_string()),
            la_estab: Some(la_estab.to_string()),
            ..LocationAttributes::default()
        };
        let mapped = AutoMapper::default().map_locations(
            &[location_shell("S1", "Academy", school("2013614"))],
            &[
                location("Other", "Academy", school("9999999")),
                location("Same", "Academy", school("2013614")),
            ],
        );
        assert_eq!(mapped["S1"].candidate_key(), Some("Same"));
    }

    #[test]
    fn school_la_estab_on_one_side_does_not_match() {
        let urn_only = LocationAttributes {
            urn: Some("100000".to_string()),
            ..LocationAttributes::default()
        };
        let with_la_estab = LocationAttributes {
            la_estab: Some("2013614".to_string()),
            ..urn_only.clone()
        };

        let mapped = AutoMapper::default().map_locations(
            &[location_shell("S1", "Academy", with_la_estab.clone())],
            &[location("S1New", "Academy", urn_only.clone())],
        );
        assert_eq!(mapped["S1"].mapping_type(), MappingType::AutoNone);

        let mapped = AutoMapper::default().map_locations(
            &[location_shell("S2", "Academy", urn_only.clone())],
            &[location("S2New", "Academy", with_la_estab)],
        );
        assert_eq!(mapped["S2"].mapping_type(), MappingType::AutoNone);

        let mapped = AutoMapper::default().map_locations(
            &[location_shell("S3", "Academy", urn_only.clone())],
            &[location("S3New", "Academy", urn_only)],
        );
        assert_eq!(mapped["S3"].candidate_key(), Some("S3New"));
    }

    #[test]
    fn provider_ukprn_matches() {
        let provider = LocationAttributes {
            ukprn: Some("10000001".to_string()),
            ..LocationAttributes::default()
        };
        let mapped = AutoMapper::default().map_locations(
            &[location_shell("P1", "College", provider.clone())],
            &[location("P1New", "College (renamed)", provider)],
        );
        assert_eq!(mapped["P1"].candidate_key(), Some("P1New"));
    }

    #[test]
    fn structural_source_never_falls_back_to_label() {
        let mapped = AutoMapper::default().map_locations(
            &[location_shell("R1", "North East", code("E12000001"))],
            &[location("R1New", "North East", LocationAttributes::default())],
        );
        assert_eq!(mapped["R1"].mapping_type(), MappingType::AutoNone);
    }

    #[test]
    fn unmapped_filter_column_leaves_options_unmapped() {
        let filters = [FilterShell {
            column: label_shell("F1", "School type"),
            options: vec![label_shell("F1O1", "Primary")],
        }];
        let candidates = [FilterCandidate {
            key: "F9".to_string(),
            label: "Phase".to_string(),
            options: vec![option("F9O1", "Primary")],
        }];
        let mapped = AutoMapper::default().map_filters(&filters, &candidates);
        assert_eq!(mapped["F1"].entry.mapping_type(), MappingType::AutoNone);
        assert_eq!(
            mapped["F1"].option_mappings["F1O1"].mapping_type(),
            MappingType::AutoNone
        );
    }

    #[test]
    fn mapped_filter_column_maps_its_options() {
        let filters = [FilterShell {
            column: label_shell("F1", "School type"),
            options: vec![label_shell("F1O1", "Primary"), label_shell("F1O2", "Special")],
        }];
        let candidates = [FilterCandidate {
            key: "F1New".to_string(),
            label: "School type".to_string(),
            options: vec![option("F1O1New", "Primary"), option("F1O3New", "Secondary")],
        }];
        let mapped = AutoMapper::default().map_filters(&filters, &candidates);
        let filter = &mapped["F1"];
        assert_eq!(filter.entry.candidate_key(), Some("F1New"));
        assert_eq!(filter.option_mappings["F1O1"].candidate_key(), Some("F1O1New"));
        assert_eq!(
            filter.option_mappings["F1O2"].mapping_type(),
            MappingType::AutoNone
        );
    }
}
