//! Tests for the review projection.

mod common;

use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use statmap_map::{
    MappingPath, MappingUpdate, MemoryMappingStore, apply_override, load_mapping, project,
};
use statmap_model::{
    DataSetVersionMapping, FilterCandidate, FilterMapping, FilterMappingPlan, GeographicLevel,
    LabelSource, MappingEntry, MappingKind, OptionCandidate,
};

use common::{seed, version};

fn option_entry(key: &str, kind: MappingKind) -> MappingEntry<LabelSource> {
    MappingEntry {
        source_key: key.to_string(),
        source: LabelSource {
            label: format!("{key} label"),
        },
        public_id: format!("pub-{key}"),
        kind,
    }
}

fn column(
    key: &str,
    label: &str,
    candidate: &str,
    options: Vec<MappingEntry<LabelSource>>,
) -> FilterMapping {
    FilterMapping {
        entry: MappingEntry {
            source_key: key.to_string(),
            source: LabelSource {
                label: label.to_string(),
            },
            public_id: format!("pub-{key}"),
            kind: MappingKind::AutoMapped {
                candidate_key: candidate.to_string(),
            },
        },
        option_mappings: options
            .into_iter()
            .map(|entry| (entry.source_key.clone(), entry))
            .collect(),
    }
}

fn candidate_column(key: &str, label: &str, options: &[&str]) -> FilterCandidate {
    FilterCandidate {
        key: key.to_string(),
        label: label.to_string(),
        options: options
            .iter()
            .map(|option| OptionCandidate {
                key: option.to_string(),
                label: format!("{option} label"),
            })
            .collect(),
    }
}

/// Column A has two unreviewed options, column B one manual mapping and one
/// manual "no replacement".
fn two_column_record() -> DataSetVersionMapping {
    let mut mappings = BTreeMap::new();
    mappings.insert(
        "A".to_string(),
        column(
            "A",
            "A",
            "ANew",
            vec![
                option_entry("A1", MappingKind::AutoNone),
                option_entry("A2", MappingKind::AutoNone),
            ],
        ),
    );
    mappings.insert(
        "B".to_string(),
        column(
            "B",
            "B",
            "BNew",
            vec![
                option_entry(
                    "B1",
                    MappingKind::ManualMapped {
                        candidate_key: "B1New".to_string(),
                    },
                ),
                option_entry("B2", MappingKind::ManualNone),
            ],
        ),
    );
    DataSetVersionMapping {
        source_version_id: version("v1"),
        target_version_id: version("v2"),
        locations: Default::default(),
        filters: FilterMappingPlan {
            mappings,
            candidates: vec![
                candidate_column("ANew", "A", &["A9New"]),
                candidate_column("BNew", "B", &["B1New"]),
            ],
        },
        indicators: Default::default(),
        created: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
    }
}

#[test]
fn unmapped_counts_per_filter_column() {
    let review = project(&two_column_record());
    insta::assert_json_snapshot!(review.filter_errors, @r###"
    [
      {
        "id": "a",
        "message": "There are 2 unmapped A options"
      },
      {
        "id": "b",
        "message": "There is 1 unmapped B option"
      }
    ]
    "###);
    assert!(review.location_errors.is_empty());
    assert!(review.indicator_errors.is_empty());
    assert!(!review.filters_complete());
}

#[test]
fn entries_are_partitioned_by_type() {
    let review = project(&two_column_record());
    let b = &review.filters["B"];
    assert!(b.options.auto_mapped.is_empty());
    assert_eq!(b.options.unmapped_and_manual.len(), 2);
    let manual = b
        .options
        .unmapped_and_manual
        .iter()
        .find(|entry| entry.mapping.source_key == "B1")
        .unwrap();
    assert_eq!(
        manual.candidate.as_ref().map(|c| c.key.as_str()),
        Some("B1New")
    );
    assert!(b.options.new_candidates.is_empty());

    let a = &review.filters["A"];
    assert_eq!(a.options.new_candidates.len(), 1);
    assert_eq!(a.options.new_candidates[0].key, "A9New");
    assert_eq!(a.column.candidate.as_ref().map(|c| c.key.as_str()), Some("ANew"));
}

#[test]
fn removed_groups_are_not_reported() {
    let store = MemoryMappingStore::new();
    let record = seed(&store);
    let review = project(&record);

    // Regions and the Ethnicity filter have nothing left to map to.
    assert!(review.location_errors.is_empty());
    assert!(!review.locations[&GeographicLevel::Region].is_live());
    assert!(!review.filters["F2"].is_live());
    assert_eq!(
        review
            .filter_errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>(),
        vec!["There is 1 unmapped School type option"]
    );
    assert_eq!(review.filter_errors[0].id, "school-type");
    assert_eq!(
        review.indicator_errors[0].message,
        "There is 1 unmapped indicator"
    );
    assert!(review.locations_complete());
    assert!(!review.indicators_complete());
    assert!(review.is_major_version_update);
}

#[test]
fn new_candidates_cover_every_dimension() {
    let store = MemoryMappingStore::new();
    let review = project(&seed(&store));
    let la = &review.locations[&GeographicLevel::LocalAuthority];
    assert_eq!(la.auto_mapped.len(), 2);
    assert_eq!(
        la.new_candidates
            .iter()
            .map(|c| c.key.as_str())
            .collect::<Vec<_>>(),
        vec!["LA3New"]
    );
    assert_eq!(review.new_filters.len(), 1);
    assert_eq!(review.new_filters[0].key, "F3New");
    assert_eq!(review.indicators.new_candidates[0].key, "I3New");
}

#[test]
fn reviewing_every_pending_entry_completes_the_mapping() {
    let store = MemoryMappingStore::new();
    seed(&store);
    let id = version("v2");
    apply_override(
        &store,
        &id,
        &MappingPath::filter_option("F1", "F1O2"),
        &MappingUpdate::manual_mapped("F1O3New"),
    )
    .unwrap();
    apply_override(
        &store,
        &id,
        &MappingPath::indicator("I2"),
        &MappingUpdate::manual_none(),
    )
    .unwrap();

    let review = project(&load_mapping(&store, &id).unwrap());
    assert!(review.filters_complete());
    assert!(review.indicators_complete());
    assert!(review.is_complete());
    assert!(review.filter_errors.is_empty());
    // The indicator confirmed as removed is still reported.
    assert_eq!(review.indicator_errors.len(), 1);
    assert!(review.is_major_version_update);
}

#[test]
fn location_errors_use_level_labels() {
    let store = MemoryMappingStore::new();
    seed(&store);
    let id = version("v2");
    for key in ["LA1", "LA2"] {
        apply_override(
            &store,
            &id,
            &MappingPath::location_option(GeographicLevel::LocalAuthority, key),
            &MappingUpdate::manual_none(),
        )
        .unwrap();
    }
    let review = project(&load_mapping(&store, &id).unwrap());
    assert_eq!(review.location_errors.len(), 1);
    assert_eq!(review.location_errors[0].id, "local-authority");
    assert_eq!(
        review.location_errors[0].message,
        "There are 2 unmapped local authorities"
    );
}
