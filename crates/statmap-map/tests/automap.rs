//! Tests for record creation and auto-mapping.

mod common;

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use statmap_map::{
    AutoMapOptions, AutoMapper, CandidateCatalog, MappingError, MappingStore, MemoryMappingStore,
    SourceShell, SourceShells, VersionMeta, create_mapping,
};
use statmap_model::{GeographicLevel, LabelSource, MappingType, OptionCandidate};

use common::{seed, source, target, version};

#[test]
fn creates_record_with_auto_mappings() {
    let store = MemoryMappingStore::new();
    let record = seed(&store);

    let la = &record.locations.levels[&GeographicLevel::LocalAuthority];
    assert_eq!(la.mappings["LA1"].candidate_key(), Some("LA1New"));
    assert_eq!(la.mappings["LA2"].candidate_key(), Some("LA2New"));
    assert_eq!(la.mappings["LA2"].public_id, "pub-la2");
    assert_eq!(la.candidates.len(), 3);

    let regions = &record.locations.levels[&GeographicLevel::Region];
    assert_eq!(
        regions.mappings["R1"].mapping_type(),
        MappingType::AutoNone
    );
    assert!(regions.candidates.is_empty());

    let school_type = &record.filters.mappings["F1"];
    assert_eq!(school_type.entry.candidate_key(), Some("F1New"));
    assert_eq!(
        school_type.option_mappings["F1O1"].candidate_key(),
        Some("F1O1New")
    );
    assert_eq!(
        school_type.option_mappings["F1O2"].mapping_type(),
        MappingType::AutoNone
    );

    let ethnicity = &record.filters.mappings["F2"];
    assert_eq!(ethnicity.entry.mapping_type(), MappingType::AutoNone);
    assert_eq!(
        ethnicity.option_mappings["F2O1"].mapping_type(),
        MappingType::AutoNone
    );

    assert_eq!(
        record.indicators.mappings["I1"].candidate_key(),
        Some("I1New")
    );
    assert_eq!(
        record.indicators.mappings["I2"].mapping_type(),
        MappingType::AutoNone
    );
    assert!(record.is_major_version_update());

    let stored = store.load(&version("v2")).unwrap().unwrap();
    assert_eq!(stored, record);
}

#[test]
fn strict_options_ignore_old_codes() {
    let store = MemoryMappingStore::new();
    let record = create_mapping(&store, &source(), &target(), AutoMapOptions::strict()).unwrap();
    let la = &record.locations.levels[&GeographicLevel::LocalAuthority];
    assert_eq!(la.mappings["LA2"].mapping_type(), MappingType::AutoNone);
}

#[test]
fn create_refuses_to_overwrite_existing_record() {
    let store = MemoryMappingStore::new();
    seed(&store);
    let err = create_mapping(&store, &source(), &target(), AutoMapOptions::default()).unwrap_err();
    assert!(matches!(err, MappingError::AlreadyExists(ref id) if id.as_str() == "v2"));
}

#[test]
fn create_rejects_mapping_onto_itself() {
    let store = MemoryMappingStore::new();
    let same = VersionMeta::new(version("v1"), common::target_meta());
    let err = create_mapping(&store, &source(), &same, AutoMapOptions::default()).unwrap_err();
    assert!(matches!(err, MappingError::Validation { .. }));
    assert!(store.is_empty());
}

#[test]
fn build_is_deterministic() {
    let shells = SourceShells::from_meta(&common::source_meta()).unwrap();
    let catalog = CandidateCatalog::from_meta(&common::target_meta());
    let created = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
    let mapper = AutoMapper::default();
    let first = mapper.build(version("v1"), version("v2"), &shells, &catalog, created);
    let second = mapper.build(version("v1"), version("v2"), &shells, &catalog, created);
    assert_eq!(first, second);
}

fn arb_labels() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(prop::sample::select(vec!["A", "B", "C", "Total"]), 0..8)
        .prop_map(|labels| labels.into_iter().map(String::from).collect())
}

fn shells_for(labels: &[String]) -> Vec<SourceShell<LabelSource>> {
    labels
        .iter()
        .enumerate()
        .map(|(idx, label)| SourceShell {
            source_key: format!("S{idx}"),
            source: LabelSource {
                label: label.clone(),
            },
            public_id: format!("pub-{idx}"),
        })
        .collect()
}

fn candidates_for(labels: &[String]) -> Vec<OptionCandidate> {
    labels
        .iter()
        .enumerate()
        .map(|(idx, label)| OptionCandidate {
            key: format!("C{idx}"),
            label: label.clone(),
        })
        .collect()
}

proptest! {
    #[test]
    fn auto_map_is_deterministic(sources in arb_labels(), candidates in arb_labels()) {
        let mapper = AutoMapper::default();
        let sources = shells_for(&sources);
        let candidates = candidates_for(&candidates);
        prop_assert_eq!(
            mapper.map_labels(&sources, &candidates),
            mapper.map_labels(&sources, &candidates)
        );
    }

    #[test]
    fn auto_map_kind_matches_candidate_presence(
        sources in arb_labels(),
        candidates in arb_labels(),
    ) {
        let candidates = candidates_for(&candidates);
        let mapped = AutoMapper::default().map_labels(&shells_for(&sources), &candidates);
        prop_assert_eq!(mapped.len(), sources.len());

        let mut used = std::collections::BTreeSet::new();
        for entry in mapped.values() {
            match entry.mapping_type() {
                MappingType::AutoMapped => {
                    let key = entry.candidate_key();
                    prop_assert!(key.is_some());
                    let key = key.unwrap_or_default();
                    let candidate = candidates.iter().find(|c| c.key == key);
                    prop_assert_eq!(candidate.map(|c| &c.label), Some(&entry.source.label));
                    prop_assert!(used.insert(key.to_string()), "candidate used twice");
                }
                MappingType::AutoNone => prop_assert!(entry.candidate_key().is_none()),
                other => prop_assert!(false, "unexpected type {other}"),
            }
        }
    }
}
