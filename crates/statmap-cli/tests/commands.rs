//! Integration tests for the CLI commands.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use statmap_cli::commands::{
    run_create, run_delete, run_list, run_override, run_reconcile, run_review,
};
use statmap_cli::types::{CreateRequest, OverrideRequest, ReconcileOutput, ReconcileRequest};
use statmap_map::{AutoMapOptions, MappingPath, MappingUpdate};
use statmap_model::{DataSetVersionId, MappingType};

fn write_json(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

fn version(id: &str) -> DataSetVersionId {
    DataSetVersionId::new(id).unwrap()
}

fn create_request(dir: &Path) -> CreateRequest {
    let source = write_json(
        dir,
        "source.json",
        &json!({
            "filters": [{
                "key": "F1", "label": "Sex", "publicId": "pub-f1",
                "options": [
                    { "key": "F1O1", "label": "Female", "publicId": "pub-f1o1" },
                    { "key": "F1O2", "label": "Unknown", "publicId": "pub-f1o2" }
                ]
            }],
            "indicators": [ { "key": "I1", "label": "Pupils", "publicId": "pub-i1" } ]
        }),
    );
    let target = write_json(
        dir,
        "target.json",
        &json!({
            "filters": [{
                "key": "F1New", "label": "sex",
                "options": [
                    { "key": "F1O1New", "label": "female" },
                    { "key": "F1O3New", "label": "Not recorded" }
                ]
            }],
            "indicators": [ { "key": "I1New", "label": "Pupils" } ]
        }),
    );
    CreateRequest {
        store_dir: dir.join("store"),
        source_version: version("2024-v1"),
        source_meta: source,
        target_version: version("2024-v2"),
        target_meta: target,
        options: AutoMapOptions::default(),
    }
}

#[test]
fn create_review_override_and_delete() {
    let dir = tempfile::tempdir().unwrap();
    let mut request = create_request(dir.path());
    request.options.label_matching = statmap_map::LabelMatching::IgnoreCase;
    let mapping = run_create(&request).unwrap();
    assert_eq!(
        mapping.filters.mappings["F1"].option_mappings["F1O1"].candidate_key(),
        Some("F1O1New")
    );

    let review = run_review(&request.store_dir, &request.target_version).unwrap();
    assert_eq!(review.filter_errors.len(), 1);
    assert_eq!(review.filter_errors[0].id, "sex");
    assert_eq!(
        review.filter_errors[0].message,
        "There is 1 unmapped Sex option"
    );

    let entry = run_override(&OverrideRequest {
        store_dir: request.store_dir.clone(),
        version: request.target_version.clone(),
        target: MappingPath::filter_option("F1", "F1O2"),
        update: MappingUpdate::from_parts(MappingType::ManualMapped, Some("F1O3New".to_string()))
            .unwrap(),
    })
    .unwrap();
    assert_eq!(entry.kind().candidate_key(), Some("F1O3New"));

    let review = run_review(&request.store_dir, &request.target_version).unwrap();
    assert!(review.filter_errors.is_empty());
    assert!(review.is_complete());
    assert!(!review.is_major_version_update);

    let listed = run_list(&request.store_dir).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].unmapped_count, 0);

    run_delete(&request.store_dir, &request.target_version).unwrap();
    assert!(run_list(&request.store_dir).unwrap().is_empty());
    let err = run_delete(&request.store_dir, &request.target_version).unwrap_err();
    assert!(format!("{err:#}").contains("not found"));
}

#[test]
fn exact_labels_leave_case_changes_unmapped() {
    let dir = tempfile::tempdir().unwrap();
    let request = create_request(dir.path());
    let mapping = run_create(&request).unwrap();
    assert_eq!(
        mapping.filters.mappings["F1"].entry.mapping_type(),
        MappingType::AutoNone
    );
    assert!(run_create(&request).is_err());
}

#[test]
fn missing_metadata_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut request = create_request(dir.path());
    request.source_meta = dir.path().join("missing.json");
    let err = run_create(&request).unwrap_err();
    assert!(format!("{err:#}").contains("missing.json"));
}

#[test]
fn reconcile_expands_along_hierarchy() {
    let dir = tempfile::tempdir().unwrap();
    let meta = write_json(
        dir.path(),
        "meta.json",
        &json!({
            "filters": [
                {
                    "key": "phase", "label": "Phase",
                    "options": [
                        { "key": "primary", "label": "Primary" },
                        { "key": "phaseTotal", "label": "Total" }
                    ]
                },
                {
                    "key": "type", "label": "School type",
                    "options": [
                        { "key": "academy", "label": "Academy" },
                        { "key": "typeTotal", "label": "Total" }
                    ]
                }
            ],
            "filterHierarchies": [{
                "tiers": [{
                    "level": 0,
                    "filterId": "phase",
                    "childFilterId": "type",
                    "hierarchy": {
                        "primary": ["academy", "typeTotal"]
                    }
                }]
            }]
        }),
    );

    let slices = run_reconcile(&ReconcileRequest {
        meta: meta.clone(),
        selected: vec!["primary".to_string()],
        flat: false,
    })
    .unwrap();
    match slices {
        ReconcileOutput::Slices(slices) => {
            assert_eq!(slices["primary"], vec!["primary", "typeTotal"]);
        }
        other => panic!("unexpected output: {other:?}"),
    }

    let flat = run_reconcile(&ReconcileRequest {
        meta,
        selected: vec!["academy".to_string(), "primary".to_string()],
        flat: true,
    })
    .unwrap();
    insta::assert_debug_snapshot!(flat, @r###"
    Flat(
        [
            "primary",
            "academy",
            "typeTotal",
        ],
    )
    "###);
}
