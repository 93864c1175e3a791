//! Shared fixtures for the statmap-map integration tests.
#![allow(dead_code)]

use serde_json::json;
use statmap_map::{AutoMapOptions, MappingStore, VersionMeta, create_mapping};
use statmap_model::{DataSetMeta, DataSetVersionId, DataSetVersionMapping};

pub fn version(id: &str) -> DataSetVersionId {
    DataSetVersionId::new(id).unwrap()
}

/// Live version: two local authorities, one region, two filters, two indicators.
pub fn source_meta() -> DataSetMeta {
    serde_json::from_value(json!({
        "locations": {
            "LA": [
                { "key": "LA1", "label": "Barnsley", "code": "E08000016", "publicId": "pub-la1" },
                {
                    "key": "LA2", "label": "Northamptonshire", "code": "E10000021",
                    "publicId": "pub-la2"
                }
            ],
            "REG": [
                { "key": "R1", "label": "North East", "code": "E12000001", "publicId": "pub-r1" }
            ]
        },
        "filters": [
            {
                "key": "F1", "label": "School type", "publicId": "pub-f1",
                "options": [
                    { "key": "F1O1", "label": "Primary", "publicId": "pub-f1o1" },
                    { "key": "F1O2", "label": "Special", "publicId": "pub-f1o2" }
                ]
            },
            {
                "key": "F2", "label": "Ethnicity", "publicId": "pub-f2",
                "options": [
                    { "key": "F2O1", "label": "White", "publicId": "pub-f2o1" }
                ]
            }
        ],
        "indicators": [
            { "key": "I1", "label": "Enrolments", "publicId": "pub-i1" },
            { "key": "I2", "label": "Absence rate", "publicId": "pub-i2" }
        ]
    }))
    .unwrap()
}

/// Incoming version: Northamptonshire was split (old code kept), regions
/// dropped, Ethnicity replaced by Phase, Absence rate replaced by Attendance.
pub fn target_meta() -> DataSetMeta {
    serde_json::from_value(json!({
        "locations": {
            "LA": [
                { "key": "LA1New", "label": "Barnsley", "code": "E08000016" },
                {
                    "key": "LA2New", "label": "North Northamptonshire",
                    "code": "E06000061", "oldCode": "E10000021"
                },
                { "key": "LA3New", "label": "Leeds", "code": "E08000035" }
            ]
        },
        "filters": [
            {
                "key": "F1New", "label": "School type",
                "options": [
                    { "key": "F1O1New", "label": "Primary" },
                    { "key": "F1O3New", "label": "Secondary" }
                ]
            },
            {
                "key": "F3New", "label": "Phase",
                "options": [ { "key": "F3O1New", "label": "KS1" } ]
            }
        ],
        "indicators": [
            { "key": "I1New", "label": "Enrolments" },
            { "key": "I3New", "label": "Attendance" }
        ]
    }))
    .unwrap()
}

pub fn source() -> VersionMeta {
    VersionMeta::new(version("v1"), source_meta())
}

pub fn target() -> VersionMeta {
    VersionMeta::new(version("v2"), target_meta())
}

/// Creates the fixture record in `store` with default options.
pub fn seed<S: MappingStore>(store: &S) -> DataSetVersionMapping {
    create_mapping(store, &source(), &target(), AutoMapOptions::default()).unwrap()
}
