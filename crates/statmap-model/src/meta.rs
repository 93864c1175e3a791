//! Dimension metadata of one data set version, as handed over by ingestion.
//!
//! The same shape describes both sides of a mapping: the live version the
//! mapping starts from (whose options carry public identifiers) and the
//! incoming version whose options become candidates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::candidate::LocationAttributes;
use crate::hierarchy::FilterHierarchy;
use crate::level::GeographicLevel;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSetMeta {
    #[serde(default)]
    pub locations: BTreeMap<GeographicLevel, Vec<LocationOptionMeta>>,
    #[serde(default)]
    pub filters: Vec<FilterMeta>,
    #[serde(default)]
    pub indicators: Vec<IndicatorMeta>,
    #[serde(default)]
    pub filter_hierarchies: Vec<FilterHierarchy>,
}

impl DataSetMeta {
    /// Labels of every filter option, keyed by option key.
    pub fn option_labels(&self) -> BTreeMap<String, String> {
        self.filters
            .iter()
            .flat_map(|filter| filter.options.iter())
            .map(|option| (option.key.clone(), option.label.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationOptionMeta {
    pub key: String,
    pub label: String,
    #[serde(flatten)]
    pub attributes: LocationAttributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterMeta {
    pub key: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
    #[serde(default)]
    pub options: Vec<FilterOptionMeta>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptionMeta {
    pub key: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorMeta {
    pub key: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
}
