use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One level of nesting between a parent filter and its child filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterHierarchyTier {
    pub level: usize,
    pub filter_id: String,
    pub child_filter_id: String,
    /// Parent option id -> child option ids, in display order.
    pub hierarchy: BTreeMap<String, Vec<String>>,
}

/// A chain of tiers (filter A -> filter B -> filter C).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterHierarchy {
    pub tiers: Vec<FilterHierarchyTier>,
}
