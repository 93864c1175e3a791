//! Expansion of selected filter options along filter hierarchies.
//!
//! The query engine resolves rows of a hierarchical filter only when it is
//! given the full vertical slice of a selection: every ancestor of the
//! selected option, and below it the chain of "Total" children. The
//! [`HierarchyIndex`] is built once per hierarchy load and answers those
//! expansions without rescanning labels.

use std::collections::{BTreeMap, BTreeSet};

use statmap_model::FilterHierarchy;
use thiserror::Error;
use tracing::warn;

/// Label that marks the aggregate child of a parent option.
pub const TOTAL_LABEL: &str = "total";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    /// The option is neither a known filter option nor part of a hierarchy.
    #[error("unknown filter option: {0}")]
    UnknownOption(String),
}

/// Selected option id -> `[ancestors (root first).., selected, totals..]`.
pub type Reconciliation = BTreeMap<String, Vec<String>>;

/// Combined view of every tier of every hierarchy of a data set version.
#[derive(Debug, Clone, Default)]
pub struct HierarchyIndex {
    children: BTreeMap<String, Vec<String>>,
    parents: BTreeMap<String, String>,
    totals: BTreeMap<String, String>,
    known: BTreeSet<String>,
    has_tiers: bool,
}

impl HierarchyIndex {
    /// Flattens all tiers into one parent -> children map and pre-computes the
    /// inverse map and the total child of every parent.
    ///
    /// `option_labels` maps option ids to labels; it is only consulted to
    /// find total children and to recognise valid ids.
    pub fn build(
        hierarchies: &[FilterHierarchy],
        option_labels: &BTreeMap<String, String>,
    ) -> Self {
        let mut index = Self {
            known: option_labels.keys().cloned().collect(),
            ..Self::default()
        };

        for tier in hierarchies.iter().flat_map(|hierarchy| hierarchy.tiers.iter()) {
            index.has_tiers = true;
            for (parent, children) in &tier.hierarchy {
                index.known.insert(parent.clone());
                let combined = index.children.entry(parent.clone()).or_default();
                for child in children {
                    index.known.insert(child.clone());
                    if !combined.contains(child) {
                        combined.push(child.clone());
                    }
                }
            }
        }

        for (parent, children) in &index.children {
            for child in children {
                match index.parents.get(child) {
                    Some(existing) if existing != parent => {
                        warn!(
                            option = %child,
                            kept_parent = %existing,
                            ignored_parent = %parent,
                            "filter option has more than one parent, keeping the first"
                        );
                    }
                    Some(_) => {}
                    None => {
                        index.parents.insert(child.clone(), parent.clone());
                    }
                }
            }
        }

        // Only a parent that kept the child may descend into it as its total.
        for (parent, children) in &index.children {
            let mut totals = children.iter().filter(|child| {
                index.parents.get(*child) == Some(parent)
                    && option_labels
                        .get(*child)
                        .is_some_and(|label| label.eq_ignore_ascii_case(TOTAL_LABEL))
            });
            if let Some(total) = totals.next() {
                let extra = totals.count();
                if extra > 0 {
                    warn!(
                        %parent,
                        kept_total = %total,
                        extra,
                        "multiple total options under one parent, using the first"
                    );
                }
                index.totals.insert(parent.clone(), total.clone());
            }
        }

        index
    }

    /// True when at least one tier was supplied.
    pub fn has_tiers(&self) -> bool {
        self.has_tiers
    }

    pub fn parent(&self, option_id: &str) -> Option<&str> {
        self.parents.get(option_id).map(String::as_str)
    }

    pub fn children(&self, option_id: &str) -> &[String] {
        self.children
            .get(option_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The total child of `option_id`, if it has one.
    pub fn total_child(&self, option_id: &str) -> Option<&str> {
        self.totals.get(option_id).map(String::as_str)
    }

    /// Expands each selected id into its vertical slice.
    pub fn reconcile<S: AsRef<str>>(
        &self,
        selected: &[S],
    ) -> Result<Reconciliation, HierarchyError> {
        let mut reconciled = Reconciliation::new();
        for id in selected {
            let id = id.as_ref();
            reconciled.insert(id.to_string(), self.expand(id)?);
        }
        Ok(reconciled)
    }

    /// Flat, order-preserving, de-duplicated id list for the query engine,
    /// for callers that did not expand the selection themselves.
    pub fn expand_for_query<S: AsRef<str>>(
        &self,
        selected: &[S],
    ) -> Result<Vec<String>, HierarchyError> {
        let mut seen = BTreeSet::new();
        let mut flat = Vec::new();
        for id in selected {
            for expanded in self.expand(id.as_ref())? {
                if seen.insert(expanded.clone()) {
                    flat.push(expanded);
                }
            }
        }
        Ok(flat)
    }

    fn expand(&self, id: &str) -> Result<Vec<String>, HierarchyError> {
        if !self.has_tiers {
            return Ok(vec![id.to_string()]);
        }
        if !self.known.contains(id) {
            return Err(HierarchyError::UnknownOption(id.to_string()));
        }

        let mut visited = BTreeSet::from([id.to_string()]);
        let mut ancestors = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            if !visited.insert(parent.to_string()) {
                warn!(option = %id, %parent, "cycle in filter hierarchy, stopping ascent");
                break;
            }
            ancestors.push(parent.to_string());
            current = parent;
        }
        ancestors.reverse();

        let mut slice = ancestors;
        slice.push(id.to_string());

        let mut current = id;
        while let Some(total) = self.total_child(current) {
            if !visited.insert(total.to_string()) {
                warn!(option = %id, %total, "cycle in filter hierarchy, stopping descent");
                break;
            }
            slice.push(total.to_string());
            current = total;
        }

        Ok(slice)
    }
}
