//! Projections of imported metadata into candidates and source shells.
//!
//! The incoming version's metadata becomes a [`CandidateCatalog`]; the live
//! version's metadata becomes [`SourceShells`], the unmapped halves of the
//! entries the auto-mapper fills in. Import order is preserved on both sides
//! because it decides ties during auto-mapping.

use std::collections::BTreeMap;

use statmap_model::{
    DataSetMeta, FilterCandidate, GeographicLevel, LabelSource, LocationCandidate,
    LocationSource, MappingEntry, MappingKind, OptionCandidate,
};

use crate::error::{MappingError, Result};

/// Candidates offered by an incoming data set version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateCatalog {
    pub locations: BTreeMap<GeographicLevel, Vec<LocationCandidate>>,
    pub filters: Vec<FilterCandidate>,
    pub indicators: Vec<OptionCandidate>,
}

impl CandidateCatalog {
    pub fn from_meta(meta: &DataSetMeta) -> Self {
        let locations = meta
            .locations
            .iter()
            .map(|(level, options)| {
                let candidates = options
                    .iter()
                    .map(|option| LocationCandidate {
                        key: option.key.clone(),
                        label: option.label.clone(),
                        attributes: option.attributes.clone(),
                    })
                    .collect();
                (*level, candidates)
            })
            .collect();
        let filters = meta
            .filters
            .iter()
            .map(|filter| FilterCandidate {
                key: filter.key.clone(),
                label: filter.label.clone(),
                options: filter
                    .options
                    .iter()
                    .map(|option| OptionCandidate {
                        key: option.key.clone(),
                        label: option.label.clone(),
                    })
                    .collect(),
            })
            .collect();
        let indicators = meta
            .indicators
            .iter()
            .map(|indicator| OptionCandidate {
                key: indicator.key.clone(),
                label: indicator.label.clone(),
            })
            .collect();
        Self {
            locations,
            filters,
            indicators,
        }
    }

    pub fn location_candidates(&self, level: GeographicLevel) -> &[LocationCandidate] {
        self.locations
            .get(&level)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// A source value before the auto-mapper has decided its mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceShell<S> {
    pub source_key: String,
    pub source: S,
    pub public_id: String,
}

impl<S: Clone> SourceShell<S> {
    pub fn to_entry(&self, kind: MappingKind) -> MappingEntry<S> {
        MappingEntry {
            source_key: self.source_key.clone(),
            source: self.source.clone(),
            public_id: self.public_id.clone(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterShell {
    pub column: SourceShell<LabelSource>,
    pub options: Vec<SourceShell<LabelSource>>,
}

/// Source shells of every dimension of the live version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceShells {
    pub locations: BTreeMap<GeographicLevel, Vec<SourceShell<LocationSource>>>,
    pub filters: Vec<FilterShell>,
    pub indicators: Vec<SourceShell<LabelSource>>,
}

impl SourceShells {
    /// Builds shells from the live version's metadata.
    ///
    /// Every value of a live version has a public identifier; a missing one
    /// means the metadata did not come from a published version.
    pub fn from_meta(meta: &DataSetMeta) -> Result<Self> {
        let mut locations = BTreeMap::new();
        for (level, options) in &meta.locations {
            let mut shells = Vec::with_capacity(options.len());
            for option in options {
                shells.push(SourceShell {
                    source_key: option.key.clone(),
                    source: LocationSource {
                        label: option.label.clone(),
                        attributes: option.attributes.clone(),
                    },
                    public_id: required_public_id(
                        option.public_id.as_deref(),
                        &format!("locations/{level}/{}", option.key),
                    )?,
                });
            }
            locations.insert(*level, shells);
        }

        let mut filters = Vec::with_capacity(meta.filters.len());
        for filter in &meta.filters {
            let mut options = Vec::with_capacity(filter.options.len());
            for option in &filter.options {
                options.push(label_shell(
                    &option.key,
                    &option.label,
                    option.public_id.as_deref(),
                    &format!("filters/{}/options/{}", filter.key, option.key),
                )?);
            }
            filters.push(FilterShell {
                column: label_shell(
                    &filter.key,
                    &filter.label,
                    filter.public_id.as_deref(),
                    &format!("filters/{}", filter.key),
                )?,
                options,
            });
        }

        let mut indicators = Vec::with_capacity(meta.indicators.len());
        for indicator in &meta.indicators {
            indicators.push(label_shell(
                &indicator.key,
                &indicator.label,
                indicator.public_id.as_deref(),
                &format!("indicators/{}", indicator.key),
            )?);
        }

        Ok(Self {
            locations,
            filters,
            indicators,
        })
    }
}

fn label_shell(
    key: &str,
    label: &str,
    public_id: Option<&str>,
    location: &str,
) -> Result<SourceShell<LabelSource>> {
    Ok(SourceShell {
        source_key: key.to_string(),
        source: LabelSource {
            label: label.to_string(),
        },
        public_id: required_public_id(public_id, location)?,
    })
}

fn required_public_id(public_id: Option<&str>, location: &str) -> Result<String> {
    match public_id.map(str::trim) {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(MappingError::validation(
            location,
            "source value has no public identifier",
        )),
    }
}
