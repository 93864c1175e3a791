//! Typed addresses of entries inside a persisted mapping record.
//!
//! Stores perform partial updates at these addresses instead of rewriting a
//! whole record. Paths are built from enum variants so a caller cannot
//! produce a segment list that points somewhere unexpected.

use std::fmt;

use statmap_model::GeographicLevel;

/// Address of one mapping entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MappingPath {
    /// `locations/levels/{level}/mappings/{sourceKey}`
    LocationOption {
        level: GeographicLevel,
        source_key: String,
    },
    /// `filters/mappings/{filterKey}`
    Filter { filter_key: String },
    /// `filters/mappings/{filterKey}/optionMappings/{sourceKey}`
    FilterOption {
        filter_key: String,
        source_key: String,
    },
    /// `indicators/mappings/{sourceKey}`
    Indicator { source_key: String },
}

/// Scalar fields of an entry that may be written in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappingField {
    Type,
    CandidateKey,
}

impl MappingField {
    pub fn name(self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::CandidateKey => "candidateKey",
        }
    }
}

impl MappingPath {
    pub fn location_option(level: GeographicLevel, source_key: impl Into<String>) -> Self {
        Self::LocationOption {
            level,
            source_key: source_key.into(),
        }
    }

    pub fn filter(filter_key: impl Into<String>) -> Self {
        Self::Filter {
            filter_key: filter_key.into(),
        }
    }

    pub fn filter_option(filter_key: impl Into<String>, source_key: impl Into<String>) -> Self {
        Self::FilterOption {
            filter_key: filter_key.into(),
            source_key: source_key.into(),
        }
    }

    pub fn indicator(source_key: impl Into<String>) -> Self {
        Self::Indicator {
            source_key: source_key.into(),
        }
    }

    /// Ordered path segments from the record root to the entry.
    pub fn segments(&self) -> Vec<String> {
        match self {
            Self::LocationOption { level, source_key } => vec![
                "locations".to_string(),
                "levels".to_string(),
                level.code().to_string(),
                "mappings".to_string(),
                source_key.clone(),
            ],
            Self::Filter { filter_key } => vec![
                "filters".to_string(),
                "mappings".to_string(),
                filter_key.clone(),
            ],
            Self::FilterOption {
                filter_key,
                source_key,
            } => vec![
                "filters".to_string(),
                "mappings".to_string(),
                filter_key.clone(),
                "optionMappings".to_string(),
                source_key.clone(),
            ],
            Self::Indicator { source_key } => vec![
                "indicators".to_string(),
                "mappings".to_string(),
                source_key.clone(),
            ],
        }
    }

    /// RFC 6901 JSON pointer to the entry.
    pub fn pointer(&self) -> String {
        let mut pointer = String::new();
        for segment in self.segments() {
            pointer.push('/');
            pointer.push_str(&escape_segment(&segment));
        }
        pointer
    }

    /// JSON pointer to one field of the entry.
    pub fn field_pointer(&self, field: MappingField) -> String {
        format!("{}/{}", self.pointer(), field.name())
    }

    pub fn source_key(&self) -> &str {
        match self {
            Self::LocationOption { source_key, .. }
            | Self::FilterOption { source_key, .. }
            | Self::Indicator { source_key } => source_key,
            Self::Filter { filter_key } => filter_key,
        }
    }
}

impl fmt::Display for MappingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments().join("/"))
    }
}

fn escape_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}
