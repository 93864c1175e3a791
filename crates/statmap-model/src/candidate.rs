//! Candidate values offered by an incoming data set version.

use serde::{Deserialize, Serialize};

/// Structural identity of a location option.
///
/// Which attributes are present depends on the geographic level: most levels
/// only carry a `code`, schools carry `urn`/`laEstab`, providers `ukprn`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub la_estab: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ukprn: Option<String>,
}

impl LocationAttributes {
    /// True when no structural attribute is set (blank strings count as unset).
    pub fn is_empty(&self) -> bool {
        [
            &self.code,
            &self.old_code,
            &self.urn,
            &self.la_estab,
            &self.ukprn,
        ]
        .into_iter()
        .all(|value| non_blank(value.as_deref()).is_none())
    }

    pub fn code(&self) -> Option<&str> {
        non_blank(self.code.as_deref())
    }

    pub fn old_code(&self) -> Option<&str> {
        non_blank(self.old_code.as_deref())
    }

    pub fn urn(&self) -> Option<&str> {
        non_blank(self.urn.as_deref())
    }

    pub fn la_estab(&self) -> Option<&str> {
        non_blank(self.la_estab.as_deref())
    }

    pub fn ukprn(&self) -> Option<&str> {
        non_blank(self.ukprn.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// A location option of the incoming version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationCandidate {
    pub key: String,
    pub label: String,
    #[serde(flatten)]
    pub attributes: LocationAttributes,
}

/// A filter option or indicator of the incoming version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionCandidate {
    pub key: String,
    pub label: String,
}

/// A filter column of the incoming version, with its option candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCandidate {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub options: Vec<OptionCandidate>,
}

impl FilterCandidate {
    pub fn option(&self, key: &str) -> Option<&OptionCandidate> {
        self.options.iter().find(|option| option.key == key)
    }
}
