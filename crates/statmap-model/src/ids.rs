#![deny(unsafe_code)]

use std::fmt;

use crate::ModelError;

/// Identifier of one data set version.
///
/// Mapping records are keyed by the id of the version being drafted (the
/// target); the id of the live version it replaces is kept alongside.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct DataSetVersionId(String);

impl DataSetVersionId {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidVersionId(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DataSetVersionId {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DataSetVersionId> for String {
    fn from(value: DataSetVersionId) -> Self {
        value.0
    }
}

impl fmt::Display for DataSetVersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
