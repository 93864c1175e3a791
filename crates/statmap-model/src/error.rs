use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid data set version id: {0:?}")]
    InvalidVersionId(String),
    #[error("unknown geographic level code: {0}")]
    UnknownGeographicLevel(String),
    #[error("mapping type {mapping_type} requires a candidate key")]
    MissingCandidateKey { mapping_type: String },
    #[error("mapping type {mapping_type} must not carry a candidate key (got {candidate_key})")]
    UnexpectedCandidateKey {
        mapping_type: String,
        candidate_key: String,
    },
}

pub type Result<T> = std::result::Result<T, ModelError>;
