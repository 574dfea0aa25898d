//! Load-time errors for declarative data.

use std::path::PathBuf;

use thiserror::Error;

use super::Category;

/// Malformed or contradictory declarative data.
///
/// Always detected before any build work starts.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("failed to parse `{path}`")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("record `{id}`: identifier must match [A-Za-z_][A-Za-z0-9_]*")]
    InvalidIdentifier { id: String },

    #[error("record `{id}`: identifier is reserved for the template context")]
    ReservedIdentifier { id: String },

    #[error("record `{id}`: duplicate identifier (first declared in `{first}`)")]
    DuplicateRecord { id: String, first: PathBuf },

    #[error("record `{id}`: missing coefficients")]
    MissingCoefficients { id: String },

    #[error("record `{id}`: unknown coefficient `{term}` (expected c5..c0)")]
    UnknownTerm { id: String, term: String },

    #[error("record `{id}`: `{term}` is not numeric ({value})")]
    NonNumeric {
        id: String,
        term: String,
        value: String,
    },

    #[error("record `{id}`: `{term}` has a zero denominator")]
    ZeroDenominator { id: String, term: String },

    #[error("record `{id}`: {category} requires c5 = 6 + |S| = {expected}, found {found}")]
    StrangenessRule {
        id: String,
        category: Category,
        expected: i64,
        found: String,
    },

    #[error("record `{id}`: exponential sign must be +1 or -1, found {sign}")]
    ExponentialSign { id: String, sign: i64 },

    #[error("record `{id}`: correction `{field}` is out of range ({value})")]
    CorrectionRange {
        id: String,
        field: &'static str,
        value: i64,
    },

    #[error("page `{output}`: references unknown record `{id}`")]
    UnknownRecord { output: PathBuf, id: String },

    #[error("page `{output}`: no record belongs to family `{family}`")]
    UnknownFamily { output: PathBuf, family: String },

    #[error("page `{output}`: duplicate output path (first declared in `{first}`)")]
    DuplicateOutput { output: PathBuf, first: PathBuf },

    #[error("page `{output}`: output must be a relative path inside the output directory")]
    InvalidOutput { output: PathBuf },
}

/// Failure to produce a [`Registry`](super::Registry).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
