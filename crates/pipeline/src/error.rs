//! Error types for the build pipeline.
//!
//! - `DataError`: one encoded field could not be decoded (always recovered)
//! - `ConfigError`: hyper-parameters don't fit the dataset (fatal, pre-write)
//! - `ArtifactError`: reading or writing the persisted artifacts failed
//! - `BuildError`: anything that stops an offline build

use data_loader::DataLoadError;
use thiserror::Error;

/// A single list-of-records field could not be decoded.
///
/// Never escapes the feature extractor: the field becomes an empty list.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("malformed field: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Build configuration incompatible with the data it is applied to.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("cannot build an index from an empty corpus")]
    EmptyCorpus,

    #[error("n_components must be at least 1")]
    ZeroComponents,

    /// Requested more reduced dimensions than the matrix has rank for
    #[error(
        "cannot reduce to {requested} dimensions: corpus has {documents} documents and \
         {terms} terms"
    )]
    Dimensionality {
        requested: usize,
        documents: usize,
        terms: usize,
    },

    #[error("invalid n-gram range ({min}, {max})")]
    NgramRange { min: usize, max: usize },

    #[error(
        "max_df {max_df} corresponds to {max_docs:.1} documents, fewer than min_df {min_df}"
    )]
    DocumentFrequencyBounds {
        max_df: f64,
        max_docs: f64,
        min_df: usize,
    },

    #[error("after pruning, no terms remain; try a lower min_df or a higher max_df")]
    EmptyVocabulary,
}

/// Failures reading or writing the persisted artifacts
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("artifact not found: {path}")]
    Missing { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Artifacts were read but don't describe the same dataset
    #[error("inconsistent artifacts: {0}")]
    Inconsistent(String),
}

/// Anything that aborts the offline build
#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Data(#[from] DataLoadError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}
