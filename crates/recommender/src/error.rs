use thiserror::Error;

/// A query that can't be answered from the catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("movie not found: {0}")]
    TitleNotFound(String),
}
