//! Feature extraction from the encoded list fields of a joined movie row.
//!
//! Genres, keywords, cast and crew arrive as JSON lists of objects. Each is
//! decoded into plain name tokens; a field that can't be decoded becomes an
//! empty list instead of failing the build.

use crate::error::DataError;
use data_loader::MovieRow;
use rayon::prelude::*;
use serde_json::Value;
use tracing::debug;

/// Number of billed cast members kept per movie
pub const DEFAULT_CAST_LIMIT: usize = 5;

/// Decoded token lists for one movie, before composition into tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieFeatures {
    /// Synopsis split on whitespace
    pub overview: Vec<String>,
    pub genres: Vec<String>,
    pub keywords: Vec<String>,
    /// First `cast_limit` cast names, billing order
    pub cast: Vec<String>,
    /// Zero or one director name
    pub director: Vec<String>,
}

/// Decodes joined rows into `MovieFeatures`.
///
/// ## Rules
/// - list fields: the `name` of each element, elements without one skipped
/// - cast: truncated to the first `cast_limit` names
/// - crew: the first member whose `job` is exactly `"Director"`
/// - every name has its internal whitespace removed so that a person's
///   name stays one token through vectorization
#[derive(Debug, Clone, Copy)]
pub struct FeatureExtractor {
    cast_limit: usize,
}

impl FeatureExtractor {
    pub fn new() -> Self {
        Self {
            cast_limit: DEFAULT_CAST_LIMIT,
        }
    }

    /// Configure how many cast members are kept (default: 5)
    pub fn with_cast_limit(mut self, limit: usize) -> Self {
        self.cast_limit = limit;
        self
    }

    /// Extract features for every row, preserving row order.
    pub fn extract_all(&self, rows: &[MovieRow]) -> Vec<MovieFeatures> {
        rows.par_iter().map(|row| self.extract(row)).collect()
    }

    /// Extract features for a single row.
    pub fn extract(&self, row: &MovieRow) -> MovieFeatures {
        let mut cast = parse_names(&row.cast);
        cast.truncate(self.cast_limit);

        MovieFeatures {
            overview: tokenize_overview(&row.overview),
            genres: squash_all(parse_names(&row.genres)),
            keywords: squash_all(parse_names(&row.keywords)),
            cast: squash_all(cast),
            director: squash_all(parse_director(&row.crew)),
        }
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a JSON list of objects and collect their `name` attributes.
pub fn try_parse_names(raw: &str) -> Result<Vec<String>, DataError> {
    let items: Vec<Value> = serde_json::from_str(raw)?;
    Ok(items
        .iter()
        .filter_map(|item| item.get("name").and_then(Value::as_str))
        .map(str::to_string)
        .collect())
}

/// Like `try_parse_names`, with malformed input recovered as an empty list.
pub fn parse_names(raw: &str) -> Vec<String> {
    try_parse_names(raw).unwrap_or_else(|e| {
        debug!("Treating list field as empty: {}", e);
        Vec::new()
    })
}

/// Find the first crew member whose job is exactly "Director".
///
/// `Ok(None)` when the crew has no director, or the director entry has no name.
pub fn try_parse_director(raw: &str) -> Result<Option<String>, DataError> {
    let crew: Vec<Value> = serde_json::from_str(raw)?;
    Ok(crew
        .iter()
        .find(|member| member.get("job").and_then(Value::as_str) == Some("Director"))
        .and_then(|member| member.get("name").and_then(Value::as_str))
        .map(str::to_string))
}

/// Director as a zero-or-one element list; malformed input yields `[]`.
pub fn parse_director(raw: &str) -> Vec<String> {
    match try_parse_director(raw) {
        Ok(director) => director.into_iter().collect(),
        Err(e) => {
            debug!("Treating crew field as empty: {}", e);
            Vec::new()
        }
    }
}

/// Split synopsis text on whitespace. No stemming happens here.
pub fn tokenize_overview(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Remove every whitespace character: "Sam Worthington" -> "SamWorthington"
pub fn squash_whitespace(name: &str) -> String {
    name.chars().filter(|c| !c.is_whitespace()).collect()
}

fn squash_all(names: Vec<String>) -> Vec<String> {
    names.iter().map(|name| squash_whitespace(name)).collect()
}
