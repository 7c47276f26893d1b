//! Core domain types for the movie/credits tables.
//!
//! There are three stages of a movie in this crate:
//! - `RawMovie` / `RawCredit`: one CSV row each, every cell optional
//! - `MovieRow`: a joined row where every required cell is present
//! - `MovieRecord`: the final, immutable record the index is built over

use serde::{Deserialize, Serialize};

// =============================================================================
// Type Aliases
// =============================================================================

/// External catalog identifier (the TMDB movie id)
pub type MovieId = u32;

// =============================================================================
// Raw CSV rows
// =============================================================================

/// One row of `movies.csv`, restricted to the columns the pipeline reads.
///
/// `None` means the cell was empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawMovie {
    pub title: Option<String>,
    pub overview: Option<String>,
    /// JSON list of `{"id": .., "name": ..}` objects
    pub genres: Option<String>,
    /// JSON list of `{"id": .., "name": ..}` objects
    pub keywords: Option<String>,
}

/// One row of `credits.csv`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCredit {
    pub movie_id: Option<String>,
    pub title: Option<String>,
    /// JSON list of cast objects, in billing order
    pub cast: Option<String>,
    /// JSON list of crew objects (`job`, `name`, ...)
    pub crew: Option<String>,
}

// =============================================================================
// Joined rows
// =============================================================================

/// A movie row joined with its credits, all required fields present.
///
/// The list-valued fields are still encoded; decoding them is the job of
/// the feature extractor in the `pipeline` crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieRow {
    /// `None` when the credits cell held something other than an integer
    pub movie_id: Option<MovieId>,
    pub title: String,
    pub overview: String,
    pub genres: String,
    pub keywords: String,
    pub cast: String,
    pub crew: String,
}

/// The final per-movie record persisted next to the similarity index.
///
/// Position in the persisted sequence is the join key with the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: Option<MovieId>,
    pub title: String,
    /// Normalized, stemmed, space-joined tokens; never empty
    pub tags: String,
}

// =============================================================================
// MovieTable - joined, filtered input to the build pipeline
// =============================================================================

/// Ordered collection of joined rows plus bookkeeping about what was dropped.
#[derive(Debug, Default)]
pub struct MovieTable {
    pub(crate) rows: Vec<MovieRow>,
    /// Joined rows dropped because a required cell was empty
    pub(crate) dropped: usize,
}

impl MovieTable {
    /// Creates a new, empty table
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            dropped: 0,
        }
    }

    /// Rows in join order
    pub fn rows(&self) -> &[MovieRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<MovieRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of joined rows rejected for a missing required field
    pub fn dropped_rows(&self) -> usize {
        self.dropped
    }

    /// Append a row that already passed the required-field check
    pub fn push(&mut self, row: MovieRow) {
        self.rows.push(row);
    }
}
