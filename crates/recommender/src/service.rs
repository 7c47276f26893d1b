//! Read-only recommendation lookups over a loaded catalog.
//!
//! ## Algorithm
//! 1. Resolve the title to a catalog position through the `TitleIndex`
//! 2. Take the first `top_n` entries of that position's neighbour list
//! 3. Attach id and title from the record at each neighbour position
//!
//! Nothing is computed at query time beyond the slice and the mapping, so
//! a service can be shared behind an `Arc` without locking.

use crate::error::LookupError;
use crate::title_index::TitleIndex;
use data_loader::{MovieId, MovieRecord};
use pipeline::{ArtifactError, ArtifactStore, Catalog, SimilarityIndex};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, instrument};

/// One neighbour of the queried movie
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub position: usize,
    pub movie_id: Option<MovieId>,
    pub title: String,
    pub score: f32,
}

pub struct RecommendationService {
    records: Vec<MovieRecord>,
    similarity: SimilarityIndex,
    titles: TitleIndex,
}

impl RecommendationService {
    /// Wrap a catalog, rejecting one whose index doesn't match its records.
    pub fn new(catalog: Catalog) -> Result<Self, ArtifactError> {
        catalog.similarity.validate(catalog.records.len())?;
        let titles = TitleIndex::build(&catalog.records);
        if titles.shadowed() > 0 {
            info!(
                "{} records share a title with an earlier one; lookups use the first",
                titles.shadowed()
            );
        }

        Ok(Self {
            records: catalog.records,
            similarity: catalog.similarity,
            titles,
        })
    }

    /// Load the catalog from an artifact directory.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        Self::new(ArtifactStore::new(dir.as_ref()).load_catalog()?)
    }

    /// Up to `top_n` movies most similar to `title`, best first.
    ///
    /// Returns fewer than `top_n` when the index holds fewer neighbours.
    #[instrument(skip(self))]
    pub fn recommend(&self, title: &str, top_n: usize) -> Result<Vec<Recommendation>, LookupError> {
        let position = self
            .titles
            .get(title)
            .ok_or_else(|| LookupError::TitleNotFound(title.to_string()))?;

        let neighbors = self.similarity.neighbors(position).unwrap_or_default();
        let recommendations: Vec<Recommendation> = neighbors
            .iter()
            .take(top_n)
            .map(|nb| {
                let record = &self.records[nb.position];
                Recommendation {
                    position: nb.position,
                    movie_id: record.id,
                    title: record.title.clone(),
                    score: nb.score,
                }
            })
            .collect();

        debug!(
            "'{}' -> {} recommendations (requested {})",
            title,
            recommendations.len(),
            top_n
        );
        Ok(recommendations)
    }

    /// Every title in catalog order, duplicates included.
    pub fn list_titles(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.title.as_str()).collect()
    }

    /// Titles containing `query`, ignoring case. Exact (case-insensitive)
    /// matches come first, then catalog order.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&str> {
        let needle = query.to_lowercase();
        let mut hits: Vec<(bool, usize, &str)> = self
            .records
            .iter()
            .enumerate()
            .filter_map(|(position, r)| {
                let haystack = r.title.to_lowercase();
                haystack
                    .contains(&needle)
                    .then(|| (haystack != needle, position, r.title.as_str()))
            })
            .collect();
        hits.sort();
        hits.into_iter().take(limit).map(|(_, _, title)| title).collect()
    }

    pub fn contains(&self, title: &str) -> bool {
        self.titles.contains(title)
    }

    pub fn record(&self, position: usize) -> Option<&MovieRecord> {
        self.records.get(position)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Neighbours stored per movie
    pub fn k(&self) -> usize {
        self.similarity.k()
    }
}
