//! Top-k cosine neighbour lists over the reduced movie vectors.

use crate::error::ArtifactError;
use ndarray::{Array2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::info;

/// Default neighbours kept per movie
pub const DEFAULT_TOP_K: usize = 30;

/// A single neighbour: catalog position and cosine similarity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub position: usize,
    pub score: f32,
}

impl Neighbor {
    /// Descending score, then ascending position.
    fn rank(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then(self.position.cmp(&other.position))
    }
}

/// Per-movie neighbour lists, indexed by catalog position.
///
/// Each list holds `min(k, n - 1)` entries, never the movie itself, sorted
/// by [`Neighbor`] rank order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityIndex {
    k: usize,
    neighbors: Vec<Vec<Neighbor>>,
}

impl SimilarityIndex {
    /// Build neighbour lists for every row of `vectors`.
    ///
    /// Rows with zero norm score 0 against everything.
    pub fn build(vectors: &Array2<f64>, k: usize) -> Self {
        let mut normalized = vectors.to_owned();
        for mut row in normalized.axis_iter_mut(Axis(0)) {
            let norm = row.dot(&row).sqrt();
            if norm > 0.0 {
                row.mapv_inplace(|v| v / norm);
            }
        }

        let n = normalized.nrows();
        let neighbors: Vec<Vec<Neighbor>> = (0..n)
            .into_par_iter()
            .map(|i| {
                let scores = normalized.dot(&normalized.row(i));
                let candidates = scores
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .map(|(j, &s)| Neighbor {
                        position: j,
                        score: (s as f32).clamp(-1.0, 1.0),
                    })
                    .collect();
                top_k(candidates, k)
            })
            .collect();

        info!(
            "Built similarity index: {} movies, {} neighbours each",
            n,
            k.min(n.saturating_sub(1))
        );

        Self { k, neighbors }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Neighbours of the movie at `position`, best first.
    pub fn neighbors(&self, position: usize) -> Option<&[Neighbor]> {
        self.neighbors.get(position).map(Vec::as_slice)
    }

    /// Structural checks run after loading from disk.
    pub fn validate(&self, catalog_len: usize) -> Result<(), ArtifactError> {
        if self.neighbors.len() != catalog_len {
            return Err(ArtifactError::Inconsistent(format!(
                "similarity index has {} rows, catalog has {} movies",
                self.neighbors.len(),
                catalog_len
            )));
        }
        let expected = self.k.min(catalog_len.saturating_sub(1));
        for (i, list) in self.neighbors.iter().enumerate() {
            if list.len() != expected {
                return Err(ArtifactError::Inconsistent(format!(
                    "row {} has {} neighbours, expected {}",
                    i,
                    list.len(),
                    expected
                )));
            }
            if let Some(bad) = list
                .iter()
                .find(|nb| nb.position == i || nb.position >= catalog_len)
            {
                return Err(ArtifactError::Inconsistent(format!(
                    "row {} references invalid position {}",
                    i, bad.position
                )));
            }
        }
        Ok(())
    }
}

fn top_k(mut candidates: Vec<Neighbor>, k: usize) -> Vec<Neighbor> {
    if k == 0 {
        return Vec::new();
    }
    if candidates.len() > k {
        candidates.select_nth_unstable_by(k - 1, Neighbor::rank);
        candidates.truncate(k);
    }
    candidates.sort_by(Neighbor::rank);
    candidates
}
