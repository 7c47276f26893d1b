//! Tag composition: one normalized, stemmed string per movie.

use crate::features::MovieFeatures;
use rayon::prelude::*;
use rust_stemmers::{Algorithm, Stemmer};

/// Times the synopsis tokens are repeated in the tag list
const OVERVIEW_WEIGHT: usize = 2;

/// Merges a movie's token lists into its tag string.
///
/// Order: synopsis twice, genres, keywords, cast, director. The joined
/// string is lowercased and every whitespace-delimited token is reduced to
/// its English stem.
pub struct TagComposer {
    stemmer: Stemmer,
}

impl TagComposer {
    pub fn new() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    /// Compose tags for every movie, preserving order.
    pub fn compose_all(&self, features: &[MovieFeatures]) -> Vec<String> {
        features.par_iter().map(|f| self.compose(f)).collect()
    }

    pub fn compose(&self, features: &MovieFeatures) -> String {
        let mut tokens: Vec<&str> = Vec::new();
        for _ in 0..OVERVIEW_WEIGHT {
            tokens.extend(features.overview.iter().map(String::as_str));
        }
        for list in [
            &features.genres,
            &features.keywords,
            &features.cast,
            &features.director,
        ] {
            tokens.extend(list.iter().map(String::as_str));
        }

        self.stem_text(&tokens.join(" ").to_lowercase())
    }

    /// Stem each whitespace-delimited token and rejoin with single spaces.
    pub fn stem_text(&self, text: &str) -> String {
        text.split_whitespace()
            .map(|word| self.stemmer.stem(word))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for TagComposer {
    fn default() -> Self {
        Self::new()
    }
}
