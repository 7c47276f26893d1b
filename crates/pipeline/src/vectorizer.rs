//! TF-IDF vectorizer over unigrams and bigrams.
//!
//! ## Algorithm
//! 1. Analyze each document: lowercase, pick tokens of two or more word
//!    characters, drop stop words, then emit the n-grams in `ngram_range`
//! 2. Count document frequency (df) and total frequency per term
//! 3. Keep terms with `min_df <= df <= max_df * n_docs`
//! 4. Keep the `max_features` most frequent terms (ties by term order)
//! 5. idf = ln((1 + n) / (1 + df)) + 1
//! 6. Each row = raw count * idf, L2-normalized

use crate::error::ConfigError;
use crate::sparse::{SparseMatrix, SparseVector};
use crate::stop_words;
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;
use tracing::{debug, info};

static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("static token pattern compiles"));

/// Hyper-parameters of the vectorizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerConfig {
    /// Vocabulary cap; `None` keeps every term that passes the df filter
    pub max_features: Option<usize>,
    /// Minimum number of documents a term must appear in
    pub min_df: usize,
    /// Maximum fraction of documents a term may appear in
    pub max_df: f64,
    /// Inclusive n-gram length range
    pub ngram_range: (usize, usize),
    pub remove_stop_words: bool,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: Some(3000),
            min_df: 2,
            max_df: 0.8,
            ngram_range: (1, 2),
            remove_stop_words: true,
        }
    }
}

/// A fitted TF-IDF model.
///
/// The vocabulary is kept in a `BTreeMap` so the serialized form doesn't
/// depend on hash order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    config: VectorizerConfig,
    /// term -> column index, columns in lexicographic term order
    vocabulary: BTreeMap<String, usize>,
    /// idf weight per column
    idf: Vec<f64>,
}

#[derive(Default)]
struct TermStats {
    df: usize,
    total: u64,
}

impl TfidfVectorizer {
    /// Fit on `docs` and return the model together with the transformed corpus.
    pub fn fit_transform<S: AsRef<str> + Sync>(
        config: VectorizerConfig,
        docs: &[S],
    ) -> Result<(Self, SparseMatrix), ConfigError> {
        validate_config(&config, docs.len())?;

        let counts: Vec<HashMap<String, u32>> = docs
            .par_iter()
            .map(|doc| count_terms(&config, doc.as_ref()))
            .collect();

        let mut stats: HashMap<&str, TermStats> = HashMap::new();
        for doc_counts in &counts {
            for (term, &count) in doc_counts {
                let entry = stats.entry(term.as_str()).or_default();
                entry.df += 1;
                entry.total += u64::from(count);
            }
        }
        debug!("Analyzed {} documents, {} distinct terms", docs.len(), stats.len());

        let n_docs = docs.len() as f64;
        let max_docs = config.max_df * n_docs;
        let mut kept: Vec<(&str, TermStats)> = stats
            .into_iter()
            .filter(|(_, s)| s.df >= config.min_df && (s.df as f64) <= max_docs)
            .collect();
        kept.sort_by(|a, b| a.0.cmp(b.0));

        if let Some(limit) = config.max_features {
            if kept.len() > limit {
                // stable: equal totals keep lexicographic order
                kept.sort_by(|a, b| b.1.total.cmp(&a.1.total));
                kept.truncate(limit);
                kept.sort_by(|a, b| a.0.cmp(b.0));
            }
        }

        if kept.is_empty() {
            return Err(ConfigError::EmptyVocabulary);
        }

        let vocabulary: BTreeMap<String, usize> = kept
            .iter()
            .enumerate()
            .map(|(column, (term, _))| (term.to_string(), column))
            .collect();
        let idf: Vec<f64> = kept
            .iter()
            .map(|(_, s)| ((1.0 + n_docs) / (1.0 + s.df as f64)).ln() + 1.0)
            .collect();

        let vectorizer = Self {
            config,
            vocabulary,
            idf,
        };
        let rows = counts
            .par_iter()
            .map(|doc_counts| vectorizer.weigh(doc_counts))
            .collect();
        let matrix = SparseMatrix::new(vectorizer.vocabulary.len(), rows);

        info!(
            "Fitted TF-IDF: {} terms, {} non-zeros over {} documents",
            vectorizer.vocabulary.len(),
            matrix.nnz(),
            matrix.n_rows()
        );
        Ok((vectorizer, matrix))
    }

    /// Project documents into the fitted term space.
    pub fn transform<S: AsRef<str> + Sync>(&self, docs: &[S]) -> SparseMatrix {
        let rows = docs
            .par_iter()
            .map(|doc| self.transform_one(doc.as_ref()))
            .collect();
        SparseMatrix::new(self.vocabulary.len(), rows)
    }

    /// Project a single document. Terms outside the vocabulary are ignored.
    pub fn transform_one(&self, doc: &str) -> SparseVector {
        self.weigh(&count_terms(&self.config, doc))
    }

    /// Terms emitted for `doc`, in document order.
    pub fn analyze(&self, doc: &str) -> Vec<String> {
        analyze(&self.config, doc)
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn column(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.column(term).map(|column| self.idf[column])
    }

    /// Vocabulary in column order
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.vocabulary.keys().map(String::as_str)
    }

    fn weigh(&self, counts: &HashMap<String, u32>) -> SparseVector {
        let mut entries: Vec<(usize, f64)> = counts
            .iter()
            .filter_map(|(term, &count)| {
                self.vocabulary
                    .get(term)
                    .map(|&column| (column, f64::from(count) * self.idf[column]))
            })
            .collect();
        entries.sort_by_key(|&(column, _)| column);

        let mut row = SparseVector {
            indices: entries.iter().map(|&(column, _)| column).collect(),
            values: entries.iter().map(|&(_, weight)| weight).collect(),
        };
        row.normalize();
        row
    }
}

fn validate_config(config: &VectorizerConfig, n_docs: usize) -> Result<(), ConfigError> {
    if n_docs == 0 {
        return Err(ConfigError::EmptyCorpus);
    }
    let (min_n, max_n) = config.ngram_range;
    if min_n == 0 || min_n > max_n {
        return Err(ConfigError::NgramRange {
            min: min_n,
            max: max_n,
        });
    }
    let max_docs = config.max_df * n_docs as f64;
    if max_docs < config.min_df as f64 {
        return Err(ConfigError::DocumentFrequencyBounds {
            max_df: config.max_df,
            max_docs,
            min_df: config.min_df,
        });
    }
    Ok(())
}

fn analyze(config: &VectorizerConfig, doc: &str) -> Vec<String> {
    let lowered = doc.to_lowercase();
    let tokens: Vec<&str> = TOKEN_PATTERN
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|token| !(config.remove_stop_words && stop_words::is_stop_word(token)))
        .collect();

    let (min_n, max_n) = config.ngram_range;
    let mut terms = Vec::new();
    for n in min_n..=max_n {
        if n > tokens.len() {
            break;
        }
        terms.extend(tokens.windows(n).map(|window| window.join(" ")));
    }
    terms
}

fn count_terms(config: &VectorizerConfig, doc: &str) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    for term in analyze(config, doc) {
        *counts.entry(term).or_insert(0) += 1;
    }
    counts
}
