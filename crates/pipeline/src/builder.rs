//! The offline build: joined rows in, similarity index and fitted models out.

use crate::error::{BuildError, ConfigError};
use crate::features::FeatureExtractor;
use crate::reducer::{SvdConfig, TruncatedSvd};
use crate::similarity::{DEFAULT_TOP_K, SimilarityIndex};
use crate::tags::TagComposer;
use crate::vectorizer::{TfidfVectorizer, VectorizerConfig};
use data_loader::{MovieRecord, MovieTable};
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Hyper-parameters for one build.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfig {
    pub vectorizer: VectorizerConfig,
    pub svd: SvdConfig,
    /// Neighbours kept per movie
    pub top_k: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            vectorizer: VectorizerConfig::default(),
            svd: SvdConfig::default(),
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl BuildConfig {
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_components(mut self, n_components: usize) -> Self {
        self.svd.n_components = n_components;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.svd.seed = seed;
        self
    }
}

/// Everything a build produces. Positions in `records` are the positions
/// used by `similarity`.
#[derive(Debug, Clone)]
pub struct BuiltIndex {
    pub records: Vec<MovieRecord>,
    pub similarity: SimilarityIndex,
    pub vectorizer: TfidfVectorizer,
    pub reducer: TruncatedSvd,
}

/// Runs feature extraction, tag composition, TF-IDF, SVD and the
/// neighbour search in sequence.
///
/// ## Usage
/// ```ignore
/// let table = MovieTable::load_from_files(movies, credits)?;
/// let built = IndexBuilder::new(BuildConfig::default()).build(&table)?;
/// ArtifactStore::new("models").save(&built)?;
/// ```
pub struct IndexBuilder {
    config: BuildConfig,
    extractor: FeatureExtractor,
    composer: TagComposer,
}

impl IndexBuilder {
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            extractor: FeatureExtractor::new(),
            composer: TagComposer::new(),
        }
    }

    /// Replace the feature extractor (e.g. a different cast limit)
    pub fn with_extractor(mut self, extractor: FeatureExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Turn joined rows into final records, dropping any whose tags come
    /// out empty.
    pub fn records(&self, table: &MovieTable) -> Vec<MovieRecord> {
        let features = self.extractor.extract_all(table.rows());
        let tags = self.composer.compose_all(&features);

        table
            .rows()
            .iter()
            .zip(tags)
            .filter_map(|(row, tags)| {
                if tags.is_empty() {
                    debug!("Dropping '{}': empty tag string", row.title);
                    return None;
                }
                Some(MovieRecord {
                    id: row.movie_id,
                    title: row.title.clone(),
                    tags,
                })
            })
            .collect()
    }

    /// Build the index. Configuration errors surface before anything is
    /// written.
    #[instrument(skip(self, table), fields(rows = table.len()))]
    pub fn build(&self, table: &MovieTable) -> Result<BuiltIndex, BuildError> {
        let start = Instant::now();

        let records = self.records(table);
        if records.is_empty() {
            return Err(ConfigError::EmptyCorpus.into());
        }
        info!(
            "Composed tags for {} movies ({} dropped)",
            records.len(),
            table.len() - records.len()
        );

        let docs: Vec<&str> = records.iter().map(|r| r.tags.as_str()).collect();
        let (vectorizer, tfidf) =
            TfidfVectorizer::fit_transform(self.config.vectorizer.clone(), &docs)?;
        let (reducer, vectors) = TruncatedSvd::fit_transform(self.config.svd.clone(), &tfidf)?;
        let similarity = SimilarityIndex::build(&vectors, self.config.top_k);

        info!(
            "Built index over {} movies in {:.2}s",
            records.len(),
            start.elapsed().as_secs_f64()
        );

        Ok(BuiltIndex {
            records,
            similarity,
            vectorizer,
            reducer,
        })
    }
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new(BuildConfig::default())
    }
}
