//! Offline build pipeline: from joined movie rows to a persisted
//! top-k similarity index.
//!
//! This crate provides:
//! - `FeatureExtractor` to decode genres, keywords, cast and crew
//! - `TagComposer` to merge them into one stemmed tag string per movie
//! - `TfidfVectorizer` and `TruncatedSvd` to embed the tag strings
//! - `SimilarityIndex` holding each movie's nearest neighbours
//! - `IndexBuilder` and `ArtifactStore` to run and persist a build
//!
//! ## Architecture
//! The stages run in order, each a pure function of the previous one:
//! 1. Extract features from every joined row
//! 2. Compose tags; rows whose tags come out empty are dropped
//! 3. TF-IDF over unigrams and bigrams
//! 4. Truncated SVD down to `n_components` dimensions
//! 5. Cosine similarity, keeping the top k neighbours per movie
//!
//! ## Example Usage
//! ```ignore
//! use data_loader::MovieTable;
//! use pipeline::{ArtifactStore, BuildConfig, IndexBuilder};
//!
//! let table = MovieTable::load_from_files(movies_csv, credits_csv)?;
//! let built = IndexBuilder::new(BuildConfig::default()).build(&table)?;
//! ArtifactStore::new("models").save(&built)?;
//! ```

pub mod error;
pub mod features;
pub mod tags;
pub mod stop_words;
pub mod sparse;
pub mod vectorizer;
pub mod reducer;
pub mod similarity;
pub mod builder;
pub mod artifacts;

// Re-export main types
pub use artifacts::{ArtifactStore, Catalog, Models};
pub use builder::{BuildConfig, BuiltIndex, IndexBuilder};
pub use error::{ArtifactError, BuildError, ConfigError, DataError};
pub use features::{FeatureExtractor, MovieFeatures};
pub use reducer::{SvdConfig, TruncatedSvd};
pub use similarity::{DEFAULT_TOP_K, Neighbor, SimilarityIndex};
pub use sparse::{SparseMatrix, SparseVector};
pub use tags::TagComposer;
pub use vectorizer::{TfidfVectorizer, VectorizerConfig};
