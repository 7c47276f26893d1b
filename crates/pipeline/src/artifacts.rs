//! Reading and writing the build artifacts.
//!
//! An artifact directory holds four files:
//! - `movies.json`: the `MovieRecord` sequence, position = index row
//! - `similarity.bin`: the top-k neighbour lists
//! - `vectorizer.bin`, `reducer.bin`: the fitted models
//!
//! A save stages every file under a temporary name and renames them into
//! place only once all of them are written. `similarity.bin` also carries a
//! CRC32 of the `movies.json` bytes it was built with, so a directory mixing
//! two builds is rejected on load.

use crate::builder::BuiltIndex;
use crate::error::ArtifactError;
use crate::reducer::TruncatedSvd;
use crate::similarity::SimilarityIndex;
use crate::vectorizer::TfidfVectorizer;
use data_loader::MovieRecord;
use ndarray::Array1;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const MOVIES_FILE: &str = "movies.json";
pub const SIMILARITY_FILE: &str = "similarity.bin";
pub const VECTORIZER_FILE: &str = "vectorizer.bin";
pub const REDUCER_FILE: &str = "reducer.bin";

/// What the online service needs: records plus their neighbour lists.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub records: Vec<MovieRecord>,
    pub similarity: SimilarityIndex,
}

/// The fitted models, for projecting text that wasn't in the build.
#[derive(Debug, Clone)]
pub struct Models {
    pub vectorizer: TfidfVectorizer,
    pub reducer: TruncatedSvd,
}

impl Models {
    /// Embed an already composed tag string into the reduced space.
    pub fn embed(&self, tags: &str) -> Array1<f64> {
        self.reducer
            .transform_one(&self.vectorizer.transform_one(tags))
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write every artifact of `built`, creating the directory if needed.
    ///
    /// If any file fails to stage, nothing already in the directory is
    /// replaced.
    pub fn save(&self, built: &BuiltIndex) -> Result<(), ArtifactError> {
        let movies = serde_json::to_vec_pretty(&built.records)?;
        let files = [
            (
                SIMILARITY_FILE,
                bincode::serialize(&(fingerprint(&movies), &built.similarity))?,
            ),
            (VECTORIZER_FILE, bincode::serialize(&built.vectorizer)?),
            (REDUCER_FILE, bincode::serialize(&built.reducer)?),
            (MOVIES_FILE, movies),
        ];

        fs::create_dir_all(&self.dir)?;
        for (name, bytes) in &files {
            if let Err(e) = fs::write(self.staged(name), bytes) {
                self.discard_staged(&files);
                return Err(e.into());
            }
        }
        // A rename failing part way leaves a mix that load_catalog rejects
        for (name, _) in &files {
            fs::rename(self.staged(name), self.path(name))?;
        }

        info!(
            "Saved {} movies to {}",
            built.records.len(),
            self.dir.display()
        );
        Ok(())
    }

    /// Load records and the similarity index, checking they line up.
    pub fn load_catalog(&self) -> Result<Catalog, ArtifactError> {
        let movies = self.read(MOVIES_FILE)?;
        let (expected, similarity): (u32, SimilarityIndex) = self.read_bincode(SIMILARITY_FILE)?;
        if fingerprint(&movies) != expected {
            return Err(ArtifactError::Inconsistent(format!(
                "{} was not built from this {}",
                SIMILARITY_FILE, MOVIES_FILE
            )));
        }
        let records: Vec<MovieRecord> = serde_json::from_slice(&movies)?;
        similarity.validate(records.len())?;

        info!(
            "Loaded catalog of {} movies ({} neighbours each) from {}",
            records.len(),
            similarity.k(),
            self.dir.display()
        );
        Ok(Catalog {
            records,
            similarity,
        })
    }

    pub fn load_models(&self) -> Result<Models, ArtifactError> {
        let vectorizer: TfidfVectorizer = self.read_bincode(VECTORIZER_FILE)?;
        let reducer: TruncatedSvd = self.read_bincode(REDUCER_FILE)?;

        if reducer.components().ncols() != vectorizer.vocabulary_size() {
            return Err(ArtifactError::Inconsistent(format!(
                "reducer expects {} terms, vectorizer has {}",
                reducer.components().ncols(),
                vectorizer.vocabulary_size()
            )));
        }
        Ok(Models {
            vectorizer,
            reducer,
        })
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn staged(&self, name: &str) -> PathBuf {
        self.path(&format!("{name}.tmp"))
    }

    fn discard_staged(&self, files: &[(&str, Vec<u8>)]) {
        for (name, _) in files {
            let _ = fs::remove_file(self.staged(name));
        }
    }

    fn read(&self, name: &str) -> Result<Vec<u8>, ArtifactError> {
        let path = self.path(name);
        if !path.exists() {
            return Err(ArtifactError::Missing {
                path: path.display().to_string(),
            });
        }
        Ok(fs::read(path)?)
    }

    fn read_bincode<T: DeserializeOwned>(&self, name: &str) -> Result<T, ArtifactError> {
        Ok(bincode::deserialize(&self.read(name)?)?)
    }
}

fn fingerprint(movies: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(movies);
    hasher.finalize()
}
