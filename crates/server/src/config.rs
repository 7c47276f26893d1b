//! Runtime settings, read from the environment (and `.env` if present).
//!
//! | variable                | default                             |
//! |-------------------------|-------------------------------------|
//! | `MOVIE_RECS_MODELS_DIR` | `models`                            |
//! | `MOVIE_RECS_BIND`       | `127.0.0.1:5000`                    |
//! | `TMDB_API_KEY`          | none (every lookup is a placeholder)|
//! | `TMDB_API_URL`          | `https://api.themoviedb.org/3`      |
//! | `TMDB_IMAGE_BASE`       | `https://image.tmdb.org/t/p/w500`   |
//! | `TMDB_TIMEOUT_SECS`     | `10`                                |

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tmdb_client::TmdbConfig;
use tmdb_client::client::{DEFAULT_API_URL, DEFAULT_IMAGE_BASE, DEFAULT_TIMEOUT};
use tracing::warn;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    /// Directory holding the build artifacts
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,

    #[serde(default = "default_bind")]
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TmdbSettings {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_image_base")]
    pub image_base: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_models_dir() -> PathBuf {
    PathBuf::from("models")
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_image_base() -> String {
    DEFAULT_IMAGE_BASE.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerSettings,
    pub tmdb: TmdbSettings,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars().collect::<Vec<_>>())
    }

    /// Load configuration from explicit key/value pairs.
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)> + Clone,
    {
        let server = envy::prefixed("MOVIE_RECS_")
            .from_iter::<_, ServerSettings>(vars.clone())
            .context("Failed to load MOVIE_RECS_* settings")?;
        let tmdb = envy::prefixed("TMDB_")
            .from_iter::<_, TmdbSettings>(vars)
            .context("Failed to load TMDB_* settings")?;

        if tmdb.api_key.as_deref().is_none_or(str::is_empty) {
            warn!("TMDB_API_KEY is not set; recommendations will carry placeholder details");
        }
        Ok(Self { server, tmdb })
    }

    pub fn tmdb_config(&self) -> TmdbConfig {
        TmdbConfig::default()
            .with_api_key(self.tmdb.api_key.clone())
            .with_api_url(self.tmdb.api_url.clone())
            .with_image_base(self.tmdb.image_base.clone())
            .with_timeout(Duration::from_secs(self.tmdb.timeout_secs))
    }
}
