//! # Recommendation Orchestrator
//!
//! This module coordinates one recommendation request:
//! 1. Look up the neighbours of the requested title (synchronous, cheap)
//! 2. Fetch TMDB details for every neighbour concurrently, one task each
//! 3. Return the enriched list in neighbour order
//!
//! A neighbour whose details can't be fetched gets the placeholder record;
//! only an unknown title fails the request.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use data_loader::MovieId;
use recommender::{LookupError, Recommendation, RecommendationService};
use tmdb_client::{Enrichment, MovieDetails, TmdbClient, TmdbConfig};

/// Final recommendation returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecommendation {
    #[serde(flatten)]
    pub details: MovieDetails,
    pub movie_id: Option<MovieId>,
    pub score: f32,
    /// True when `details` is the placeholder record
    pub placeholder: bool,
}

impl EnrichedRecommendation {
    fn new(rec: &Recommendation, enrichment: Enrichment) -> Self {
        Self {
            placeholder: enrichment.is_placeholder(),
            details: enrichment.into_details(),
            movie_id: rec.movie_id,
            score: rec.score,
        }
    }
}

/// Shared by every request handler; cloning copies two pointers.
#[derive(Clone)]
pub struct RecommendationOrchestrator {
    service: Arc<RecommendationService>,
    tmdb: TmdbClient,
}

impl RecommendationOrchestrator {
    pub fn new(service: Arc<RecommendationService>, tmdb: TmdbClient) -> Self {
        Self { service, tmdb }
    }

    /// Load the artifacts from `models_dir` and build the TMDB client.
    pub async fn load(models_dir: &Path, tmdb_config: TmdbConfig) -> Result<Self> {
        let dir = models_dir.to_path_buf();
        let service = tokio::task::spawn_blocking(move || RecommendationService::load(dir))
            .await
            .context("Artifact loading task panicked")?
            .with_context(|| format!("Failed to load artifacts from {}", models_dir.display()))?;
        info!("Serving {} movies", service.len());

        let tmdb = TmdbClient::new(tmdb_config).context("Failed to build TMDB client")?;
        Ok(Self::new(Arc::new(service), tmdb))
    }

    pub fn service(&self) -> &RecommendationService {
        &self.service
    }

    pub fn list_titles(&self) -> Vec<String> {
        self.service
            .list_titles()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Up to `top_n` enriched recommendations for `title`.
    pub async fn get_recommendations(
        &self,
        title: &str,
        top_n: usize,
    ) -> Result<Vec<EnrichedRecommendation>, LookupError> {
        let start_time = Instant::now();
        let recommendations = self.service.recommend(title, top_n)?;

        let tasks: Vec<_> = recommendations
            .iter()
            .map(|rec| {
                let tmdb = self.tmdb.clone();
                let movie_id = rec.movie_id;
                tokio::spawn(async move { tmdb.fetch_details(movie_id).await })
            })
            .collect();

        let mut enriched = Vec::with_capacity(tasks.len());
        for (rec, task) in recommendations.iter().zip(tasks) {
            let enrichment = match task.await {
                Ok(enrichment) => enrichment,
                Err(e) => {
                    warn!(movie_id = ?rec.movie_id, error = %e, "Enrichment task failed");
                    Enrichment::placeholder()
                }
            };
            enriched.push(EnrichedRecommendation::new(rec, enrichment));
        }

        let placeholders = enriched.iter().filter(|r| r.placeholder).count();
        if placeholders > 0 {
            warn!(
                "{} of {} recommendations for '{}' use placeholder details",
                placeholders,
                enriched.len(),
                title
            );
        }
        info!(
            "Recommended {} movies for '{}' in {:.2?}",
            enriched.len(),
            title,
            start_time.elapsed()
        );
        Ok(enriched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{MovieRow, MovieTable};
    use mockito::{Matcher, Server};
    use pipeline::{ArtifactStore, BuildConfig, IndexBuilder};
    use std::time::Duration;
    use tempfile::TempDir;

    // ============================================================================
    // Test Fixtures
    // ============================================================================

    fn row(id: u32, title: &str, overview: &str) -> MovieRow {
        MovieRow {
            movie_id: Some(id),
            title: title.to_string(),
            overview: overview.to_string(),
            genres: r#"[{"id": 28, "name": "Action"}]"#.to_string(),
            keywords: "[]".to_string(),
            cast: "[]".to_string(),
            crew: "[]".to_string(),
        }
    }

    /// Build and persist a three-movie catalog where A and B are identical
    fn build_test_models() -> TempDir {
        let mut table = MovieTable::new();
        table.push(row(1, "A", "space marine robot war"));
        table.push(row(2, "B", "space marine robot war"));
        table.push(row(3, "C", "quiet village romance"));

        let config = BuildConfig::default().with_components(1).with_top_k(2);
        let built = IndexBuilder::new(config).build(&table).unwrap();
        let dir = tempfile::tempdir().unwrap();
        ArtifactStore::new(dir.path()).save(&built).unwrap();
        dir
    }

    async fn build_test_orchestrator(tmdb_url: &str) -> (RecommendationOrchestrator, TempDir) {
        let dir = build_test_models();
        let config = TmdbConfig::new("test_key")
            .with_api_url(tmdb_url)
            .with_timeout(Duration::from_secs(2));
        let orchestrator = RecommendationOrchestrator::load(dir.path(), config)
            .await
            .unwrap();
        (orchestrator, dir)
    }

    #[tokio::test]
    async fn test_recommendations_are_enriched_in_order() {
        let mut server = Server::new_async().await;
        let _b = server
            .mock("GET", "/movie/2")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"title": "Movie B", "vote_average": 6.55}"#)
            .create_async()
            .await;
        let _c = server
            .mock("GET", "/movie/3")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"title": "Movie C"}"#)
            .create_async()
            .await;

        let (orchestrator, _dir) = build_test_orchestrator(&server.url()).await;
        let recs = orchestrator.get_recommendations("A", 5).await.unwrap();

        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].details.title, "Movie B");
        assert_eq!(recs[0].movie_id, Some(2));
        assert!(!recs[0].placeholder);
        assert_eq!(recs[1].details.title, "Movie C");
    }

    #[tokio::test]
    async fn test_failed_enrichment_degrades_one_neighbour() {
        let mut server = Server::new_async().await;
        let _b = server
            .mock("GET", "/movie/2")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;
        let _c = server
            .mock("GET", "/movie/3")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"title": "Movie C"}"#)
            .create_async()
            .await;

        let (orchestrator, _dir) = build_test_orchestrator(&server.url()).await;
        let recs = orchestrator.get_recommendations("A", 2).await.unwrap();

        assert!(recs[0].placeholder);
        assert_eq!(recs[0].details, MovieDetails::placeholder());
        assert_eq!(recs[0].movie_id, Some(2));
        assert!(!recs[1].placeholder);
    }

    #[tokio::test]
    async fn test_unknown_title_is_lookup_error() {
        let server = Server::new_async().await;
        let (orchestrator, _dir) = build_test_orchestrator(&server.url()).await;

        assert_eq!(
            orchestrator.get_recommendations("Z", 5).await,
            Err(LookupError::TitleNotFound("Z".to_string()))
        );
        assert_eq!(orchestrator.list_titles(), vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_load_fails_without_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let result = RecommendationOrchestrator::load(dir.path(), TmdbConfig::new("k")).await;
        assert!(result.is_err());
    }
}
