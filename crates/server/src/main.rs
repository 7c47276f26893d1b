//! HTTP server for movie recommendations.
//!
//! Loads the artifacts written by `movie-recs build` and serves
//! `/health`, `/movies` and `/recommend`.

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use server::{Config, RecommendationOrchestrator, create_router};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,server=debug,recommender=debug")),
        )
        .init();

    let config = Config::from_env()?;
    info!("Loading artifacts from {}", config.server.models_dir.display());
    let orchestrator =
        RecommendationOrchestrator::load(&config.server.models_dir, config.tmdb_config()).await?;

    let app = create_router(orchestrator);
    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    info!("Server running on http://{}", config.server.bind);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
