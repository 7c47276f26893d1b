//! HTTP surface over the orchestrator.
//!
//! - `GET /health` -> `{"status": "ok"}`
//! - `GET /movies` -> every title, catalog order
//! - `POST /recommend` `{"movie": "...", "top_n": 5}` ->
//!   `{"recommendations": [...]}`, 404 for an unknown title

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::orchestrator::{EnrichedRecommendation, RecommendationOrchestrator};
use recommender::LookupError;

/// Recommendations returned when the request doesn't say
pub const DEFAULT_TOP_N: usize = 5;

/// Creates the main API router with all routes
pub fn create_router(orchestrator: RecommendationOrchestrator) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/movies", get(list_movies))
        .route("/recommend", post(recommend))
        .with_state(orchestrator)
}

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub movie: String,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub recommendations: Vec<EnrichedRecommendation>,
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_movies(State(orchestrator): State<RecommendationOrchestrator>) -> Json<Vec<String>> {
    Json(orchestrator.list_titles())
}

async fn recommend(
    State(orchestrator): State<RecommendationOrchestrator>,
    Json(request): Json<RecommendRequest>,
) -> Response {
    debug!("POST /recommend movie='{}' top_n={}", request.movie, request.top_n);
    match orchestrator
        .get_recommendations(&request.movie, request.top_n)
        .await
    {
        Ok(recommendations) => Json(RecommendResponse { recommendations }).into_response(),
        Err(e @ LookupError::TitleNotFound(_)) => {
            debug!("{}", e);
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": e.to_string(), "recommendations": [] })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use data_loader::{MovieRow, MovieTable};
    use pipeline::{ArtifactStore, BuildConfig, IndexBuilder};
    use serde_json::Value;
    use std::time::Duration;
    use tempfile::TempDir;
    use tmdb_client::TmdbConfig;
    use tower::ServiceExt;

    fn row(id: u32, title: &str, overview: &str) -> MovieRow {
        MovieRow {
            movie_id: Some(id),
            title: title.to_string(),
            overview: overview.to_string(),
            genres: r#"[{"id": 18, "name": "Drama"}]"#.to_string(),
            keywords: "[]".to_string(),
            cast: "[]".to_string(),
            crew: "[]".to_string(),
        }
    }

    async fn create_test_app() -> (Router, TempDir) {
        let mut table = MovieTable::new();
        table.push(row(1, "A", "space marine robot war"));
        table.push(row(2, "B", "space marine robot war"));
        table.push(row(3, "C", "quiet village romance"));
        let config = BuildConfig::default().with_components(1).with_top_k(2);
        let built = IndexBuilder::new(config).build(&table).unwrap();
        let dir = tempfile::tempdir().unwrap();
        ArtifactStore::new(dir.path()).save(&built).unwrap();

        // Bind then release a port, so every neighbour gets the placeholder
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let tmdb = TmdbConfig::new("k")
            .with_api_url(format!("http://{addr}"))
            .with_timeout(Duration::from_secs(1));
        let orchestrator = RecommendationOrchestrator::load(dir.path(), tmdb)
            .await
            .unwrap();
        (create_router(orchestrator), dir)
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_recommend(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/recommend")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _dir) = create_test_app().await;
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_movies_lists_titles() {
        let (app, _dir) = create_test_app().await;
        let response = app
            .oneshot(Request::get("/movies").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_json(response).await, json!(["A", "B", "C"]));
    }

    #[tokio::test]
    async fn test_recommend_with_unreachable_tmdb_still_succeeds() {
        let (app, _dir) = create_test_app().await;
        let response = app.oneshot(post_recommend(r#"{"movie": "A"}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let recs = body["recommendations"].as_array().unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0]["title"], "Movie Not Found");
        assert_eq!(recs[0]["movie_id"], 2);
        assert_eq!(recs[0]["placeholder"], true);
    }

    #[tokio::test]
    async fn test_recommend_respects_top_n() {
        let (app, _dir) = create_test_app().await;
        let response = app
            .oneshot(post_recommend(r#"{"movie": "C", "top_n": 1}"#))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["recommendations"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_movie_is_not_found() {
        let (app, _dir) = create_test_app().await;
        let response = app
            .oneshot(post_recommend(r#"{"movie": "Nope"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["recommendations"], json!([]));
        assert!(body["error"].as_str().unwrap().contains("Nope"));
    }
}
