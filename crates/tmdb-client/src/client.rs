//! HTTP client for TMDB's movie detail endpoint.

use crate::details::{Enrichment, MovieDetails, TmdbMovie};
use crate::error::EnrichmentError;
use data_loader::MovieId;
use reqwest::Client as HttpClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

pub const DEFAULT_API_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct TmdbConfig {
    /// Without a key every lookup is a placeholder
    pub api_key: Option<String>,
    /// Base URL the `/movie/{id}` path is appended to
    pub api_url: String,
    /// Prefix for `poster_path`
    pub image_base: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            image_base: DEFAULT_IMAGE_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl TmdbConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::default().with_api_key(Some(api_key.into()))
    }

    /// Set or clear the key. An empty key counts as none.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|key| !key.is_empty());
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_image_base(mut self, base: impl Into<String>) -> Self {
        self.image_base = base.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Fetches display details for catalog movies.
///
/// Cloning is cheap: clones share the connection pool, so one clone can be
/// moved into each spawned task.
#[derive(Debug, Clone)]
pub struct TmdbClient {
    http_client: HttpClient,
    config: Arc<TmdbConfig>,
}

impl TmdbClient {
    pub fn new(config: TmdbConfig) -> Result<Self, EnrichmentError> {
        let http_client = HttpClient::builder()
            .timeout(config.timeout)
            .build()
            .map_err(EnrichmentError::Transport)?;

        Ok(Self {
            http_client,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &TmdbConfig {
        &self.config
    }

    /// Details for `movie_id`, or the placeholder if they can't be fetched.
    ///
    /// Never fails: every error is logged and replaced by the placeholder.
    pub async fn fetch_details(&self, movie_id: Option<MovieId>) -> Enrichment {
        match self.try_fetch_details(movie_id).await {
            Ok(details) => Enrichment::Fetched(details),
            Err(e) => {
                warn!(movie_id = ?movie_id, error = %e, "Using placeholder details");
                Enrichment::placeholder()
            }
        }
    }

    /// Details for `movie_id` with the failure reason kept.
    ///
    /// A missing id or API key fails without a network call.
    #[instrument(skip(self))]
    pub async fn try_fetch_details(
        &self,
        movie_id: Option<MovieId>,
    ) -> Result<MovieDetails, EnrichmentError> {
        let id = movie_id.ok_or(EnrichmentError::MissingId)?;
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(EnrichmentError::MissingKey)?;
        let url = format!("{}/movie/{}", self.config.api_url.trim_end_matches('/'), id);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("api_key", api_key),
                ("language", "en-US"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichmentError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let movie: TmdbMovie = serde_json::from_slice(&body)?;
        debug!("Fetched details for movie {}", id);

        Ok(MovieDetails::from_payload(movie, &self.config.image_base))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    /// A local address with no listener behind it
    fn closed_port_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    fn create_test_client(url: &str) -> TmdbClient {
        TmdbClient::new(
            TmdbConfig::new("test_key")
                .with_api_url(url)
                .with_image_base("https://img.test/w500")
                .with_timeout(Duration::from_secs(2)),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_details_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/movie/19995")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("api_key".into(), "test_key".into()),
                Matcher::UrlEncoded("language".into(), "en-US".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"title": "Avatar", "poster_path": "/a.jpg", "vote_average": 7.2,
                    "release_date": "2009-12-10", "tagline": "Enter the world of Pandora.",
                    "overview": "A paraplegic marine..."}"#,
            )
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let enrichment = client.fetch_details(Some(19995)).await;

        mock.assert_async().await;
        assert!(!enrichment.is_placeholder());
        let details = enrichment.details();
        assert_eq!(details.title, "Avatar");
        assert_eq!(details.poster, "https://img.test/w500/a.jpg");
        assert_eq!(details.rating, "7.2");
        assert_eq!(details.release, "2009");
    }

    #[tokio::test]
    async fn test_non_success_status_gives_placeholder() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/movie/1")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"status_message": "not found"}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        assert!(matches!(
            client.try_fetch_details(Some(1)).await,
            Err(EnrichmentError::Status(404))
        ));
        assert_eq!(client.fetch_details(Some(1)).await, Enrichment::placeholder());
    }

    #[tokio::test]
    async fn test_malformed_payload_gives_placeholder() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/movie/2")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        assert!(matches!(
            client.try_fetch_details(Some(2)).await,
            Err(EnrichmentError::Malformed(_))
        ));
        assert!(client.fetch_details(Some(2)).await.is_placeholder());
    }

    #[tokio::test]
    async fn test_missing_id_skips_network() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        assert!(matches!(
            client.try_fetch_details(None).await,
            Err(EnrichmentError::MissingId)
        ));
        assert!(client.fetch_details(None).await.is_placeholder());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_key_skips_network() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        for key in [None, Some(String::new())] {
            let client = TmdbClient::new(
                TmdbConfig::default()
                    .with_api_key(key)
                    .with_api_url(server.url()),
            )
            .unwrap();
            assert!(matches!(
                client.try_fetch_details(Some(5)).await,
                Err(EnrichmentError::MissingKey)
            ));
            assert!(client.fetch_details(Some(5)).await.is_placeholder());
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unreachable_server_gives_placeholder() {
        let client = create_test_client(&closed_port_url());
        assert!(matches!(
            client.try_fetch_details(Some(3)).await,
            Err(EnrichmentError::Transport(_))
        ));
        assert!(client.fetch_details(Some(3)).await.is_placeholder());
    }
}
