use thiserror::Error;

/// Why a detail lookup fell back to the placeholder.
///
/// Never returned by [`TmdbClient::fetch_details`](crate::TmdbClient::fetch_details);
/// the typed form is available through `try_fetch_details`.
#[derive(Error, Debug)]
pub enum EnrichmentError {
    #[error("movie has no TMDB id")]
    MissingId,

    #[error("no TMDB API key configured")]
    MissingKey,

    #[error("TMDB request timed out")]
    Timeout,

    #[error("TMDB request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("TMDB returned status {0}")]
    Status(u16),

    #[error("malformed TMDB payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl From<reqwest::Error> for EnrichmentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            EnrichmentError::Timeout
        } else {
            EnrichmentError::Transport(err)
        }
    }
}
