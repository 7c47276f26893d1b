//! The display record shown next to each recommendation.

use serde::{Deserialize, Serialize};

pub const PLACEHOLDER_POSTER: &str =
    "https://via.placeholder.com/300x450/2c5364/ffffff?text=No+Image";
const NOT_AVAILABLE: &str = "N/A";

/// Display fields for one movie. `rating` and `release` are strings so
/// that "N/A" fits in the same slot as a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    pub poster: String,
    pub title: String,
    pub rating: String,
    pub release: String,
    pub tagline: String,
    pub overview: String,
}

impl MovieDetails {
    /// Shown when the details can't be fetched.
    pub fn placeholder() -> Self {
        Self {
            poster: PLACEHOLDER_POSTER.to_string(),
            title: "Movie Not Found".to_string(),
            rating: NOT_AVAILABLE.to_string(),
            release: NOT_AVAILABLE.to_string(),
            tagline: "No information available".to_string(),
            overview: "Could not fetch movie details from TMDB.".to_string(),
        }
    }

    /// Map a `/movie/{id}` payload, filling defaults for absent fields.
    pub(crate) fn from_payload(movie: TmdbMovie, image_base: &str) -> Self {
        let poster = match non_empty(movie.poster_path) {
            Some(path) => format!("{image_base}{path}"),
            None => PLACEHOLDER_POSTER.to_string(),
        };
        let rating = match movie.vote_average {
            Some(vote) if vote != 0.0 => format!("{vote:.1}"),
            _ => NOT_AVAILABLE.to_string(),
        };
        let release = non_empty(movie.release_date)
            .map(|date| date.chars().take(4).collect())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        Self {
            poster,
            title: non_empty(movie.title).unwrap_or_else(|| "Unknown Title".to_string()),
            rating,
            release,
            tagline: non_empty(movie.tagline)
                .unwrap_or_else(|| "No tagline available".to_string()),
            overview: non_empty(movie.overview)
                .unwrap_or_else(|| "No description available.".to_string()),
        }
    }
}

/// The subset of TMDB's movie payload that is displayed
#[derive(Debug, Default, Deserialize)]
pub(crate) struct TmdbMovie {
    pub poster_path: Option<String>,
    pub title: Option<String>,
    pub vote_average: Option<f64>,
    pub release_date: Option<String>,
    pub tagline: Option<String>,
    pub overview: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Outcome of enriching one recommendation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Enrichment {
    Fetched(MovieDetails),
    Placeholder(MovieDetails),
}

impl Enrichment {
    pub fn placeholder() -> Self {
        Enrichment::Placeholder(MovieDetails::placeholder())
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Enrichment::Placeholder(_))
    }

    pub fn details(&self) -> &MovieDetails {
        match self {
            Enrichment::Fetched(d) | Enrichment::Placeholder(d) => d,
        }
    }

    pub fn into_details(self) -> MovieDetails {
        match self {
            Enrichment::Fetched(d) | Enrichment::Placeholder(d) => d,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://image.tmdb.org/t/p/w500";

    #[test]
    fn test_full_payload_mapping() {
        let movie: TmdbMovie = serde_json::from_str(
            r#"{
                "poster_path": "/kyeqWdyUXW608qlYkRqosgbbJyK.jpg",
                "title": "Avatar",
                "vote_average": 7.24,
                "release_date": "2009-12-10",
                "tagline": "Enter the world of Pandora.",
                "overview": "In the 22nd century...",
                "budget": 237000000
            }"#,
        )
        .unwrap();
        let details = MovieDetails::from_payload(movie, BASE);

        assert_eq!(
            details.poster,
            "https://image.tmdb.org/t/p/w500/kyeqWdyUXW608qlYkRqosgbbJyK.jpg"
        );
        assert_eq!(details.title, "Avatar");
        assert_eq!(details.rating, "7.2");
        assert_eq!(details.release, "2009");
        assert_eq!(details.tagline, "Enter the world of Pandora.");
    }

    #[test]
    fn test_missing_fields_get_defaults() {
        let details = MovieDetails::from_payload(TmdbMovie::default(), BASE);
        assert_eq!(details.poster, PLACEHOLDER_POSTER);
        assert_eq!(details.title, "Unknown Title");
        assert_eq!(details.rating, "N/A");
        assert_eq!(details.release, "N/A");
        assert_eq!(details.tagline, "No tagline available");
        assert_eq!(details.overview, "No description available.");
    }

    #[test]
    fn test_zero_rating_and_empty_date_are_not_available() {
        let movie = TmdbMovie {
            vote_average: Some(0.0),
            release_date: Some(String::new()),
            ..TmdbMovie::default()
        };
        let details = MovieDetails::from_payload(movie, BASE);
        assert_eq!(details.rating, "N/A");
        assert_eq!(details.release, "N/A");
    }

    #[test]
    fn test_placeholder_serializes_flat() {
        let json = serde_json::to_value(Enrichment::placeholder()).unwrap();
        assert_eq!(json["title"], "Movie Not Found");
        assert_eq!(json["rating"], "N/A");
    }
}
