//! TMDB metadata client.
//!
//! Turns a catalog movie id into the display details shown next to a
//! recommendation (poster, rating, release year, tagline, overview). Any
//! failure produces a fixed placeholder record rather than an error, so a
//! slow or missing TMDB never breaks a recommendation response.
//!
//! ## Example Usage
//! ```ignore
//! use tmdb_client::{TmdbClient, TmdbConfig};
//!
//! let client = TmdbClient::new(TmdbConfig::new(api_key))?;
//! let details = client.fetch_details(Some(19995)).await.into_details();
//! ```

pub mod client;
pub mod details;
pub mod error;

pub use client::{TmdbClient, TmdbConfig};
pub use details::{Enrichment, MovieDetails};
pub use error::EnrichmentError;
