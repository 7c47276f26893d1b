//! # Recommender Crate
//!
//! Online half of the system: load the artifacts written by the offline
//! build and answer "movies like this one" queries.
//!
//! ## Main Components
//!
//! - **title_index**: exact title -> catalog position, first occurrence wins
//! - **service**: `RecommendationService` with `recommend`, `list_titles`
//!   and `search`
//! - **error**: `LookupError`
//!
//! ## Example Usage
//!
//! ```ignore
//! use recommender::RecommendationService;
//!
//! let service = RecommendationService::load("models")?;
//! for rec in service.recommend("Avatar", 5)? {
//!     println!("{} ({:.3})", rec.title, rec.score);
//! }
//! ```

pub mod error;
pub mod service;
pub mod title_index;

pub use error::LookupError;
pub use service::{Recommendation, RecommendationService};
pub use title_index::TitleIndex;
