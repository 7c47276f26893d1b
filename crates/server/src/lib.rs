//! Server crate for the movie recommendation service.
//!
//! This crate contains the orchestrator that turns a title into enriched
//! recommendations, the axum routes in front of it, and the environment
//! configuration they run with.

pub mod config;
pub mod orchestrator;
pub mod routes;

pub use config::Config;
pub use orchestrator::{EnrichedRecommendation, RecommendationOrchestrator};
pub use routes::create_router;
