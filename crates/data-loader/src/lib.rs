//! # Data Loader Crate
//!
//! This crate handles loading the TMDB movie and credits tables.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (RawMovie, RawCredit, MovieRow, MovieRecord, MovieTable)
//! - **parser**: Parse the CSV files into raw rows
//! - **join**: Join the two tables on title and drop incomplete rows
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::MovieTable;
//! use std::path::Path;
//!
//! let table = MovieTable::load_from_files(
//!     Path::new("data/movies.csv"),
//!     Path::new("data/credits.csv"),
//! )?;
//!
//! println!("{} movies ready for feature extraction", table.len());
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod join;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use join::join_on_title;
pub use types::{
    // Type aliases
    MovieId,
    // Core types
    MovieRecord,
    MovieRow,
    MovieTable,
    RawCredit,
    RawMovie,
};
