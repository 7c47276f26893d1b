//! Builds the `MovieTable` from the two parsed inputs.
//!
//! - inner join of movies and credits on exact title
//! - drop joined rows missing any required field
//!
//! Join order: movies in file order; for each movie, every credits row with
//! the same title in credits file order. Duplicated titles therefore fan out
//! into several rows, which is what the title-keyed join produces.

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

impl MovieTable {
    /// Load and join `movies.csv` and `credits.csv`
    ///
    /// Steps:
    /// 1. Parse both files (in parallel)
    /// 2. Join on title
    /// 3. Drop rows with missing required fields
    pub fn load_from_files(movies_path: &Path, credits_path: &Path) -> Result<Self> {
        info!(
            "Loading movies from {:?} and credits from {:?}",
            movies_path, credits_path
        );

        let (movies, credits) = rayon::join(
            || parser::parse_movies(movies_path),
            || parser::parse_credits(credits_path),
        );
        let movies = movies?;
        let credits = credits?;

        info!("Parsed {} movies, {} credits", movies.len(), credits.len());

        let table = join_on_title(&movies, &credits);
        if table.is_empty() {
            return Err(DataLoadError::ValidationError(
                "no movie survived the title join and required-field check".to_string(),
            ));
        }

        info!(
            "Joined table has {} rows ({} dropped for missing fields)",
            table.len(),
            table.dropped_rows()
        );
        Ok(table)
    }
}

/// Inner-join movies with credits on title and apply the required-field check
pub fn join_on_title(movies: &[RawMovie], credits: &[RawCredit]) -> MovieTable {
    let mut credits_by_title: HashMap<&str, Vec<&RawCredit>> = HashMap::new();
    for credit in credits {
        if let Some(title) = credit.title.as_deref() {
            credits_by_title.entry(title).or_default().push(credit);
        }
    }

    let mut table = MovieTable::new();
    for movie in movies {
        let Some(title) = movie.title.as_deref() else {
            continue;
        };
        let Some(matches) = credits_by_title.get(title) else {
            continue;
        };
        for credit in matches {
            match complete_row(movie, credit) {
                Some(row) => table.push(row),
                None => {
                    debug!("Dropping '{}': missing required field", title);
                    table.dropped += 1;
                }
            }
        }
    }
    table
}

/// Combine a movie and its credits, or `None` if a required cell is empty
fn complete_row(movie: &RawMovie, credit: &RawCredit) -> Option<MovieRow> {
    let raw_id = credit.movie_id.as_deref()?;
    Some(MovieRow {
        movie_id: parser::parse_movie_id(raw_id),
        title: movie.title.clone()?,
        overview: movie.overview.clone()?,
        genres: movie.genres.clone()?,
        keywords: movie.keywords.clone()?,
        cast: credit.cast.clone()?,
        crew: credit.crew.clone()?,
    })
}
