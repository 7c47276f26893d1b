//! Parser for the TMDB-style CSV inputs.
//!
//! - movies.csv: needs `title`, `overview`, `genres`, `keywords`
//! - credits.csv: needs `movie_id`, `title`, `cast`, `crew`
//!
//! Columns are located by header name, so extra columns and column order
//! don't matter. Empty cells come back as `None`.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

const MOVIE_COLUMNS: [&str; 4] = ["title", "overview", "genres", "keywords"];
const CREDIT_COLUMNS: [&str; 4] = ["movie_id", "title", "cast", "crew"];

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Locate a column by its header name
fn find_column(headers: &StringRecord, name: &str, file: &str) -> Result<usize> {
    headers
        .iter()
        .position(|header| header.trim() == name)
        .ok_or_else(|| DataLoadError::MissingColumn {
            file: file.to_string(),
            column: name.to_string(),
        })
}

/// Read a cell, treating an empty (or absent, for short rows) cell as `None`
fn cell(record: &StringRecord, idx: usize) -> Option<String> {
    match record.get(idx) {
        Some(value) if !value.is_empty() => Some(value.to_string()),
        _ => None,
    }
}

/// Resolve the indices of `columns` and yield one `[Option<String>; 4]`
/// per data row.
fn read_rows<R: Read>(
    reader: R,
    file: &str,
    columns: [&str; 4],
) -> Result<Vec<[Option<String>; 4]>> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader.headers()?.clone();

    let mut indices = [0usize; 4];
    for (slot, name) in indices.iter_mut().zip(columns) {
        *slot = find_column(&headers, name, file)?;
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(indices.map(|idx| cell(&record, idx)));
    }
    Ok(rows)
}

/// Parse the movies table from any reader
pub fn parse_movies_from_reader<R: Read>(reader: R, file: &str) -> Result<Vec<RawMovie>> {
    let rows = read_rows(reader, file, MOVIE_COLUMNS)?;
    Ok(rows
        .into_iter()
        .map(|[title, overview, genres, keywords]| RawMovie {
            title,
            overview,
            genres,
            keywords,
        })
        .collect())
}

/// Parse the credits table from any reader
pub fn parse_credits_from_reader<R: Read>(reader: R, file: &str) -> Result<Vec<RawCredit>> {
    let rows = read_rows(reader, file, CREDIT_COLUMNS)?;
    Ok(rows
        .into_iter()
        .map(|[movie_id, title, cast, crew]| RawCredit {
            movie_id,
            title,
            cast,
            crew,
        })
        .collect())
}

/// Parse the movies.csv file
pub fn parse_movies(path: &Path) -> Result<Vec<RawMovie>> {
    parse_movies_from_reader(open(path)?, &file_label(path))
}

/// Parse the credits.csv file
pub fn parse_credits(path: &Path) -> Result<Vec<RawCredit>> {
    parse_credits_from_reader(open(path)?, &file_label(path))
}

/// Parse a credits `movie_id` cell.
///
/// Example: "19995" -> Some(19995)
///          "tt0499549" -> None
pub(crate) fn parse_movie_id(raw: &str) -> Option<MovieId> {
    raw.trim().parse().ok()
}
