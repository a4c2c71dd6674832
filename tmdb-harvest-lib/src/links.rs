//! The join file mapping `movieId` to `tmdbId`.

use std::path::{Path, PathBuf};

use crate::error::HarvestError;
use crate::pipeline::KeyResolver;
use crate::work::{MovieId, TmdbId};

/// Read-only view of `links.csv` (`movieId,imdbId,tmdbId`).
///
/// Lookups scan the file from the top every time; nothing is indexed in
/// memory, so edits to the file are picked up by the next lookup.
#[derive(Debug, Clone)]
pub struct LinkTable {
    path: PathBuf,
    movie_col: usize,
    tmdb_col: usize,
}

impl LinkTable {
    /// Open the join file, locating the `movieId` and `tmdbId` columns by name.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, HarvestError> {
        let path = path.into();
        if !path.exists() {
            return Err(HarvestError::MissingInput(path));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&path)?;
        let headers = reader.headers()?.clone();

        let movie_col = column_index(&headers, "movieId").ok_or_else(|| {
            HarvestError::MissingColumn {
                path: path.clone(),
                column: "movieId",
            }
        })?;
        let tmdb_col = column_index(&headers, "tmdbId").ok_or_else(|| {
            HarvestError::MissingColumn {
                path: path.clone(),
                column: "tmdbId",
            }
        })?;

        Ok(Self {
            path,
            movie_col,
            tmdb_col,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Find the TMDB id for a movie. `None` if there is no row, or the row's
    /// `tmdbId` cell is blank.
    pub fn lookup(&self, movie_id: MovieId) -> Result<Option<TmdbId>, HarvestError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;

        for result in reader.records() {
            let record = match result {
                Ok(r) => r,
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    log::warn!("Skipping unreadable row in {}: {e}", self.path.display());
                    continue;
                }
            };
            let matches = record
                .get(self.movie_col)
                .and_then(|cell| cell.parse::<MovieId>().ok())
                == Some(movie_id);
            if matches {
                return Ok(record.get(self.tmdb_col).and_then(TmdbId::new));
            }
        }

        Ok(None)
    }
}

impl KeyResolver for LinkTable {
    fn resolve(&self, movie_id: MovieId) -> Result<Option<TmdbId>, HarvestError> {
        self.lookup(movie_id)
    }
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().trim_start_matches('\u{feff}') == name)
}

#[cfg(test)]
#[path = "tests/links_tests.rs"]
mod tests;
