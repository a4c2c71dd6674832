//! Work items: MovieLens `movieId`s and the TMDB ids they map to.

use std::collections::HashSet;
use std::fmt;
use std::io;
use std::num::ParseIntError;
use std::path::Path;
use std::str::FromStr;

use crate::error::HarvestError;

/// Primary key of a work item, shared by every input and output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MovieId(pub u64);

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MovieId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().trim_start_matches('\u{feff}').parse().map(MovieId)
    }
}

/// Site-specific TMDB identifier, kept verbatim as it appears in `links.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TmdbId(String);

impl TmdbId {
    /// Returns `None` for blank cells, which `links.csv` uses for unmapped movies.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TmdbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read the full work list: the first column of a CSV with a header row.
///
/// File order is preserved and repeated ids keep their first position.
/// Rows whose first cell is not a movie id are skipped with a warning.
pub fn read_work_list(path: &Path) -> Result<Vec<MovieId>, HarvestError> {
    if !path.exists() {
        return Err(HarvestError::MissingInput(path.to_path_buf()));
    }
    let file = std::fs::File::open(path)?;
    read_id_column(file, path)
}

/// Shared by the work list and pending checkpoint readers.
pub(crate) fn read_id_column<R: io::Read>(
    reader: R,
    source: &Path,
) -> Result<Vec<MovieId>, HarvestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut seen = HashSet::new();
    let mut ids = Vec::new();

    // Only the first cell is decoded; other columns may hold any bytes
    for (line, result) in reader.byte_records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                log::warn!("Skipping unreadable row in {}: {e}", source.display());
                continue;
            }
        };
        let cell = String::from_utf8_lossy(record.get(0).unwrap_or_default());
        match cell.parse::<MovieId>() {
            Ok(id) => {
                if seen.insert(id) {
                    ids.push(id);
                }
            }
            Err(_) if cell.trim().is_empty() => {}
            Err(_) => {
                // +2: one for the header, one for 1-based numbering
                log::warn!(
                    "Skipping row {} of {}: '{}' is not a movie id",
                    line + 2,
                    source.display(),
                    cell,
                );
            }
        }
    }

    Ok(ids)
}

#[cfg(test)]
#[path = "tests/work_tests.rs"]
mod tests;
