//! Completion records and pending-work checkpoints.
//!
//! A work item is complete once its result is durably recorded: a row with a
//! non-empty value in a result log, or a non-empty poster file. The pending
//! set is either derived from that record or tracked in a checkpoint file
//! that shrinks as items complete.

use std::collections::{HashMap, HashSet};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::HarvestError;
use crate::work::{self, MovieId};

/// Ids whose results are already recorded.
pub type CompletedSet = HashSet<MovieId>;

/// Durable destination for fetched results.
pub trait ResultStore<O> {
    /// Ids that already have a recorded, non-empty result.
    fn completed(&self) -> Result<CompletedSet, HarvestError>;

    /// Record a result. Must be durable when this returns `Ok`.
    fn persist(&mut self, movie_id: MovieId, output: &O) -> Result<(), HarvestError>;
}

/// Append-only `movieId,<value>` CSV, e.g. `movie_id_to_name.csv`.
///
/// Duplicate rows for one id may accumulate across overlapping runs; every
/// reader deduplicates, keeping the first non-empty value.
#[derive(Debug, Clone)]
pub struct CsvResultLog {
    path: PathBuf,
    value_column: String,
}

impl CsvResultLog {
    /// Open the log, writing the header row if the file is missing or empty.
    pub fn open(path: impl Into<PathBuf>, value_column: &str) -> Result<Self, HarvestError> {
        let path = path.into();
        let needs_header = match fs::metadata(&path) {
            Ok(meta) => meta.is_file() && meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(e.into()),
        };
        if needs_header {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            let mut writer = csv::Writer::from_path(&path)?;
            writer.write_record(["movieId", value_column])?;
            let file = writer.into_inner().map_err(|e| e.into_error())?;
            file.sync_all()?;
            log::info!("Wrote header to output file {}", path.display());
        }
        Ok(Self {
            path,
            value_column: value_column.to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn value_column(&self) -> &str {
        &self.value_column
    }

    /// Deduplicated records in file order.
    pub fn records(&self) -> Result<Vec<(MovieId, String)>, HarvestError> {
        let (records, _) = read_result_rows(&self.path)?;
        Ok(records)
    }

    /// Value recorded for one id, if any.
    pub fn get(&self, movie_id: MovieId) -> Result<Option<String>, HarvestError> {
        Ok(self
            .records()?
            .into_iter()
            .find(|(id, _)| *id == movie_id)
            .map(|(_, value)| value))
    }
}

impl ResultStore<String> for CsvResultLog {
    fn completed(&self) -> Result<CompletedSet, HarvestError> {
        Ok(self.records()?.into_iter().map(|(id, _)| id).collect())
    }

    fn persist(&mut self, movie_id: MovieId, output: &String) -> Result<(), HarvestError> {
        let value = output.trim();
        if value.is_empty() {
            return Err(HarvestError::EmptyResult(movie_id));
        }

        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record([movie_id.to_string().as_str(), value])?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_data()?;

        log::debug!("Recorded {movie_id}: {value}");
        Ok(())
    }
}

/// Read `movieId,value` rows, keeping the first non-empty value per id.
/// Also returns how many data rows were dropped as duplicates or blanks.
fn read_result_rows(path: &Path) -> Result<(Vec<(MovieId, String)>, usize), HarvestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let mut seen = HashSet::new();
    let mut records = Vec::new();
    let mut dropped = 0usize;

    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                log::warn!("Skipping unreadable row in {}: {e}", path.display());
                dropped += 1;
                continue;
            }
        };
        let id = record.get(0).and_then(|cell| cell.parse::<MovieId>().ok());
        let value = record.get(1).map(str::trim).unwrap_or("");
        match id {
            Some(id) if !value.is_empty() && seen.insert(id) => {
                records.push((id, value.to_string()));
            }
            _ => dropped += 1,
        }
    }

    Ok((records, dropped))
}

/// Rewrite a result log keeping one row per id (the first non-empty one).
///
/// Returns the number of rows removed.
pub fn dedupe_result_log(log: &CsvResultLog) -> Result<usize, HarvestError> {
    let (records, dropped) = read_result_rows(log.path())?;
    if dropped == 0 {
        return Ok(0);
    }

    let tmp = temp_path(log.path());
    {
        let mut writer = csv::Writer::from_path(&tmp)?;
        writer.write_record(["movieId", log.value_column()])?;
        for (id, value) in &records {
            writer.write_record([id.to_string().as_str(), value.as_str()])?;
        }
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
    }
    fs::rename(&tmp, log.path())?;

    log::debug!(
        "Removed {} duplicate or empty rows from {}",
        dropped,
        log.path().display()
    );
    Ok(dropped)
}

/// Directory of `<movieId>.jpg` posters.
#[derive(Debug, Clone)]
pub struct PosterStore {
    dir: PathBuf,
}

impl PosterStore {
    /// Open the poster directory, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, HarvestError> {
        let dir = dir.into();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
            log::info!("Created poster directory {}", dir.display());
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn poster_path(&self, movie_id: MovieId) -> PathBuf {
        poster_path(&self.dir, movie_id)
    }
}

pub(crate) fn poster_path(dir: &Path, movie_id: MovieId) -> PathBuf {
    dir.join(format!("{movie_id}.jpg"))
}

/// A zero-byte poster is a leftover from an interrupted write, not a result.
pub(crate) fn has_poster(dir: &Path, movie_id: MovieId) -> bool {
    fs::metadata(poster_path(dir, movie_id))
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

impl ResultStore<Vec<u8>> for PosterStore {
    fn completed(&self) -> Result<CompletedSet, HarvestError> {
        let mut done = CompletedSet::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("jpg") {
                continue;
            }
            let Some(id) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<MovieId>().ok())
            else {
                continue;
            };
            if has_poster(&self.dir, id) {
                done.insert(id);
            }
        }
        Ok(done)
    }

    fn persist(&mut self, movie_id: MovieId, output: &Vec<u8>) -> Result<(), HarvestError> {
        if output.is_empty() {
            return Err(HarvestError::EmptyResult(movie_id));
        }

        let target = self.poster_path(movie_id);
        let tmp = self.dir.join(format!("{movie_id}.jpg.part"));
        fs::write(&tmp, output)?;
        fs::File::open(&tmp)?.sync_all()?;
        fs::rename(&tmp, &target)?;

        log::debug!("Saved poster {}", target.display());
        Ok(())
    }
}

/// A copy of the work list that shrinks as items complete
/// (`for_movies_name.csv`, `movies_copy.csv`).
#[derive(Debug, Clone)]
pub struct PendingFile {
    path: PathBuf,
}

impl PendingFile {
    /// Open the checkpoint, seeding it from `seed` on first use.
    pub fn open_or_seed(path: impl Into<PathBuf>, seed: &Path) -> Result<Self, HarvestError> {
        let path = path.into();
        if !path.exists() {
            if !seed.exists() {
                return Err(HarvestError::MissingInput(seed.to_path_buf()));
            }
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::copy(seed, &path)?;
            log::info!(
                "Created checkpoint {} from {}",
                path.display(),
                seed.display()
            );
        }
        Ok(Self { path })
    }

    /// Open a checkpoint only if it already exists.
    pub fn existing(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        path.exists().then_some(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ids still listed. A missing or empty file means nothing is left.
    pub fn remaining(&self) -> Result<Vec<MovieId>, HarvestError> {
        match fs::metadata(&self.path) {
            Ok(meta) if meta.is_file() && meta.len() == 0 => return Ok(Vec::new()),
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        }
        let file = fs::File::open(&self.path)?;
        work::read_id_column(file, &self.path)
    }

    /// Drop every row for `movie_id`, replacing the file atomically.
    pub fn remove(&self, movie_id: MovieId) -> Result<(), HarvestError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)?;

        let tmp = temp_path(&self.path);
        let mut removed = 0usize;
        {
            let mut writer = csv::WriterBuilder::new()
                .flexible(true)
                .from_path(&tmp)?;
            // Byte records: rows that are not valid UTF-8 are copied through
            for (i, result) in reader.byte_records().enumerate() {
                let record = result?;
                let is_target = i > 0 && leading_id(&record) == Some(movie_id);
                if is_target {
                    removed += 1;
                } else {
                    writer.write_byte_record(&record)?;
                }
            }
            let file = writer.into_inner().map_err(|e| e.into_error())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;

        if removed > 0 {
            log::debug!("Removed {} from {}", movie_id, self.path.display());
        }
        Ok(())
    }
}

/// How the pending subset of the work list is obtained.
#[derive(Debug, Clone)]
pub enum PendingSource {
    /// Full work list minus the completed set. Nothing extra is written.
    Derived,
    /// Rows of a checkpoint file, minus the completed set.
    CheckpointFile(PendingFile),
}

impl PendingSource {
    /// Pending ids, in work-list (or checkpoint-file) order.
    ///
    /// The completed set is always subtracted, so an item recorded just before
    /// a crash is not fetched again even if the checkpoint still lists it.
    pub fn pending(
        &self,
        full_list: &[MovieId],
        completed: &CompletedSet,
    ) -> Result<Vec<MovieId>, HarvestError> {
        let candidates = match self {
            Self::Derived => full_list.to_vec(),
            Self::CheckpointFile(file) => file.remaining()?,
        };
        Ok(candidates
            .into_iter()
            .filter(|id| !completed.contains(id))
            .collect())
    }

    /// Checkpoint a completed item.
    pub fn mark_done(&self, movie_id: MovieId) -> Result<(), HarvestError> {
        match self {
            Self::Derived => Ok(()),
            Self::CheckpointFile(file) => file.remove(movie_id),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Derived => "derived from output".to_string(),
            Self::CheckpointFile(file) => format!("checkpoint {}", file.path().display()),
        }
    }
}

/// Id in the first cell of a raw row, if it parses.
fn leading_id(record: &csv::ByteRecord) -> Option<MovieId> {
    let cell = record.get(0)?;
    std::str::from_utf8(cell).ok()?.parse().ok()
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Count how many of `ids` are in `completed`.
pub fn count_completed(ids: &[MovieId], completed: &CompletedSet) -> usize {
    ids.iter().filter(|id| completed.contains(id)).count()
}

/// Group duplicate ids in a result log, for reporting.
pub fn duplicate_ids(log: &CsvResultLog) -> Result<HashMap<MovieId, usize>, HarvestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(log.path())?;
    let mut counts: HashMap<MovieId, usize> = HashMap::new();
    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(_) => continue,
        };
        if let Some(id) = record.get(0).and_then(|c| c.parse::<MovieId>().ok()) {
            *counts.entry(id).or_default() += 1;
        }
    }
    counts.retain(|_, n| *n > 1);
    Ok(counts)
}

#[cfg(test)]
#[path = "tests/checkpoint_tests.rs"]
mod tests;
