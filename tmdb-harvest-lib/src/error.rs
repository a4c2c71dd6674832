use std::path::PathBuf;

use thiserror::Error;

use crate::work::MovieId;

/// Errors raised by the harvest pipeline and its file stores.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// I/O error on one of the work, checkpoint or output files
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV that could not be read at all
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required input file does not exist
    #[error("Input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// A CSV header lacks a column we need
    #[error("{} has no '{column}' column", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    /// A store refused to record an empty result
    #[error("Refusing to record an empty result for movie {0}")]
    EmptyResult(MovieId),

    /// The network or another shared resource failed mid-pass
    #[error("Infrastructure failure: {0}")]
    Infrastructure(String),

    /// The outer loop gave up
    #[error("Giving up after {restarts} restarts: {last_error}")]
    RetriesExhausted { restarts: u32, last_error: String },

    /// Settings file could not be read or written
    #[error("Settings error: {0}")]
    Settings(String),
}

impl HarvestError {
    pub fn settings(msg: impl Into<String>) -> Self {
        Self::Settings(msg.into())
    }
}

/// Why a single fetch did not produce a result.
///
/// Everything except `Infrastructure` is scoped to one work item: the item is
/// skipped and the pass carries on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchFailure {
    #[error("timed out: {0}")]
    Timeout(String),

    #[error("remote error: {0}")]
    Remote(String),

    #[error("element not found: {0}")]
    MissingElement(String),

    #[error("infrastructure failure: {0}")]
    Infrastructure(String),
}

impl FetchFailure {
    /// True when the failure only affects the item being fetched.
    pub fn is_per_item(&self) -> bool {
        !matches!(self, Self::Infrastructure(_))
    }
}
