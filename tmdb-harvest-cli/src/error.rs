use thiserror::Error;

use tmdb_harvest_lib::HarvestError;
use tmdb_harvest_scraper::ScrapeError;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Pipeline, input or checkpoint error
    #[error("{0}")]
    Harvest(#[from] HarvestError),

    /// HTTP client could not be set up
    #[error("Scraper error: {0}")]
    Scrape(#[from] ScrapeError),

    /// Runtime creation or async error
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Catch-all for other errors
    #[error("{0}")]
    Other(String),
}

impl CliError {
    pub(crate) fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    pub(crate) fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
