pub(crate) mod config;
pub(crate) mod dedupe;
pub(crate) mod harvest;
pub(crate) mod missing;
pub(crate) mod status;

use std::path::{Path, PathBuf};

use tmdb_harvest_lib::HarvestSettings;

/// Shared state for every command: loaded settings and the data directory.
pub(crate) struct CliContext {
    pub settings: HarvestSettings,
    pub data_dir: PathBuf,
    pub quiet: bool,
}

impl CliContext {
    /// An explicit path from the command line, or `name` under the data directory.
    pub(crate) fn file(&self, explicit: Option<PathBuf>, name: &str) -> PathBuf {
        explicit.unwrap_or_else(|| self.settings.data_file(&self.data_dir, name))
    }

    pub(crate) fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
