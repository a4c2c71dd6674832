//! Persistent settings (`~/.config/tmdb-harvest/settings.toml`).
//!
//! Every field has a default, so a missing file or a partial one is fine.
//! Resolution order for anything the CLI also exposes as a flag:
//! CLI flag, then environment, then the settings file, then the default.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::time::Duration;

use crate::error::HarvestError;
use crate::pipeline::PipelineOptions;
use crate::throttle::Throttle;

/// Overrides `fetch.base_url`.
pub const BASE_URL_ENV: &str = "TMDB_HARVEST_BASE_URL";

pub const DEFAULT_BASE_URL: &str = "https://www.themoviedb.org/movie/";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestSettings {
    /// Directory the file names below are relative to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub files: FileNames,
    pub fetch: FetchSettings,
}

/// File names, relative to the data directory unless absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileNames {
    pub movies: String,
    pub links: String,
    pub names_output: String,
    pub poster_dir: String,
    pub missing_output: String,
    pub names_checkpoint: String,
    pub posters_checkpoint: String,
}

impl Default for FileNames {
    fn default() -> Self {
        Self {
            movies: "movies.csv".to_string(),
            links: "links.csv".to_string(),
            names_output: "movie_id_to_name.csv".to_string(),
            poster_dir: "movie_posters".to_string(),
            missing_output: "missing_movie_ids.csv".to_string(),
            names_checkpoint: "for_movies_name.csv".to_string(),
            posters_checkpoint: "movies_copy.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Movie page URL prefix; the tmdbId is appended
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Floor on the duration of each fetching iteration
    pub min_interval_secs: u64,
    pub max_restarts: u32,
    pub restart_delay_secs: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: concat!("tmdb-harvest/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 30,
            min_interval_secs: 10,
            max_restarts: 5,
            restart_delay_secs: 5,
        }
    }
}

impl HarvestSettings {
    /// Resolve the data directory:
    ///
    /// 1. CLI override (if `Some`)
    /// 2. `data_dir` from `settings.toml`
    /// 3. Current working directory
    pub fn resolve_data_dir(&self, cli_override: Option<PathBuf>) -> PathBuf {
        cli_override
            .or_else(|| self.data_dir.clone())
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    /// Join a configured file name onto the data directory.
    pub fn data_file(&self, data_dir: &Path, name: &str) -> PathBuf {
        let path = Path::new(name);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            data_dir.join(path)
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.timeout_secs)
    }

    /// Pipeline options implied by these settings.
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            throttle: Throttle::new(Duration::from_secs(self.fetch.min_interval_secs)),
            limit: None,
            max_restarts: self.fetch.max_restarts,
            restart_delay: Duration::from_secs(self.fetch.restart_delay_secs),
            dry_run: false,
        }
    }

    /// Apply environment overrides, reading variables through `var`.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.fetch.base_url = url;
        }
    }
}

/// Canonical settings path: `~/.config/tmdb-harvest/settings.toml`.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("tmdb-harvest").join("settings.toml")
}

/// Load settings from the canonical path, with environment overrides applied.
pub fn load_settings() -> Result<HarvestSettings, HarvestError> {
    let mut settings = load_settings_from(&settings_path())?;
    settings.apply_env(|name| std::env::var(name).ok());
    Ok(settings)
}

/// Load settings from `path`. A missing file yields the defaults.
pub fn load_settings_from(path: &Path) -> Result<HarvestSettings, HarvestError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(HarvestSettings::default()),
        Err(e) => return Err(e.into()),
    };
    toml::from_str(&contents)
        .map_err(|e| HarvestError::settings(format!("{}: {e}", path.display())))
}

/// Save settings to the canonical path.
pub fn save_settings(settings: &HarvestSettings) -> Result<(), HarvestError> {
    save_settings_to(&settings_path(), settings)
}

/// Write settings atomically (temp file + rename).
pub fn save_settings_to(path: &Path, settings: &HarvestSettings) -> Result<(), HarvestError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let serialized = settings_to_string(settings)?;
    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, &serialized)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Pretty-printed TOML, as written to the settings file.
pub fn settings_to_string(settings: &HarvestSettings) -> Result<String, HarvestError> {
    toml::to_string_pretty(settings).map_err(|e| HarvestError::settings(e.to_string()))
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
