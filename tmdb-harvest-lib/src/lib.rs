//! Resumable harvesting of movie metadata.
//!
//! The pieces here are shared by every harvest job: reading the work list,
//! translating `movieId` to `tmdbId`, recording completed items, deriving
//! what is still pending, throttling, and the resume loop that ties them
//! together. Fetching lives in `tmdb-harvest-scraper`.

pub mod async_util;
pub mod checkpoint;
pub mod error;
pub mod links;
pub mod missing;
pub mod pipeline;
pub mod settings;
pub mod throttle;
pub mod work;

pub use checkpoint::{
    CompletedSet, CsvResultLog, PendingFile, PendingSource, PosterStore, ResultStore,
    dedupe_result_log,
};
pub use error::{FetchFailure, HarvestError};
pub use links::LinkTable;
pub use missing::{find_missing_posters, write_missing_ids};
pub use pipeline::{
    Describe, Fetcher, HarvestEvent, KeyResolver, PipelineOptions, RunStats, run_pipeline,
};
pub use settings::HarvestSettings;
pub use throttle::Throttle;
pub use work::{MovieId, TmdbId, read_work_list};
