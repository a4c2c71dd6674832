//! The resumable harvest loop.
//!
//! One parameterized pass over the pending work list:
//! resolve the secondary key, fetch, persist, checkpoint, throttle.
//! Per-item failures are logged and skipped. A failure of shared
//! infrastructure (network down, output not writable) aborts the pass, and
//! the loop sleeps and starts a fresh pass from recomputed pending work, a
//! bounded number of times.

use std::collections::HashSet;

use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};

use crate::checkpoint::{PendingSource, ResultStore, count_completed};
use crate::error::{FetchFailure, HarvestError};
use crate::throttle::Throttle;
use crate::work::{MovieId, TmdbId};

/// Translates a work item into the remote system's key.
pub trait KeyResolver {
    /// `Ok(None)` is a lookup miss: the item is skipped, not retried.
    /// `Err` is treated as an infrastructure failure.
    fn resolve(&self, movie_id: MovieId) -> Result<Option<TmdbId>, HarvestError>;
}

/// Retrieves the result for one work item.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    type Output;

    async fn fetch(&self, movie_id: MovieId, tmdb_id: &TmdbId)
    -> Result<Self::Output, FetchFailure>;
}

/// Short human-readable form of a fetched result, for progress output.
pub trait Describe {
    fn describe(&self) -> String;
}

impl Describe for String {
    fn describe(&self) -> String {
        format!("\"{}\"", self)
    }
}

impl Describe for Vec<u8> {
    fn describe(&self) -> String {
        format!("{} bytes", self.len())
    }
}

/// Knobs for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub throttle: Throttle,
    /// Maximum number of items attempted in this run
    pub limit: Option<usize>,
    /// Outer-loop restarts allowed before giving up
    pub max_restarts: u32,
    /// Pause before each restart
    pub restart_delay: Duration,
    /// Resolve keys and report, without fetching or writing anything
    pub dry_run: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            throttle: Throttle::default(),
            limit: None,
            max_restarts: 5,
            restart_delay: Duration::from_secs(5),
            dry_run: false,
        }
    }
}

/// Progress events emitted during a run, consumed by the CLI.
#[derive(Debug, Clone)]
pub enum HarvestEvent {
    /// Pending work computed for the first pass.
    Started {
        total: usize,
        already_done: usize,
        pending: usize,
    },
    /// An item has started processing.
    ItemStarted { index: usize, movie_id: MovieId },
    /// Fetching from the remote site.
    ItemFetching {
        index: usize,
        movie_id: MovieId,
        tmdb_id: TmdbId,
    },
    /// Result recorded and checkpointed.
    ItemCompleted {
        index: usize,
        movie_id: MovieId,
        summary: String,
    },
    /// Item skipped without fetching (lookup miss, dry run).
    ItemSkipped {
        index: usize,
        movie_id: MovieId,
        reason: String,
    },
    /// Fetch failed for this item only.
    ItemFailed {
        index: usize,
        movie_id: MovieId,
        reason: String,
    },
    /// The pass was aborted and will be retried.
    Restarting {
        attempt: u32,
        max: u32,
        delay: Duration,
        reason: String,
    },
    /// Run finished.
    Done,
}

/// Counters for one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    /// Items in the full work list
    pub total: usize,
    /// Items of the work list already complete when the run began
    pub already_done: usize,
    /// Items pending when the run began
    pub pending: usize,
    /// Items picked up (including ones later skipped or failed)
    pub attempted: usize,
    /// Items recorded by this run
    pub completed: usize,
    /// Items with no TMDB id in the join file
    pub lookup_misses: usize,
    /// Items whose fetch failed
    pub failures: usize,
    /// Items that would have been fetched (dry run only)
    pub dry_run_hits: usize,
    /// Outer-loop restarts
    pub restarts: u32,
}

/// Mutable state carried across passes of one run.
struct RunState {
    stats: RunStats,
    /// Items skipped or failed this run; not retried on restart.
    skipped: HashSet<MovieId>,
    first_pass: bool,
}

/// Run the pipeline until the pending work is exhausted (or `limit` reached).
///
/// Returns an error only for setup problems surfaced on the first pass, or
/// once `max_restarts` restarts have been used up. The restart budget covers
/// the whole run and is not reset by later successes.
pub async fn run_pipeline<R, F, S>(
    full_list: &[MovieId],
    resolver: &R,
    fetcher: &F,
    store: &mut S,
    pending: &PendingSource,
    options: &PipelineOptions,
    events: mpsc::UnboundedSender<HarvestEvent>,
) -> Result<RunStats, HarvestError>
where
    R: KeyResolver,
    F: Fetcher,
    F::Output: Describe,
    S: ResultStore<F::Output>,
{
    let mut state = RunState {
        stats: RunStats {
            total: full_list.len(),
            ..Default::default()
        },
        skipped: HashSet::new(),
        first_pass: true,
    };

    loop {
        let outcome = run_pass(
            full_list, resolver, fetcher, store, pending, options, &events, &mut state,
        )
        .await;

        let err = match outcome {
            Ok(()) => break,
            // Setup errors surface before any work and are returned as-is
            Err(e) if state.first_pass => return Err(e),
            Err(e) => e,
        };

        if state.stats.restarts >= options.max_restarts {
            log::error!(
                "Giving up after {} restarts: {}",
                state.stats.restarts,
                err
            );
            return Err(HarvestError::RetriesExhausted {
                restarts: state.stats.restarts,
                last_error: err.to_string(),
            });
        }

        state.stats.restarts += 1;
        log::warn!(
            "Pass aborted: {}. Restarting in {}s (attempt {}/{})",
            err,
            options.restart_delay.as_secs_f64(),
            state.stats.restarts,
            options.max_restarts,
        );
        let _ = events.send(HarvestEvent::Restarting {
            attempt: state.stats.restarts,
            max: options.max_restarts,
            delay: options.restart_delay,
            reason: err.to_string(),
        });
        tokio::time::sleep(options.restart_delay).await;
    }

    let _ = events.send(HarvestEvent::Done);
    Ok(state.stats)
}

#[allow(clippy::too_many_arguments)]
async fn run_pass<R, F, S>(
    full_list: &[MovieId],
    resolver: &R,
    fetcher: &F,
    store: &mut S,
    pending: &PendingSource,
    options: &PipelineOptions,
    events: &mpsc::UnboundedSender<HarvestEvent>,
    state: &mut RunState,
) -> Result<(), HarvestError>
where
    R: KeyResolver,
    F: Fetcher,
    F::Output: Describe,
    S: ResultStore<F::Output>,
{
    let completed = store.completed()?;
    let queue: Vec<MovieId> = pending
        .pending(full_list, &completed)?
        .into_iter()
        .filter(|id| !state.skipped.contains(id))
        .collect();

    if state.first_pass {
        state.stats.already_done = count_completed(full_list, &completed);
        state.stats.pending = queue.len();
        let _ = events.send(HarvestEvent::Started {
            total: state.stats.total,
            already_done: state.stats.already_done,
            pending: state.stats.pending,
        });
        log::info!(
            "{} work items, {} already done, {} pending ({})",
            state.stats.total,
            state.stats.already_done,
            state.stats.pending,
            pending.describe(),
        );
        state.first_pass = false;
    }

    for movie_id in queue {
        if options.limit.is_some_and(|limit| state.stats.attempted >= limit) {
            log::info!("Reached limit of {} items", state.stats.attempted);
            break;
        }

        let index = state.stats.attempted;
        state.stats.attempted += 1;
        let outcome = process_item(
            index, movie_id, resolver, fetcher, store, pending, options, events, state,
        )
        .await;
        if let Err(e) = outcome {
            // The aborted item is picked up again by the next pass
            state.stats.attempted -= 1;
            return Err(e);
        }
    }

    Ok(())
}

/// Resolve, fetch, persist and checkpoint one item. `Err` aborts the pass.
#[allow(clippy::too_many_arguments)]
async fn process_item<R, F, S>(
    index: usize,
    movie_id: MovieId,
    resolver: &R,
    fetcher: &F,
    store: &mut S,
    pending: &PendingSource,
    options: &PipelineOptions,
    events: &mpsc::UnboundedSender<HarvestEvent>,
    state: &mut RunState,
) -> Result<(), HarvestError>
where
    R: KeyResolver,
    F: Fetcher,
    F::Output: Describe,
    S: ResultStore<F::Output>,
{
    let _ = events.send(HarvestEvent::ItemStarted { index, movie_id });
    log::debug!("Processing movie {}", movie_id);

    let Some(tmdb_id) = resolver.resolve(movie_id)? else {
        log::warn!("No tmdbId for movie {} in the join file, skipping", movie_id);
        state.stats.lookup_misses += 1;
        state.skipped.insert(movie_id);
        let _ = events.send(HarvestEvent::ItemSkipped {
            index,
            movie_id,
            reason: "no tmdbId in join file".to_string(),
        });
        return Ok(());
    };

    if options.dry_run {
        log::info!("[dry run] movie {} -> tmdb {}", movie_id, tmdb_id);
        state.stats.dry_run_hits += 1;
        state.skipped.insert(movie_id);
        let _ = events.send(HarvestEvent::ItemSkipped {
            index,
            movie_id,
            reason: format!("dry run (tmdb {})", tmdb_id),
        });
        return Ok(());
    }

    let started = Instant::now();
    let _ = events.send(HarvestEvent::ItemFetching {
        index,
        movie_id,
        tmdb_id: tmdb_id.clone(),
    });

    match fetcher.fetch(movie_id, &tmdb_id).await {
        Ok(output) => match store.persist(movie_id, &output) {
            Ok(()) => {
                pending.mark_done(movie_id)?;
                state.stats.completed += 1;
                let summary = output.describe();
                log::debug!("Completed movie {}: {}", movie_id, summary);
                let _ = events.send(HarvestEvent::ItemCompleted {
                    index,
                    movie_id,
                    summary,
                });
            }
            Err(HarvestError::EmptyResult(_)) => {
                record_failure(state, events, index, movie_id, "empty result".to_string());
            }
            Err(e) => return Err(e),
        },
        Err(failure) if failure.is_per_item() => {
            record_failure(state, events, index, movie_id, failure.to_string());
        }
        Err(failure) => {
            return Err(HarvestError::Infrastructure(failure.to_string()));
        }
    }

    options.throttle.wait_since(started).await;
    Ok(())
}

fn record_failure(
    state: &mut RunState,
    events: &mpsc::UnboundedSender<HarvestEvent>,
    index: usize,
    movie_id: MovieId,
    reason: String,
) {
    log::warn!("Movie {} failed: {}", movie_id, reason);
    state.stats.failures += 1;
    state.skipped.insert(movie_id);
    let _ = events.send(HarvestEvent::ItemFailed {
        index,
        movie_id,
        reason,
    });
}

#[cfg(test)]
#[path = "tests/pipeline_tests.rs"]
mod tests;
