//! `names` and `posters`: the two harvesting jobs.

use std::path::Path;
use std::time::Duration;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use tokio::sync::mpsc;

use tmdb_harvest_lib::async_util::run_with_events;
use tmdb_harvest_lib::{
    CsvResultLog, Describe, Fetcher, LinkTable, MovieId, PendingFile, PendingSource,
    PipelineOptions, PosterStore, ResultStore, RunStats, Throttle, read_work_list, run_pipeline,
};
use tmdb_harvest_scraper::{PosterFetcher, TitleFetcher, TmdbClient};

use crate::cli_types::{HarvestArgs, Strategy};
use crate::commands::CliContext;
use crate::error::CliError;
use crate::progress::HarvestProgress;

/// Column holding the scraped title in the names output.
pub(crate) const NAME_COLUMN: &str = "movieName";

/// Scrape titles into the names output.
pub(crate) fn run_names(
    ctx: &CliContext,
    args: HarvestArgs,
    output: Option<std::path::PathBuf>,
) -> Result<(), CliError> {
    let files = &ctx.settings.files;
    let movies = ctx.file(args.movies.clone(), &files.movies);
    let links = ctx.file(args.links.clone(), &files.links);
    let output = ctx.file(output, &files.names_output);
    let checkpoint = ctx.file(args.checkpoint.clone(), &files.names_checkpoint);

    let full_list = read_work_list(&movies)?;
    let link_table = LinkTable::open(&links)?;
    let mut store = CsvResultLog::open(&output, NAME_COLUMN)?;
    let pending = pending_source(
        args.strategy.unwrap_or(Strategy::CheckpointFile),
        &checkpoint,
        &movies,
        args.dry_run,
    )?;
    let fetcher = TitleFetcher::new(connect(ctx)?);

    log::info!(
        "{} {} movies from {}",
        "Harvesting titles for".if_supports_color(Stdout, |t| t.bold()),
        full_list.len(),
        movies.display(),
    );
    log::info!("  Output:  {}", output.display());
    log::info!("  Pending: {}", pending.describe());

    drive(
        ctx,
        &full_list,
        &link_table,
        &fetcher,
        &mut store,
        &pending,
        &options(ctx, &args),
    )
    .map(|_| ())
}

/// Download posters into the poster directory.
pub(crate) fn run_posters(
    ctx: &CliContext,
    args: HarvestArgs,
    poster_dir: Option<std::path::PathBuf>,
) -> Result<(), CliError> {
    let files = &ctx.settings.files;
    let movies = ctx.file(args.movies.clone(), &files.movies);
    let links = ctx.file(args.links.clone(), &files.links);
    let poster_dir = ctx.file(poster_dir, &files.poster_dir);
    let checkpoint = ctx.file(args.checkpoint.clone(), &files.posters_checkpoint);

    let full_list = read_work_list(&movies)?;
    let link_table = LinkTable::open(&links)?;
    let mut store = PosterStore::open(&poster_dir)?;
    let pending = pending_source(
        args.strategy.unwrap_or(Strategy::Derived),
        &checkpoint,
        &movies,
        args.dry_run,
    )?;
    let fetcher = PosterFetcher::new(connect(ctx)?);

    log::info!(
        "{} {} movies from {}",
        "Harvesting posters for".if_supports_color(Stdout, |t| t.bold()),
        full_list.len(),
        movies.display(),
    );
    log::info!("  Posters: {}", poster_dir.display());
    log::info!("  Pending: {}", pending.describe());

    drive(
        ctx,
        &full_list,
        &link_table,
        &fetcher,
        &mut store,
        &pending,
        &options(ctx, &args),
    )
    .map(|_| ())
}

fn connect(ctx: &CliContext) -> Result<TmdbClient, CliError> {
    let fetch = &ctx.settings.fetch;
    let client = TmdbClient::new(
        &fetch.base_url,
        Some(ctx.settings.request_timeout()),
        &fetch.user_agent,
    )?;
    log::debug!("Movie pages under {}", client.base_url());
    Ok(client)
}

fn pending_source(
    strategy: Strategy,
    checkpoint: &Path,
    movies: &Path,
    dry_run: bool,
) -> Result<PendingSource, CliError> {
    match strategy {
        Strategy::Derived => Ok(PendingSource::Derived),
        // Dry runs never create the checkpoint file
        Strategy::CheckpointFile if dry_run && !checkpoint.exists() => {
            log::info!(
                "[dry run] {} does not exist yet; using the full work list",
                checkpoint.display()
            );
            Ok(PendingSource::Derived)
        }
        Strategy::CheckpointFile => Ok(PendingSource::CheckpointFile(
            PendingFile::open_or_seed(checkpoint, movies)?,
        )),
    }
}

fn options(ctx: &CliContext, args: &HarvestArgs) -> PipelineOptions {
    let mut options = ctx.settings.pipeline_options();
    if let Some(secs) = args.min_interval {
        options.throttle = if secs == 0 {
            Throttle::disabled()
        } else {
            Throttle::new(Duration::from_secs(secs))
        };
    }
    options.limit = args.limit;
    options.dry_run = args.dry_run;
    options
}

/// Run the pipeline on a fresh runtime, showing progress, then print a summary.
fn drive<F, S>(
    ctx: &CliContext,
    full_list: &[MovieId],
    resolver: &LinkTable,
    fetcher: &F,
    store: &mut S,
    pending: &PendingSource,
    options: &PipelineOptions,
) -> Result<RunStats, CliError>
where
    F: Fetcher,
    F::Output: Describe,
    S: ResultStore<F::Output>,
{
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::runtime(format!("Failed to create async runtime: {e}")))?;

    let mut progress = HarvestProgress::new(ctx.quiet);
    let result = rt.block_on(async {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = run_pipeline(full_list, resolver, fetcher, store, pending, options, tx);
        run_with_events(task, rx, |event| progress.handle(event)).await
    });
    progress.finish();

    let stats = result?;
    print_summary(&stats, options.dry_run);
    Ok(stats)
}

fn print_summary(stats: &RunStats, dry_run: bool) {
    log::info!("");
    log::info!("{}", "Summary:".if_supports_color(Stdout, |t| t.bold()));
    log::info!(
        "  {} of {} movies were already done, {} pending",
        stats.already_done,
        stats.total,
        stats.pending,
    );
    if dry_run {
        log::info!(
            "  {} {} would be fetched",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            stats.dry_run_hits,
        );
    } else {
        log::info!(
            "  {} {} recorded",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            stats.completed,
        );
    }
    if stats.lookup_misses > 0 {
        log::info!(
            "  {} {} without a tmdbId",
            "?".if_supports_color(Stdout, |t| t.yellow()),
            stats.lookup_misses,
        );
    }
    if stats.failures > 0 {
        log::info!(
            "  {} {} failed",
            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            stats.failures,
        );
    }
    if stats.restarts > 0 {
        log::info!("  {} restart(s) after infrastructure errors", stats.restarts);
    }
    let settled = stats.completed + stats.lookup_misses + stats.failures + stats.dry_run_hits;
    let left = stats.pending.saturating_sub(settled);
    if left > 0 {
        log::info!(
            "  {} still pending; run again to continue",
            left.if_supports_color(Stdout, |t| t.cyan()),
        );
    }
}
