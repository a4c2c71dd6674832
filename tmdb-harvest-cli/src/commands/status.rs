use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use tmdb_harvest_lib::checkpoint::{count_completed, duplicate_ids};
use tmdb_harvest_lib::{
    CompletedSet, CsvResultLog, MovieId, PendingFile, PosterStore, ResultStore, read_work_list,
};

use crate::commands::CliContext;
use crate::commands::harvest::NAME_COLUMN;
use crate::error::CliError;

/// Show how much of the work list each job has recorded.
pub(crate) fn run_status(ctx: &CliContext, movies: Option<PathBuf>) -> Result<(), CliError> {
    let files = &ctx.settings.files;
    let movies = ctx.file(movies, &files.movies);
    let full_list = read_work_list(&movies)?;

    log::info!(
        "{} {}",
        "Data directory:".if_supports_color(Stdout, |t| t.bold()),
        ctx.data_dir().display(),
    );
    log::info!("  Work list: {} movies in {}", full_list.len(), movies.display());
    log::info!("");

    // Titles
    let output = ctx.file(None, &files.names_output);
    log::info!("{}", "Titles".if_supports_color(Stdout, |t| t.bold()));
    if output.exists() {
        let log = CsvResultLog::open(&output, NAME_COLUMN)?;
        report_progress(&full_list, &log.completed()?);
        let duplicates = duplicate_ids(&log)?;
        if !duplicates.is_empty() {
            log::info!(
                "  {} {} movie(s) have more than one row; run `dedupe` to clean up",
                "!".if_supports_color(Stdout, |t| t.yellow()),
                duplicates.len(),
            );
        }
    } else {
        report_not_started(&output);
    }
    report_checkpoint(&ctx.file(None, &files.names_checkpoint))?;
    log::info!("");

    // Posters
    let poster_dir = ctx.file(None, &files.poster_dir);
    log::info!("{}", "Posters".if_supports_color(Stdout, |t| t.bold()));
    if poster_dir.is_dir() {
        let store = PosterStore::open(&poster_dir)?;
        report_progress(&full_list, &store.completed()?);
    } else {
        report_not_started(&poster_dir);
    }
    report_checkpoint(&ctx.file(None, &files.posters_checkpoint))?;

    Ok(())
}

fn report_progress(full_list: &[MovieId], completed: &CompletedSet) {
    let done = count_completed(full_list, completed);
    let left = full_list.len() - done;
    log::info!(
        "  {} {} recorded, {} pending",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        done,
        left.if_supports_color(Stdout, |t| t.cyan()),
    );
}

fn report_not_started(path: &Path) {
    log::info!(
        "  {} {}",
        path.display(),
        "(not started)".if_supports_color(Stdout, |t| t.dimmed()),
    );
}

fn report_checkpoint(path: &Path) -> Result<(), CliError> {
    let Some(file) = PendingFile::existing(path) else {
        return Ok(());
    };
    log::info!(
        "  Checkpoint {}: {} row(s) left",
        path.display(),
        file.remaining()?.len(),
    );
    Ok(())
}
