use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use tmdb_harvest_lib::{find_missing_posters, write_missing_ids};

use crate::commands::CliContext;
use crate::error::CliError;

/// Write the ids of work-list movies that have no poster yet.
pub(crate) fn run_missing(
    ctx: &CliContext,
    movies: Option<PathBuf>,
    poster_dir: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    let files = &ctx.settings.files;
    let movies = ctx.file(movies, &files.movies);
    let poster_dir = ctx.file(poster_dir, &files.poster_dir);
    let output = ctx.file(output, &files.missing_output);

    let missing = find_missing_posters(&movies, &poster_dir)?;
    write_missing_ids(&output, &missing)?;

    if missing.is_empty() {
        log::info!(
            "{} Every movie in {} has a poster",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            movies.display(),
        );
    } else {
        log::info!(
            "{} movies without a poster written to {}",
            missing.len().if_supports_color(Stdout, |t| t.yellow()),
            output.display(),
        );
    }
    Ok(())
}
