use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use tmdb_harvest_lib::{CsvResultLog, HarvestError, dedupe_result_log};

use crate::commands::CliContext;
use crate::commands::harvest::NAME_COLUMN;
use crate::error::CliError;

/// Rewrite the names output with one row per movie.
pub(crate) fn run_dedupe(ctx: &CliContext, output: Option<PathBuf>) -> Result<(), CliError> {
    let output = ctx.file(output, &ctx.settings.files.names_output);
    if !output.exists() {
        return Err(HarvestError::MissingInput(output).into());
    }

    let log = CsvResultLog::open(&output, NAME_COLUMN)?;
    let dropped = dedupe_result_log(&log)?;
    if dropped == 0 {
        log::info!("No duplicate rows in {}", output.display());
    } else {
        log::info!(
            "{} Removed {} duplicate or empty row(s) from {}",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            dropped,
            output.display(),
        );
    }
    Ok(())
}
