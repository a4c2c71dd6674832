use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use tmdb_harvest_lib::settings::{
    BASE_URL_ENV, load_settings_from, save_settings_to, settings_path, settings_to_string,
};

use crate::commands::CliContext;
use crate::error::CliError;

/// Print the effective settings and where they came from.
pub(crate) fn run_config_show(ctx: &CliContext) -> Result<(), CliError> {
    let path = settings_path();
    log::info!(
        "{}",
        "tmdb-harvest Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("");
    if path.exists() {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(exists)".if_supports_color(Stdout, |t| t.green()),
        );
    } else {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(not found, using defaults)".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    if std::env::var(BASE_URL_ENV).is_ok_and(|v| !v.trim().is_empty()) {
        log::info!("  base_url overridden by {}", BASE_URL_ENV);
    }
    log::info!("  Data directory: {}", ctx.data_dir().display());
    log::info!("");
    for line in settings_to_string(&ctx.settings)?.lines() {
        log::info!("  {line}");
    }
    Ok(())
}

/// Print the settings file path.
pub(crate) fn run_config_path() {
    log::info!("{}", settings_path().display());
}

/// Save or clear the default data directory.
pub(crate) fn run_config_set_data_dir(path: Option<PathBuf>, clear: bool) -> Result<(), CliError> {
    let settings_file = settings_path();
    // Environment overrides are not persisted
    let mut settings = load_settings_from(&settings_file)?;

    settings.data_dir = if clear {
        None
    } else {
        let dir = path.ok_or_else(|| CliError::other("Give a directory, or --clear"))?;
        if !dir.is_dir() {
            return Err(CliError::other(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
        Some(std::fs::canonicalize(&dir)?)
    };

    save_settings_to(&settings_file, &settings)?;
    match &settings.data_dir {
        Some(dir) => log::info!(
            "{} Data directory set to {}",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            dir.display(),
        ),
        None => log::info!(
            "{} Saved data directory cleared",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        ),
    }
    Ok(())
}
