//! tmdb-harvest CLI
//!
//! Resumable scraping of TMDB movie titles and posters for a MovieLens-style
//! work list.

mod cli_types;
mod commands;
mod error;
mod logging;
mod progress;

use clap::Parser;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use cli_types::{Cli, Commands, ConfigAction};
use commands::CliContext;
use error::CliError;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.quiet, cli.verbose, cli.logfile.as_deref()) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    if let Err(e) = run(cli) {
        log::error!("{} {}", "\u{2718}".if_supports_color(Stderr, |t| t.red()), e);
        log::logger().flush();
        std::process::exit(1);
    }
    log::logger().flush();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings = tmdb_harvest_lib::settings::load_settings()?;
    let data_dir = settings.resolve_data_dir(cli.data_dir);
    let ctx = CliContext {
        settings,
        data_dir,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Names { harvest, output } => commands::harvest::run_names(&ctx, harvest, output),
        Commands::Posters {
            harvest,
            poster_dir,
        } => commands::harvest::run_posters(&ctx, harvest, poster_dir),
        Commands::Missing {
            movies,
            poster_dir,
            output,
        } => commands::missing::run_missing(&ctx, movies, poster_dir, output),
        Commands::Status { movies } => commands::status::run_status(&ctx, movies),
        Commands::Dedupe { output } => commands::dedupe::run_dedupe(&ctx, output),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(&ctx),
            ConfigAction::Path => {
                commands::config::run_config_path();
                Ok(())
            }
            ConfigAction::SetDataDir { path, clear } => {
                commands::config::run_config_set_data_dir(path, clear)
            }
        },
    }
}
