//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "tmdb-harvest")]
#[command(about = "Resumable scraper for TMDB movie titles and posters", long_about = None)]
pub(crate) struct Cli {
    /// Directory holding movies.csv, links.csv and the outputs
    /// (defaults to data_dir in settings.toml, then the current directory)
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Only show warnings and errors
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also write log output to a file (ANSI codes stripped)
    #[arg(long, global = true)]
    pub logfile: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// How pending work is tracked between runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Strategy {
    /// Full work list minus whatever the output already holds
    Derived,
    /// A copy of the work list that loses a row per completed movie
    CheckpointFile,
}

/// Arguments shared by the harvesting commands.
#[derive(Args, Clone)]
pub(crate) struct HarvestArgs {
    /// Work list CSV (default: movies.csv in the data directory)
    #[arg(long)]
    pub movies: Option<PathBuf>,

    /// Join file mapping movieId to tmdbId (default: links.csv)
    #[arg(long)]
    pub links: Option<PathBuf>,

    /// How pending work is tracked
    #[arg(long, value_enum)]
    pub strategy: Option<Strategy>,

    /// Checkpoint file used with --strategy checkpoint-file
    #[arg(long)]
    pub checkpoint: Option<PathBuf>,

    /// Maximum number of movies to process in this run
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Minimum seconds per fetch (0 disables throttling)
    #[arg(long)]
    pub min_interval: Option<u64>,

    /// Resolve tmdb ids and report, without fetching or recording anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Scrape movie titles into movie_id_to_name.csv
    Names {
        #[command(flatten)]
        harvest: HarvestArgs,

        /// Output CSV (default: movie_id_to_name.csv)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Download poster images into movie_posters/
    Posters {
        #[command(flatten)]
        harvest: HarvestArgs,

        /// Poster directory (default: movie_posters)
        #[arg(long)]
        poster_dir: Option<PathBuf>,
    },

    /// Write the ids of movies without a poster to missing_movie_ids.csv
    Missing {
        /// Work list CSV (default: movies.csv)
        #[arg(long)]
        movies: Option<PathBuf>,

        /// Poster directory (default: movie_posters)
        #[arg(long)]
        poster_dir: Option<PathBuf>,

        /// Output CSV (default: missing_movie_ids.csv)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show how far each job has got
    Status {
        /// Work list CSV (default: movies.csv)
        #[arg(long)]
        movies: Option<PathBuf>,
    },

    /// Rewrite the title output keeping one row per movie
    Dedupe {
        /// Output CSV (default: movie_id_to_name.csv)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Manage settings.toml
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Print the effective settings
    Show,

    /// Print the settings file path
    Path,

    /// Save the default data directory
    SetDataDir {
        /// Directory to use when --data-dir is not given
        path: Option<PathBuf>,

        /// Remove the saved data directory
        #[arg(long, conflicts_with = "path")]
        clear: bool,
    },
}
