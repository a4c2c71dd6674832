//! Console logger with an optional plain-text log file.
//!
//! Info and debug lines go to stdout, warnings and errors to stderr, with any
//! active progress bar cleared while they print. Records from dependency
//! crates are only shown at warning level or above.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use log::{Level, LevelFilter, Metadata, Record};

use crate::error::CliError;
use crate::progress;

const OWN_CRATE_PREFIX: &str = "tmdb_harvest";

struct CliLogger {
    level: LevelFilter,
    verbose: bool,
    file: Option<Mutex<File>>,
}

impl CliLogger {
    fn format(&self, record: &Record) -> String {
        if self.verbose {
            format!(
                "{} {:<5} {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        } else {
            record.args().to_string()
        }
    }

    fn write_file(&self, line: &str) {
        let Some(file) = &self.file else { return };
        let Ok(mut file) = file.lock() else { return };
        let clean = strip_ansi_escapes::strip(line.as_bytes());
        let _ = writeln!(
            file,
            "{} {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            String::from_utf8_lossy(&clean)
        );
    }
}

impl log::Log for CliLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        if metadata.level() > self.level {
            return false;
        }
        metadata.target().starts_with(OWN_CRATE_PREFIX) || metadata.level() <= Level::Warn
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = self.format(record);
        progress::suspend_active(|| {
            if record.level() <= Level::Warn {
                eprintln!("{line}");
            } else {
                println!("{line}");
            }
        });
        self.write_file(&line);
    }

    fn flush(&self) {
        let _ = std::io::stdout().flush();
        if let Some(Ok(mut file)) = self.file.as_ref().map(|f| f.lock()) {
            let _ = file.flush();
        }
    }
}

/// Install the logger. Call once, before any command runs.
pub(crate) fn init(quiet: bool, verbose: bool, logfile: Option<&Path>) -> Result<(), CliError> {
    let level = if quiet {
        LevelFilter::Warn
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let file = match logfile {
        Some(path) => Some(Mutex::new(
            OpenOptions::new().create(true).append(true).open(path)?,
        )),
        None => None,
    };

    log::set_boxed_logger(Box::new(CliLogger {
        level,
        verbose,
        file,
    }))
    .map_err(|e| CliError::other(format!("Failed to install logger: {e}")))?;
    log::set_max_level(level);
    Ok(())
}
