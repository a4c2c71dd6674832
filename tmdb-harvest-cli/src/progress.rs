//! Progress display for a harvesting run.

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use tmdb_harvest_lib::HarvestEvent;

/// Bar currently on screen, cleared around every log line.
static ACTIVE: Mutex<Option<ProgressBar>> = Mutex::new(None);

/// Run `f` with the active bar (if any) hidden, so output lands above it.
pub(crate) fn suspend_active<R>(f: impl FnOnce() -> R) -> R {
    let bar = ACTIVE.lock().ok().and_then(|guard| guard.clone());
    match bar {
        Some(pb) => pb.suspend(f),
        None => f(),
    }
}

fn set_active(bar: Option<ProgressBar>) {
    if let Ok(mut guard) = ACTIVE.lock() {
        *guard = bar;
    }
}

/// A single progress bar fed by pipeline events.
pub(crate) struct HarvestProgress {
    pb: ProgressBar,
}

impl HarvestProgress {
    /// When `quiet` is true the bar is hidden.
    pub(crate) fn new(quiet: bool) -> Self {
        let pb = ProgressBar::new(0);
        if quiet {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }
        let style = ProgressStyle::with_template("  {spinner:.cyan} [{pos}/{len}] {msg}")
            .expect("static pattern")
            .tick_chars("/-\\|");
        pb.set_style(style);
        if !quiet {
            set_active(Some(pb.clone()));
        }
        Self { pb }
    }

    pub(crate) fn handle(&mut self, event: HarvestEvent) {
        match event {
            HarvestEvent::Started { pending, .. } => {
                self.pb.set_length(pending as u64);
                self.pb.enable_steady_tick(Duration::from_millis(100));
            }
            HarvestEvent::ItemStarted { movie_id, .. } => {
                self.pb
                    .set_message(format!("movie {movie_id}: looking up tmdbId"));
            }
            HarvestEvent::ItemFetching {
                movie_id, tmdb_id, ..
            } => {
                self.pb
                    .set_message(format!("movie {movie_id}: fetching tmdb {tmdb_id}"));
            }
            HarvestEvent::ItemCompleted {
                movie_id, summary, ..
            } => {
                self.pb.inc(1);
                log::info!(
                    "  {} {} -> {}",
                    "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                    movie_id,
                    summary,
                );
            }
            HarvestEvent::ItemSkipped {
                movie_id, reason, ..
            } => {
                self.pb.inc(1);
                self.pb
                    .set_message(format!("movie {movie_id}: skipped ({reason})"));
            }
            HarvestEvent::ItemFailed { movie_id, .. } => {
                self.pb.inc(1);
                self.pb.set_message(format!("movie {movie_id}: failed"));
            }
            HarvestEvent::Restarting {
                attempt,
                max,
                delay,
                ..
            } => {
                self.pb.set_message(format!(
                    "restart {attempt}/{max} in {}s",
                    delay.as_secs()
                ));
            }
            HarvestEvent::Done => {
                self.pb.disable_steady_tick();
            }
        }
    }

    pub(crate) fn finish(self) {
        set_active(None);
        self.pb.finish_and_clear();
    }
}
