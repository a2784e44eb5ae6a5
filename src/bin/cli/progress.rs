//! Progress bar for cracking sessions.

use indicatif::{ProgressBar, ProgressStyle};
use wordcrack::progress::{ProgressSink, ProgressSnapshot};

/// Progress bar fed by session snapshots
pub struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    /// Creates a new progress bar, hidden when `quiet`
    pub fn new(quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new(0);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} words {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb
        };

        Self { bar }
    }

    /// A handle to the bar, for finishing it after the session consumed the sink
    pub fn handle(&self) -> ProgressBar {
        self.bar.clone()
    }
}

impl ProgressSink for CliProgress {
    fn on_total(&mut self, total_words: u64) {
        self.bar.set_length(total_words);
    }

    fn on_progress(&mut self, snapshot: &ProgressSnapshot) {
        self.bar.set_position(snapshot.words_tested);
        self.bar.set_message(format!(
            "{:.0} w/s, ETA {}",
            snapshot.words_per_second(),
            snapshot.format_eta()
        ));
    }
}
