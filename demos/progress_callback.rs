//! Monitor a dictionary attack using a custom progress sink.
//!
//! This example demonstrates how to:
//! - Implement the `ProgressSink` trait
//! - Tune the emission throttle
//! - Stop a running session from another thread with a `CancelToken`
//!
//! # Usage
//!
//! ```bash
//! cargo run --example progress_callback -- secret.zip words.txt [timeout-secs]
//! ```

use std::env;
use std::io::Write;
use std::time::Duration;

use wordcrack::progress::{ProgressSink, ProgressSnapshot, ThrottleConfig};
use wordcrack::{CancelToken, CrackSession, Outcome, SessionOptions};

/// Draws a one-line text progress bar on stderr.
struct TextBar {
    width: usize,
}

impl ProgressSink for TextBar {
    fn on_total(&mut self, total_words: u64) {
        eprintln!("Testing {} candidates", total_words);
    }

    fn on_progress(&mut self, snapshot: &ProgressSnapshot) {
        let filled = ((snapshot.percent_complete / 100.0) * self.width as f64) as usize;
        eprint!(
            "\r[{}{}] {:>6.2}% {}/{} ETA {:<12}",
            "=".repeat(filled),
            " ".repeat(self.width - filled),
            snapshot.percent_complete,
            snapshot.words_tested,
            snapshot.total_words,
            snapshot.format_eta()
        );
        let _ = std::io::stderr().flush();
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <archive> <wordlist> [timeout-secs]", args[0]);
        std::process::exit(1);
    }
    let timeout = args
        .get(3)
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs);

    // Give up after the timeout, keeping the partial counts
    let token = CancelToken::new();
    if let Some(timeout) = timeout {
        let stopper = token.clone();
        std::thread::spawn(move || {
            std::thread::sleep(timeout);
            stopper.cancel();
        });
    }

    let throttle = ThrottleConfig::new()
        .min_interval(Duration::from_millis(200))
        .every_n(500);

    let report = CrackSession::new(&args[1], &args[2])
        .progress(TextBar { width: 40 })
        .cancel_token(token)
        .options(SessionOptions::new().throttle(throttle))
        .run();
    eprintln!();

    match report.outcome() {
        Outcome::Succeeded => println!(
            "Password: {} ({} words, {} ms)",
            report.password().unwrap_or_default(),
            report.tested_words(),
            report.execution_time_millis()
        ),
        Outcome::Exhausted => println!("Not found in {} words", report.tested_words()),
        Outcome::Cancelled => println!(
            "Timed out after {}/{} words",
            report.tested_words(),
            report.total_words()
        ),
        Outcome::Failed => {
            eprintln!("Error: {}", report.error().unwrap_or("unknown"));
            std::process::exit(2);
        }
    }
}
