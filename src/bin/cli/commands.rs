//! Command implementations for the CLI tool.

use std::path::Path;
use std::time::Duration;

use wordcrack::{
    ArchiveKind, CancelToken, CountPolicy, CrackSession, SessionOptions, StrategySet,
    ThrottleConfig, strategy::SevenZip, strategy::Unzip, wordlist,
};

use crate::exit_codes::{ExitCode, error_to_exit_code, report_to_exit_code};
use crate::output::{WordlistCounts, create_formatter};
use crate::progress::CliProgress;
use crate::{OutputFormat, Tool};

/// Configuration for the crack command.
pub struct CrackConfig<'a> {
    pub archive_path: &'a Path,
    pub wordlist_path: &'a Path,
    pub tools: &'a [Tool],
    pub interval_ms: u64,
    pub every: u64,
    pub short_circuit: bool,
    pub count: bool,
    pub format: OutputFormat,
    pub quiet: bool,
}

/// Crack command implementation
pub fn crack(config: &CrackConfig<'_>) -> ExitCode {
    let formatter = create_formatter(config.format);

    // First Ctrl+C stops the session cleanly, a second one exits at once
    let token = CancelToken::new();
    let handler_token = token.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        if handler_token.is_cancelled() {
            std::process::exit(crate::exit_codes::USER_INTERRUPT);
        }
        eprintln!("\nInterrupted, finishing current word...");
        handler_token.cancel();
    }) {
        log::warn!("could not install Ctrl+C handler: {}", e);
    }

    let throttle = ThrottleConfig::new()
        .min_interval(Duration::from_millis(config.interval_ms))
        .every_n(config.every);
    let count_policy = if config.count {
        CountPolicy::Precount
    } else {
        CountPolicy::Skip
    };
    let options = SessionOptions::new()
        .throttle(throttle)
        .count_policy(count_policy);

    // JSON goes to stdout, so keep the bar out of scripted runs
    let progress = CliProgress::new(config.quiet || config.format == OutputFormat::Json);
    let bar = progress.handle();

    let report = CrackSession::new(config.archive_path, config.wordlist_path)
        .strategies(build_strategies(config.tools).exhaustive(!config.short_circuit))
        .progress(progress)
        .cancel_token(token)
        .options(options)
        .run();

    bar.finish_and_clear();

    print!("{}", formatter.format_report(&report));
    report_to_exit_code(&report)
}

/// Count command implementation
pub fn count(wordlist_path: &Path, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);

    let counts = wordlist::Wordlist::open(wordlist_path).and_then(|mut list| {
        Ok(WordlistCounts {
            lines: wordlist::count_lines(list.path())?,
            candidates: list.total_candidates()?,
        })
    });

    match counts {
        Ok(counts) => {
            print!("{}", formatter.format_counts(&counts));
            ExitCode::Success
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            error_to_exit_code(&e)
        }
    }
}

/// Probe command implementation
pub fn probe(tools: &[Tool], format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);
    let set = build_strategies(tools);

    // Availability does not depend on the archive for the bundled tools
    let status = set.probe(ArchiveKind::Zip);
    print!("{}", formatter.format_probe(&status));

    match set.ensure_available(ArchiveKind::Zip) {
        Ok(()) => ExitCode::Success,
        Err(e) => error_to_exit_code(&e),
    }
}

fn build_strategies(tools: &[Tool]) -> StrategySet {
    if tools.is_empty() {
        return StrategySet::host_default();
    }

    tools
        .iter()
        .fold(StrategySet::empty(), |set, tool| match tool {
            Tool::SevenZip => set.with(SevenZip::new()),
            Tool::Unzip => set.with(Unzip::new()),
        })
}
