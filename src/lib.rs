//! # wordcrack
//!
//! A dictionary-attack engine for password-protected archives.
//!
//! `wordcrack` streams candidate passphrases from a wordlist of any size,
//! tests each one against a ZIP or 7z archive through external archive tools
//! running in test-only mode, reports live progress with an ETA, and stops on
//! the first match, on exhaustion, or when cancelled.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wordcrack::CrackSession;
//!
//! let report = CrackSession::new("secret.zip", "rockyou.txt").run();
//!
//! if let Some(password) = report.password() {
//!     println!("found '{}' after {} words", password, report.tested_words());
//! } else {
//!     println!("{}: {:?}", report.outcome(), report.error());
//! }
//! ```
//!
//! ### Progress and Cancellation
//!
//! ```rust,no_run
//! use wordcrack::{CancelToken, CrackSession, progress_fn};
//!
//! let token = CancelToken::new();
//! let stopper = token.clone();
//! ctrlc_like_handler(move || stopper.cancel());
//!
//! let report = CrackSession::new("secret.7z", "words.txt")
//!     .cancel_token(token)
//!     .progress(progress_fn(|s| {
//!         eprintln!("{}/{} ({:.1}%), ETA {}", s.words_tested, s.total_words,
//!             s.percent_complete, s.format_eta());
//!     }))
//!     .run();
//! # fn ctrlc_like_handler(_f: impl FnOnce()) {}
//! ```
//!
//! ## Verification Strategies
//!
//! Candidates are tested by a [`StrategySet`], an ordered list of
//! [`VerificationStrategy`] implementations. The default set runs `7z t`
//! first and `unzip -t` second. A word is rejected only once every tool has
//! had its say; a missing tool is skipped, a crashing tool is counted in
//! [`ResultReport::strategy_errors`] and never aborts the session. Custom
//! strategies plug in through the trait or [`strategy::strategy_fn`].
//!
//! A ZIP archive whose entries are all unencrypted is rejected up front, since
//! any password would "open" it.
//!
//! ## Counting Policy
//!
//! Blank and whitespace-only wordlist lines are never candidates, nor are
//! lines longer than [`wordlist::MAX_LINE_LEN`]: they are neither tested nor
//! counted, so an exhausted session always reports
//! `tested_words == total_words`. Candidates keep their exact bytes, so
//! non-UTF-8 wordlists work as they are.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `async` | No | [`AsyncCrackSession`] on Tokio's blocking pool |
//! | `cli` | No | The `wordcrack` command-line tool |
//!
//! ## Error Handling
//!
//! [`CrackSession::run`] never returns an error: every failure is folded
//! into a [`ResultReport`] with [`Outcome::Failed`]. Lower-level APIs
//! ([`wordlist`], [`strategy`]) return [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`.
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.85** or later.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

/// Default buffer size for wordlist reads (64 KiB).
pub(crate) const READ_BUFFER_SIZE: usize = 64 * 1024;

pub mod archive_kind;
pub mod cancel;
pub mod error;
pub mod progress;
pub mod report;
pub mod session;
pub mod strategy;
pub mod wordlist;

#[cfg(feature = "async")]
#[cfg_attr(docsrs, doc(cfg(feature = "async")))]
pub mod async_session;

pub use archive_kind::{ArchiveKind, ZipEncryption};
pub use cancel::{CancelToken, CancellationSignal};
pub use error::{Error, InputRole, Result};
pub use report::{FailureKind, Outcome, ResultReport};
pub use session::{CountPolicy, CrackSession, SessionOptions, SessionState};
pub use strategy::{StrategySet, VerificationOutcome, VerificationStrategy};
pub use wordlist::{Candidate, LineStream, Wordlist};

// Re-export progress API
pub use progress::{
    AtomicProgress, CollectingProgress, Eta, NoProgress, ProgressEstimator, ProgressSink,
    ProgressSnapshot, ThrottleConfig, progress_fn,
};

#[cfg(feature = "async")]
pub use async_session::AsyncCrackSession;

// Re-export CancellationToken for convenience
#[cfg(feature = "async")]
pub use tokio_util::sync::CancellationToken;

/// Runs a session with default strategies and options.
///
/// Shorthand for `CrackSession::new(archive, wordlist).run()`.
pub fn crack(
    archive: impl AsRef<std::path::Path>,
    wordlist: impl AsRef<std::path::Path>,
) -> ResultReport {
    CrackSession::new(archive, wordlist).run()
}
