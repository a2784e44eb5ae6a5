//! The dictionary-attack state machine.
//!
//! A [`CrackSession`] walks through these states exactly once:
//!
//! ```text
//! Initialized ──► Counting ──► Running ──┬──► Succeeded
//!      │              │           │      ├──► Exhausted
//!      │              │           │      └──► Cancelled
//!      └──────────────┴───────────┴─────────► Failed
//! ```
//!
//! - **Initialized**: both paths are validated and the archive format is
//!   sniffed. A ZIP archive without encrypted entries fails here.
//! - **Counting**: the wordlist is streamed once to count its candidates.
//! - **Running**: candidates are streamed and tested one at a time. The
//!   cancel token is polled before each candidate; the first match stops the
//!   loop.
//!
//! [`CrackSession::run`] consumes the session: a finished session cannot be
//! restarted, build a new one instead.
//!
//! # Example
//!
//! ```rust,no_run
//! use wordcrack::{CancelToken, CrackSession, SessionOptions, ThrottleConfig};
//! use std::time::Duration;
//!
//! let token = CancelToken::new();
//! let report = CrackSession::new("secret.zip", "words.txt")
//!     .cancel_token(token.clone())
//!     .options(SessionOptions::new().throttle(
//!         ThrottleConfig::new().min_interval(Duration::from_millis(250)),
//!     ))
//!     .run();
//!
//! match report.password() {
//!     Some(password) => println!("password: {}", password),
//!     None => println!("not found after {} words", report.tested_words()),
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::archive_kind::{ArchiveKind, ZipEncryption, zip_encryption};
use crate::cancel::CancellationSignal;
use crate::error::{Error, InputRole, Result};
use crate::progress::{NoProgress, ProgressEstimator, ProgressSink, ThrottleConfig};
use crate::report::{Outcome, ResultReport};
use crate::strategy::{StrategySet, Verdict};
use crate::wordlist::{Wordlist, check_readable_file};

/// Lifecycle state of a [`CrackSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Constructed, inputs not yet checked.
    Initialized,
    /// Counting wordlist candidates.
    Counting,
    /// Testing candidates.
    Running,
    /// A candidate matched.
    Succeeded,
    /// The wordlist ran out without a match.
    Exhausted,
    /// Cancellation was observed.
    Cancelled,
    /// Setup or I/O failed.
    Failed,
}

impl SessionState {
    /// Returns true for the four end states.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::Exhausted | Self::Cancelled | Self::Failed
        )
    }

    /// Returns whether the machine may move from `self` to `next`.
    pub fn can_transition_to(&self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Initialized, Counting)
                | (Counting, Running)
                | (Running, Succeeded | Exhausted | Cancelled)
                | (Initialized | Counting | Running, Failed)
        )
    }
}

impl From<Outcome> for SessionState {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Succeeded => Self::Succeeded,
            Outcome::Exhausted => Self::Exhausted,
            Outcome::Cancelled => Self::Cancelled,
            Outcome::Failed => Self::Failed,
        }
    }
}

/// How the wordlist total is obtained before testing starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountPolicy {
    /// Stream the wordlist once up front and count its candidates.
    #[default]
    Precount,
    /// Skip counting; the total stays 0 and percentages stay at 0 until the
    /// final snapshot.
    Skip,
}

/// Options for a cracking session.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Progress emission limits.
    pub throttle: ThrottleConfig,
    /// How the candidate total is computed.
    pub count_policy: CountPolicy,
}

impl SessionOptions {
    /// Creates default options (1 s / 1000 words throttle, precounting).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the progress throttle.
    pub fn throttle(mut self, throttle: ThrottleConfig) -> Self {
        self.throttle = throttle;
        self
    }

    /// Sets the count policy.
    pub fn count_policy(mut self, policy: CountPolicy) -> Self {
        self.count_policy = policy;
        self
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    tested: u64,
    total: u64,
    strategy_errors: u64,
}

/// One dictionary attack against one archive.
pub struct CrackSession {
    archive: PathBuf,
    wordlist: PathBuf,
    strategies: StrategySet,
    progress: Box<dyn ProgressSink>,
    cancel: Option<Box<dyn CancellationSignal>>,
    options: SessionOptions,
    state: SessionState,
    counters: Counters,
}

impl std::fmt::Debug for CrackSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrackSession")
            .field("archive", &self.archive)
            .field("wordlist", &self.wordlist)
            .field("strategies", &self.strategies)
            .field("options", &self.options)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl CrackSession {
    /// Creates a session using the host's default strategies, no progress
    /// sink and no cancellation.
    ///
    /// Paths are not checked until [`run`](Self::run).
    pub fn new(archive: impl AsRef<Path>, wordlist: impl AsRef<Path>) -> Self {
        Self {
            archive: archive.as_ref().to_path_buf(),
            wordlist: wordlist.as_ref().to_path_buf(),
            strategies: StrategySet::host_default(),
            progress: Box::new(NoProgress),
            cancel: None,
            options: SessionOptions::default(),
            state: SessionState::Initialized,
            counters: Counters::default(),
        }
    }

    /// Replaces the verification strategies.
    pub fn strategies(mut self, strategies: StrategySet) -> Self {
        self.strategies = strategies;
        self
    }

    /// Sets the progress sink.
    pub fn progress(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.progress = Box::new(sink);
        self
    }

    /// Sets the cancellation signal polled between candidates.
    pub fn cancel_token(mut self, signal: impl CancellationSignal + 'static) -> Self {
        self.cancel = Some(Box::new(signal));
        self
    }

    /// Sets the session options.
    pub fn options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    /// Path of the archive under attack.
    pub fn archive(&self) -> &Path {
        &self.archive
    }

    /// Path of the wordlist.
    pub fn wordlist(&self) -> &Path {
        &self.wordlist
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Runs the attack to completion and returns its report.
    ///
    /// Never panics on bad input: every failure ends up in a report with
    /// [`Outcome::Failed`].
    pub fn run(mut self) -> ResultReport {
        let start = Instant::now();
        match self.drive(start) {
            Ok(report) => report,
            Err(error) => {
                log::error!("session failed: {}", error);
                self.transition(SessionState::Failed);
                let Counters {
                    tested,
                    total,
                    strategy_errors,
                } = self.counters;
                ResultReport::failed(&error, start.elapsed(), tested, total, strategy_errors)
            }
        }
    }

    fn drive(&mut self, start: Instant) -> Result<ResultReport> {
        let (mut wordlist, kind) = self.validate_inputs()?;

        self.transition(SessionState::Counting);
        self.counters.total = match self.options.count_policy {
            CountPolicy::Precount => wordlist.total_candidates()?,
            CountPolicy::Skip => 0,
        };
        log::info!(
            "{} candidates in {}",
            self.counters.total,
            self.wordlist.display()
        );
        self.progress.on_total(self.counters.total);

        self.transition(SessionState::Running);
        self.strategies.ensure_available(kind)?;
        log::debug!("strategies: {}", self.strategies.names().join(", "));

        let mut estimator = ProgressEstimator::new(self.options.throttle);
        let initial = estimator.initial(self.counters.total);
        self.progress.on_progress(&initial);

        let mut stream = wordlist.stream()?;
        loop {
            if self.is_cancelled() {
                log::info!("cancelled after {} candidates", self.counters.tested);
                return Ok(self.finish(Outcome::Cancelled, &mut estimator, start));
            }

            let candidate = match stream.next_candidate() {
                Ok(Some(candidate)) => candidate,
                Ok(None) => break,
                Err(error) => {
                    let snapshot =
                        estimator.finish(self.counters.tested, self.counters.total, false);
                    self.progress.on_progress(&snapshot);
                    return Err(error);
                }
            };

            self.counters.tested += 1;
            log::trace!("testing candidate #{}", self.counters.tested);

            match self.strategies.verify(&self.archive, kind, &candidate) {
                Verdict::Matched { strategy } => {
                    log::info!(
                        "password found by {} after {} candidates",
                        strategy,
                        self.counters.tested
                    );
                    self.transition(SessionState::Succeeded);
                    self.emit_final(&mut estimator, true);
                    return Ok(ResultReport::succeeded(
                        &candidate,
                        strategy,
                        start.elapsed(),
                        self.counters.tested,
                        self.counters.total,
                        self.counters.strategy_errors,
                    ));
                }
                // A tool interrupted together with us is not a tool error
                Verdict::NotMatched { failures } if failures > 0 && self.is_cancelled() => {
                    log::debug!("ignoring {} failure(s) after cancellation", failures);
                }
                Verdict::NotMatched { failures } => {
                    self.counters.strategy_errors += u64::from(failures);
                }
            }

            if let Some(snapshot) =
                estimator.update(self.counters.tested, self.counters.total, Some(&candidate))
            {
                self.progress.on_progress(&snapshot);
            }
        }

        log::info!(
            "wordlist exhausted after {} candidates",
            self.counters.tested
        );
        Ok(self.finish(Outcome::Exhausted, &mut estimator, start))
    }

    fn validate_inputs(&self) -> Result<(Wordlist, ArchiveKind)> {
        check_readable_file(InputRole::Archive, &self.archive)?;
        let wordlist = Wordlist::open(&self.wordlist)?;

        let kind = ArchiveKind::sniff(&self.archive)
            .map_err(|e| Error::invalid_input(InputRole::Archive, &self.archive, e.to_string()))?;
        if kind == ArchiveKind::Unknown {
            log::warn!(
                "{} is neither a zip nor a 7z archive, trying anyway",
                self.archive.display()
            );
        } else {
            log::debug!("{} detected as {}", self.archive.display(), kind);
        }

        if kind == ArchiveKind::Zip {
            let encryption = zip_encryption(&self.archive).map_err(|e| {
                Error::invalid_input(InputRole::Archive, &self.archive, e.to_string())
            })?;
            match encryption {
                ZipEncryption::Encrypted => {}
                ZipEncryption::Unencrypted => {
                    return Err(Error::invalid_input(
                        InputRole::Archive,
                        &self.archive,
                        "no encrypted entries, nothing to crack",
                    ));
                }
                ZipEncryption::Unknown => log::debug!(
                    "could not read zip headers of {}, assuming encrypted",
                    self.archive.display()
                ),
            }
        }
        Ok((wordlist, kind))
    }

    fn finish(
        &mut self,
        outcome: Outcome,
        estimator: &mut ProgressEstimator,
        start: Instant,
    ) -> ResultReport {
        self.transition(outcome.into());
        self.emit_final(estimator, outcome == Outcome::Exhausted);
        ResultReport::unsuccessful(
            outcome,
            start.elapsed(),
            self.counters.tested,
            self.counters.total,
            self.counters.strategy_errors,
        )
    }

    fn emit_final(&mut self, estimator: &mut ProgressEstimator, complete: bool) {
        let snapshot = estimator.finish(self.counters.tested, self.counters.total, complete);
        self.progress.on_progress(&snapshot);
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|c| c.is_cancelled())
    }

    fn transition(&mut self, next: SessionState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal session transition {:?} -> {:?}",
            self.state,
            next
        );
        log::debug!("session {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
