//! The terminal result of a cracking session.

use std::time::Duration;

use zeroize::Zeroizing;

use crate::error::Error;
use crate::wordlist::Candidate;

/// Terminal state a session ended in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// A candidate opened the archive.
    Succeeded,
    /// Every candidate was tested without a match.
    Exhausted,
    /// Cancellation was observed between two candidates.
    Cancelled,
    /// Setup or I/O failed; see [`ResultReport::error`].
    Failed,
}

impl Outcome {
    /// Stable lowercase name, used in machine-readable output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Exhausted => "exhausted",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse classification of a [`Outcome::Failed`] session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Archive or wordlist path was unusable.
    InvalidInput,
    /// Reading the wordlist failed mid-run.
    Io,
    /// No configured strategy can test the archive.
    NoStrategyAvailable,
    /// Anything else, e.g. a worker task that panicked.
    Internal,
}

impl FailureKind {
    fn of(error: &Error) -> Self {
        match error {
            Error::InvalidInput { .. } => Self::InvalidInput,
            Error::Io(_) => Self::Io,
            Error::NoStrategyAvailable { .. } => Self::NoStrategyAvailable,
            _ => Self::Internal,
        }
    }
}

/// The matching candidate, exact and for display.
#[derive(Debug, Clone)]
struct FoundPassword {
    bytes: Zeroizing<Vec<u8>>,
    text: Zeroizing<String>,
}

/// Immutable summary of a finished session.
///
/// Counts are populated on every path, so a cancelled or failed session still
/// tells how far it got.
#[must_use = "the report says whether the password was found"]
#[derive(Debug, Clone)]
pub struct ResultReport {
    outcome: Outcome,
    password: Option<FoundPassword>,
    execution_time: Duration,
    tested_words: u64,
    total_words: u64,
    matched_by: Option<String>,
    strategy_errors: u64,
    error: Option<String>,
    failure: Option<FailureKind>,
}

impl ResultReport {
    pub(crate) fn succeeded(
        password: &Candidate,
        matched_by: String,
        execution_time: Duration,
        tested_words: u64,
        total_words: u64,
        strategy_errors: u64,
    ) -> Self {
        Self {
            outcome: Outcome::Succeeded,
            password: Some(FoundPassword {
                bytes: Zeroizing::new(password.as_bytes().to_vec()),
                text: Zeroizing::new(password.to_string_lossy().into_owned()),
            }),
            execution_time,
            tested_words,
            total_words,
            matched_by: Some(matched_by),
            strategy_errors,
            error: None,
            failure: None,
        }
    }

    pub(crate) fn unsuccessful(
        outcome: Outcome,
        execution_time: Duration,
        tested_words: u64,
        total_words: u64,
        strategy_errors: u64,
    ) -> Self {
        Self {
            outcome,
            password: None,
            execution_time,
            tested_words,
            total_words,
            matched_by: None,
            strategy_errors,
            error: None,
            failure: None,
        }
    }

    pub(crate) fn failed(
        error: &Error,
        execution_time: Duration,
        tested_words: u64,
        total_words: u64,
        strategy_errors: u64,
    ) -> Self {
        Self::failed_with(
            FailureKind::of(error),
            error.to_string(),
            execution_time,
            tested_words,
            total_words,
            strategy_errors,
        )
    }

    #[cfg_attr(not(feature = "async"), allow(dead_code))]
    pub(crate) fn failed_with(
        kind: FailureKind,
        message: String,
        execution_time: Duration,
        tested_words: u64,
        total_words: u64,
        strategy_errors: u64,
    ) -> Self {
        Self {
            error: Some(message),
            failure: Some(kind),
            ..Self::unsuccessful(
                Outcome::Failed,
                execution_time,
                tested_words,
                total_words,
                strategy_errors,
            )
        }
    }

    /// Terminal state of the session.
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Returns true if the password was found.
    pub fn success(&self) -> bool {
        self.outcome == Outcome::Succeeded
    }

    /// Returns true if the session stopped because it was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.outcome == Outcome::Cancelled
    }

    /// The discovered password as text, if any.
    ///
    /// A password that is not valid UTF-8 shows `U+FFFD` in place of the
    /// invalid bytes; [`password_bytes`](Self::password_bytes) has the exact
    /// value.
    pub fn password(&self) -> Option<&str> {
        self.password.as_ref().map(|found| found.text.as_str())
    }

    /// The discovered password exactly as it appeared in the wordlist.
    pub fn password_bytes(&self) -> Option<&[u8]> {
        self.password.as_ref().map(|found| found.bytes.as_slice())
    }

    /// Wall-clock time from the start of `run()` to termination.
    pub fn execution_time(&self) -> Duration {
        self.execution_time
    }

    /// [`execution_time`](Self::execution_time) in milliseconds.
    pub fn execution_time_millis(&self) -> u64 {
        self.execution_time.as_millis() as u64
    }

    /// Candidates tested, the matching one included.
    pub fn tested_words(&self) -> u64 {
        self.tested_words
    }

    /// Candidates in the wordlist (0 when counting never happened).
    pub fn total_words(&self) -> u64 {
        self.total_words
    }

    /// Name of the strategy that accepted the password.
    pub fn matched_by(&self) -> Option<&str> {
        self.matched_by.as_deref()
    }

    /// Number of individual strategy attempts that failed.
    pub fn strategy_errors(&self) -> u64 {
        self.strategy_errors
    }

    /// Human-readable error message for [`Outcome::Failed`].
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Classification of the error for [`Outcome::Failed`].
    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.failure
    }
}
