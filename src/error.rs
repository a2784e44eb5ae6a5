//! Error types for dictionary-attack sessions.
//!
//! This module provides the [`Error`] enum which represents all failure modes
//! of a cracking session, along with a convenient [`Result<T>`] type alias.
//!
//! # Fatal and Recoverable Errors
//!
//! Only two kinds of error terminate a session abnormally:
//!
//! | Variant | Raised when | Session state |
//! |---------|-------------|---------------|
//! | [`InvalidInput`][Error::InvalidInput] | archive or wordlist missing/unreadable | `Failed` before `Running` |
//! | [`NoStrategyAvailable`][Error::NoStrategyAvailable] | no configured tool runs on this host | `Failed` |
//!
//! A [`Strategy`][Error::Strategy] error is local to one `(strategy, candidate)`
//! pair: the session falls through to the next strategy or the next candidate.
//! [`Cancelled`][Error::Cancelled] is a normal terminal state, not a failure.
//!
//! ```rust
//! use wordcrack::Error;
//!
//! fn describe(error: &Error) -> &'static str {
//!     if error.is_fatal() {
//!         "session aborted"
//!     } else if error.is_cancelled() {
//!         "stopped by caller"
//!     } else {
//!         "retried with the next strategy"
//!     }
//! }
//! ```

use std::io;
use std::path::PathBuf;

/// Which session input an [`Error::InvalidInput`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRole {
    /// The password-protected archive under test.
    Archive,
    /// The wordlist supplying candidate passphrases.
    Wordlist,
}

impl std::fmt::Display for InputRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Archive => write!(f, "archive"),
            Self::Wordlist => write!(f, "wordlist"),
        }
    }
}

/// The main error type for cracking sessions.
///
/// # Error Categories
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | I/O | [`Io`][Self::Io] | Reading the wordlist failed mid-stream |
/// | Input | [`InvalidInput`][Self::InvalidInput] | Bad archive or wordlist path |
/// | Host | [`NoStrategyAvailable`][Self::NoStrategyAvailable] | No archive-test tool installed |
/// | Verification | [`Strategy`][Self::Strategy] | A tool crashed or rejected the archive |
/// | Control | [`Cancelled`][Self::Cancelled] | Caller signalled the cancel token |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred while streaming the wordlist.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The archive or wordlist path is missing, not a file, or unreadable.
    ///
    /// Raised while the session is `Initialized`; the session never reaches
    /// `Running`.
    #[error("invalid {role} '{}': {reason}", path.display())]
    InvalidInput {
        /// Which input was rejected.
        role: InputRole,
        /// The offending path.
        path: PathBuf,
        /// Why the path was rejected.
        reason: String,
    },

    /// None of the configured verification strategies can run on this host.
    #[error("no verification strategy available (tried: {})", tried.join(", "))]
    NoStrategyAvailable {
        /// Names of the strategies that were probed.
        tried: Vec<String>,
    },

    /// A single strategy failed for one candidate.
    ///
    /// The session recovers locally by trying the next strategy or candidate.
    #[error("strategy '{strategy}' failed: {reason}")]
    Strategy {
        /// Name of the failing strategy.
        strategy: String,
        /// Description of the failure (exit status, stderr excerpt, ...).
        reason: String,
    },

    /// The session was cancelled by the caller.
    #[error("session cancelled")]
    Cancelled,
}

impl Error {
    /// Returns `true` if this error terminates a session abnormally.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::InvalidInput { .. } | Error::NoStrategyAvailable { .. } | Error::Io(_)
        )
    }

    /// Returns `true` if the session can continue after this error.
    ///
    /// Strategy failures degrade to "try the next strategy"; everything else
    /// ends the session.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Strategy { .. })
    }

    /// Returns `true` for the cancellation pseudo-error.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Returns `true` if the error was caused by a bad session input.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Error::InvalidInput { .. })
    }

    /// Returns the input path associated with this error, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Error::InvalidInput { path, .. } => Some(path.as_path()),
            _ => None,
        }
    }

    /// Creates an InvalidInput error.
    pub fn invalid_input(role: InputRole, path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::InvalidInput {
            role,
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a Strategy error.
    pub fn strategy(strategy: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Strategy {
            strategy: strategy.into(),
            reason: reason.into(),
        }
    }
}

/// A specialized Result type for cracking operations.
pub type Result<T> = std::result::Result<T, Error>;
