//! Exit codes for the CLI tool.

use wordcrack::{Error, FailureKind, Outcome, ResultReport};

/// Exit code constants
pub const SUCCESS: i32 = 0;
/// Wordlist exhausted without a match
pub const NOT_FOUND: i32 = 1;
/// Fatal error occurred
pub const FATAL_ERROR: i32 = 2;
/// No verification tool available
pub const NO_STRATEGY: i32 = 4;
/// Bad input path or I/O error
pub const IO_ERROR: i32 = 5;
/// Ctrl+C (128 + SIGINT)
pub const USER_INTERRUPT: i32 = 130;

/// Exit code enum for structured handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    NotFound,
    FatalError,
    NoStrategy,
    IoError,
    UserInterrupt,
}

impl ExitCode {
    /// Returns the numeric exit code
    pub fn code(self) -> i32 {
        match self {
            Self::Success => SUCCESS,
            Self::NotFound => NOT_FOUND,
            Self::FatalError => FATAL_ERROR,
            Self::NoStrategy => NO_STRATEGY,
            Self::IoError => IO_ERROR,
            Self::UserInterrupt => USER_INTERRUPT,
        }
    }
}

/// Converts a finished session to an exit code
pub fn report_to_exit_code(report: &ResultReport) -> ExitCode {
    match report.outcome() {
        Outcome::Succeeded => ExitCode::Success,
        Outcome::Exhausted => ExitCode::NotFound,
        Outcome::Cancelled => ExitCode::UserInterrupt,
        Outcome::Failed => match report.failure_kind() {
            Some(FailureKind::InvalidInput | FailureKind::Io) => ExitCode::IoError,
            Some(FailureKind::NoStrategyAvailable) => ExitCode::NoStrategy,
            _ => ExitCode::FatalError,
        },
    }
}

/// Converts a wordcrack error to an exit code
pub fn error_to_exit_code(error: &Error) -> ExitCode {
    match error {
        Error::Io(_) | Error::InvalidInput { .. } => ExitCode::IoError,
        Error::NoStrategyAvailable { .. } => ExitCode::NoStrategy,
        Error::Cancelled => ExitCode::UserInterrupt,
        // Future error variants - required by #[non_exhaustive]
        _ => ExitCode::FatalError,
    }
}
