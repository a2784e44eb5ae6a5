//! Tokio integration for cracking sessions.
//!
//! The attack loop itself is blocking (it waits on external tools), so
//! [`AsyncCrackSession::run`] moves it onto the blocking thread pool with
//! [`tokio::task::spawn_blocking`]. Any number of async sessions can run side
//! by side; they share no state.
//!
//! # Example
//!
//! ```rust,ignore
//! use wordcrack::{AsyncCrackSession, CancellationToken};
//!
//! #[tokio::main]
//! async fn main() {
//!     let token = CancellationToken::new();
//!     let (session, mut updates) = AsyncCrackSession::new("secret.zip", "words.txt")
//!         .cancel_token(token.clone())
//!         .progress_channel();
//!
//!     let watcher = tokio::spawn(async move {
//!         while let Some(snapshot) = updates.recv().await {
//!             println!("{:.1}%", snapshot.percent_complete);
//!         }
//!     });
//!
//!     let report = session.run().await;
//!     watcher.await.ok();
//!     println!("success: {}", report.success());
//! }
//! ```

use std::path::Path;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::progress::{ProgressSink, ProgressSnapshot};
use crate::report::{FailureKind, ResultReport};
use crate::session::{CrackSession, SessionOptions};
use crate::strategy::StrategySet;

/// A [`CrackSession`] driven from async code.
#[derive(Debug)]
pub struct AsyncCrackSession {
    inner: CrackSession,
    token: CancellationToken,
}

impl AsyncCrackSession {
    /// Creates an async session with default strategies and a fresh token.
    pub fn new(archive: impl AsRef<Path>, wordlist: impl AsRef<Path>) -> Self {
        Self::from_session(CrackSession::new(archive, wordlist))
    }

    /// Wraps an already configured session.
    ///
    /// Any cancel signal set on `session` is replaced by this wrapper's token.
    pub fn from_session(session: CrackSession) -> Self {
        Self {
            inner: session,
            token: CancellationToken::new(),
        }
    }

    /// Replaces the verification strategies.
    pub fn strategies(mut self, strategies: StrategySet) -> Self {
        self.inner = self.inner.strategies(strategies);
        self
    }

    /// Sets the progress sink.
    pub fn progress(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.inner = self.inner.progress(sink);
        self
    }

    /// Routes progress snapshots into a new unbounded channel.
    ///
    /// The channel closes when the session finishes.
    pub fn progress_channel(self) -> (Self, mpsc::UnboundedReceiver<ProgressSnapshot>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (self.progress(tx), rx)
    }

    /// Sets the cancellation token.
    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// Sets the session options.
    pub fn options(mut self, options: SessionOptions) -> Self {
        self.inner = self.inner.options(options);
        self
    }

    /// A clone of the token that cancels this session.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Runs the session on the blocking pool and awaits its report.
    pub async fn run(self) -> ResultReport {
        let start = Instant::now();
        let session = self.inner.cancel_token(self.token);

        match tokio::task::spawn_blocking(move || session.run()).await {
            Ok(report) => report,
            Err(e) => {
                log::error!("session worker did not complete: {}", e);
                ResultReport::failed_with(
                    FailureKind::Internal,
                    format!("session worker did not complete: {}", e),
                    start.elapsed(),
                    0,
                    0,
                    0,
                )
            }
        }
    }
}
