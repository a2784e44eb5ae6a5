//! Cooperative cancellation for cracking sessions.
//!
//! A session polls its signal once per loop iteration, before starting the
//! next candidate. A verification already in flight is never interrupted, so
//! the worst-case latency is one tool invocation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A poll-able cancellation flag.
pub trait CancellationSignal: Send + Sync {
    /// Returns `true` once cancellation has been requested.
    fn is_cancelled(&self) -> bool;
}

/// A cloneable cancellation token backed by an atomic flag.
///
/// All clones share the same flag; cancelling any clone cancels them all.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Returns whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

impl CancellationSignal for CancelToken {
    fn is_cancelled(&self) -> bool {
        CancelToken::is_cancelled(self)
    }
}

impl CancellationSignal for Arc<AtomicBool> {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Acquire)
    }
}

#[cfg(feature = "async")]
impl CancellationSignal for tokio_util::sync::CancellationToken {
    fn is_cancelled(&self) -> bool {
        tokio_util::sync::CancellationToken::is_cancelled(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_flag() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());

        token.cancel();
        assert!(clone.is_cancelled());
        assert!(CancellationSignal::is_cancelled(&clone));
    }

    #[test]
    fn test_atomic_bool_signal() {
        let flag = Arc::new(AtomicBool::new(false));
        let signal: Box<dyn CancellationSignal> = Box::new(flag.clone());
        assert!(!signal.is_cancelled());
        flag.store(true, Ordering::Release);
        assert!(signal.is_cancelled());
    }
}
