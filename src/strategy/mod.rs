//! Password verification strategies.
//!
//! A [`VerificationStrategy`] tests one candidate against one archive and
//! reports a [`VerificationOutcome`]. Strategies never extract anything: the
//! bundled backends run their tools in test mode.
//!
//! A [`StrategySet`] holds strategies in a fixed priority order and applies
//! the fallback rules for one candidate:
//!
//! - the first `Matched` wins;
//! - `NotMatched`, `Unavailable` and `Failed` fall through to the next
//!   strategy;
//! - running out of strategies means `NotMatched`.
//!
//! [`StrategySet::exhaustive(false)`](StrategySet::exhaustive) trusts the
//! first `NotMatched` instead, trading coverage for fewer tool runs.
//!
//! # Custom Strategies
//!
//! ```rust
//! use wordcrack::strategy::{StrategySet, VerificationOutcome, strategy_fn};
//!
//! let set = StrategySet::empty().with(strategy_fn("lookup", |_archive, candidate| {
//!     if candidate.as_bytes() == b"secret123" {
//!         VerificationOutcome::Matched
//!     } else {
//!         VerificationOutcome::NotMatched
//!     }
//! }));
//! assert_eq!(set.names(), vec!["lookup".to_string()]);
//! ```

mod external;

pub use external::{SevenZip, ToolCommand, Unzip};

use std::path::Path;

use crate::archive_kind::ArchiveKind;
use crate::error::{Error, Result};
use crate::wordlist::Candidate;

/// Result of one `(strategy, candidate)` attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// The candidate opens the archive.
    Matched,
    /// The strategy ran and rejected the candidate.
    NotMatched,
    /// The strategy cannot run on this host or for this archive.
    Unavailable,
    /// The strategy failed (tool crash, unreadable archive, ...).
    Failed(String),
}

impl VerificationOutcome {
    /// Returns `true` for [`VerificationOutcome::Matched`].
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched)
    }
}

/// A method of testing a candidate passphrase against an archive.
pub trait VerificationStrategy: Send {
    /// Short stable name used in logs and reports.
    fn name(&self) -> &str;

    /// Returns whether the strategy can test archives of `kind`.
    fn supports(&self, kind: ArchiveKind) -> bool {
        let _ = kind;
        true
    }

    /// Returns whether the strategy can run on this host.
    fn is_available(&self) -> bool {
        true
    }

    /// Tests `candidate` against the archive at `archive`.
    ///
    /// Must not modify the archive or write extracted data.
    fn attempt(&self, archive: &Path, candidate: &Candidate) -> VerificationOutcome;
}

/// Outcome of running a whole [`StrategySet`] for one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// A strategy accepted the candidate.
    Matched {
        /// Name of the accepting strategy.
        strategy: String,
    },
    /// No strategy accepted the candidate.
    NotMatched {
        /// Number of strategies that failed while testing this candidate.
        failures: u32,
    },
}

/// An ordered collection of verification strategies.
pub struct StrategySet {
    strategies: Vec<Box<dyn VerificationStrategy>>,
    exhaustive: bool,
}

impl Default for StrategySet {
    fn default() -> Self {
        Self::host_default()
    }
}

impl std::fmt::Debug for StrategySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategySet")
            .field("strategies", &self.names())
            .field("exhaustive", &self.exhaustive)
            .finish()
    }
}

impl StrategySet {
    /// Creates a set from strategies in priority order.
    ///
    /// Every strategy is asked before a candidate is rejected.
    pub fn new(strategies: Vec<Box<dyn VerificationStrategy>>) -> Self {
        Self {
            strategies,
            exhaustive: true,
        }
    }

    /// Creates a set with no strategies.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// The bundled tools in their default order: `7z`, then `unzip`.
    pub fn host_default() -> Self {
        Self::empty().with(SevenZip::new()).with(Unzip::new())
    }

    /// Appends a strategy with the lowest priority so far.
    pub fn with(mut self, strategy: impl VerificationStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// Whether lower-priority strategies are still tried after a
    /// `NotMatched` (the default). With `false` the first rejection from a
    /// working strategy is final for that candidate.
    pub fn exhaustive(mut self, exhaustive: bool) -> Self {
        self.exhaustive = exhaustive;
        self
    }

    /// Number of strategies in the set.
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Returns true if the set holds no strategies.
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Strategy names in priority order.
    pub fn names(&self) -> Vec<String> {
        self.strategies.iter().map(|s| s.name().to_string()).collect()
    }

    /// Availability of each strategy for archives of `kind`, in priority order.
    pub fn probe(&self, kind: ArchiveKind) -> Vec<(String, bool)> {
        self.strategies
            .iter()
            .map(|s| (s.name().to_string(), s.supports(kind) && s.is_available()))
            .collect()
    }

    /// Fails with [`Error::NoStrategyAvailable`] unless at least one strategy
    /// can test archives of `kind` on this host.
    pub fn ensure_available(&self, kind: ArchiveKind) -> Result<()> {
        if self.probe(kind).iter().any(|(_, usable)| *usable) {
            Ok(())
        } else {
            Err(Error::NoStrategyAvailable {
                tried: self.names(),
            })
        }
    }

    /// Runs the strategies in order for one candidate.
    pub fn verify(&self, archive: &Path, kind: ArchiveKind, candidate: &Candidate) -> Verdict {
        let mut failures = 0;

        for strategy in &self.strategies {
            if !strategy.supports(kind) {
                log::debug!("{}: skipped, {} archives not supported", strategy.name(), kind);
                continue;
            }

            match strategy.attempt(archive, candidate) {
                VerificationOutcome::Matched => {
                    return Verdict::Matched {
                        strategy: strategy.name().to_string(),
                    };
                }
                VerificationOutcome::NotMatched => {
                    log::trace!(
                        "{}: rejected '{}'",
                        strategy.name(),
                        candidate.to_string_lossy()
                    );
                    if !self.exhaustive {
                        break;
                    }
                }
                VerificationOutcome::Unavailable => {
                    log::debug!("{}: unavailable, falling through", strategy.name());
                }
                VerificationOutcome::Failed(reason) => {
                    failures += 1;
                    log::warn!("{}", Error::strategy(strategy.name(), reason));
                }
            }
        }

        Verdict::NotMatched { failures }
    }
}

/// A strategy backed by a closure.
pub struct FnStrategy<F> {
    name: String,
    callback: F,
}

impl<F> VerificationStrategy for FnStrategy<F>
where
    F: Fn(&Path, &Candidate) -> VerificationOutcome + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn attempt(&self, archive: &Path, candidate: &Candidate) -> VerificationOutcome {
        (self.callback)(archive, candidate)
    }
}

/// Creates a closure-based verification strategy.
pub fn strategy_fn<F>(name: impl Into<String>, callback: F) -> FnStrategy<F>
where
    F: Fn(&Path, &Candidate) -> VerificationOutcome + Send,
{
    FnStrategy {
        name: name.into(),
        callback,
    }
}
