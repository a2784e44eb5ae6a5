//! Progress reporting for cracking sessions.
//!
//! This module provides:
//! - [`ProgressSnapshot`], the point-in-time state handed to callers
//! - [`ProgressSink`], the callback trait a caller implements or picks
//! - [`ProgressEstimator`], which computes percentage and ETA and throttles
//!   emission
//!
//! # Throttling
//!
//! A snapshot is emitted when at least [`ThrottleConfig::min_interval`] has
//! passed since the previous one, or when the number of tested words is a
//! multiple of [`ThrottleConfig::every_n`], whichever comes first. Huge
//! wordlists therefore cost one callback per `every_n` words, while slow
//! tools still refresh the display once per interval.
//!
//! # Example
//!
//! ```rust,no_run
//! use wordcrack::CrackSession;
//! use wordcrack::progress::progress_fn;
//!
//! let report = CrackSession::new("secret.zip", "words.txt")
//!     .progress(progress_fn(|snapshot| {
//!         println!("{:.2}% - ETA {}", snapshot.percent_complete, snapshot.format_eta());
//!     }))
//!     .run();
//! println!("found: {:?}", report.password());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crate::wordlist::Candidate;

/// Estimated time remaining.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eta {
    /// No word has been tested yet, so no rate is known.
    Calculating,
    /// Estimated time until the wordlist is exhausted.
    Remaining(Duration),
}

/// One reported point-in-time progress state.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    /// Completion percentage, always within `0.0..=100.0`.
    pub percent_complete: f64,
    /// Candidates tested so far.
    pub words_tested: u64,
    /// Candidates in the wordlist.
    pub total_words: u64,
    /// Time since testing started.
    pub elapsed: Duration,
    /// Estimated time remaining.
    pub eta: Eta,
    /// The candidate most recently tested, cleared in the final snapshot.
    pub current_candidate: Option<String>,
}

impl ProgressSnapshot {
    /// Elapsed time in milliseconds.
    pub fn elapsed_millis(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }

    /// Estimated remaining time in milliseconds, if known.
    pub fn estimated_remaining_millis(&self) -> Option<u64> {
        match self.eta {
            Eta::Calculating => None,
            Eta::Remaining(remaining) => {
                Some(u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX))
            }
        }
    }

    /// Test rate in words per second.
    pub fn words_per_second(&self) -> f64 {
        let elapsed = self.elapsed.as_secs_f64();
        if elapsed < 0.001 {
            0.0
        } else {
            self.words_tested as f64 / elapsed
        }
    }

    /// Formats the ETA as a human-readable string.
    pub fn format_eta(&self) -> String {
        match self.eta {
            Eta::Calculating => "calculating".to_string(),
            Eta::Remaining(remaining) => format_duration(remaining),
        }
    }
}

/// Receiver of progress snapshots.
///
/// Called from the session's worker thread; implementations must return
/// quickly, handing slow work off to another thread (see the channel impls).
pub trait ProgressSink: Send {
    /// Called once, before testing starts, with the number of candidates.
    fn on_total(&mut self, total_words: u64) {
        let _ = total_words;
    }

    /// Called for every emitted snapshot, in non-decreasing `words_tested`
    /// order.
    fn on_progress(&mut self, snapshot: &ProgressSnapshot);
}

/// A progress sink that does nothing (null object pattern).
#[derive(Debug, Default, Clone)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&mut self, _snapshot: &ProgressSnapshot) {}
}

/// A progress sink that records every snapshot.
///
/// Clones share the same storage, so a clone kept by the caller can inspect
/// what the session emitted.
#[derive(Debug, Default, Clone)]
pub struct CollectingProgress {
    inner: Arc<std::sync::Mutex<Collected>>,
}

#[derive(Debug, Default)]
struct Collected {
    total: Option<u64>,
    snapshots: Vec<ProgressSnapshot>,
}

impl CollectingProgress {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the snapshots received so far.
    pub fn snapshots(&self) -> Vec<ProgressSnapshot> {
        self.lock().snapshots.clone()
    }

    /// Returns the total reported through [`ProgressSink::on_total`].
    pub fn total(&self) -> Option<u64> {
        self.lock().total
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Collected> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ProgressSink for CollectingProgress {
    fn on_total(&mut self, total_words: u64) {
        self.lock().total = Some(total_words);
    }

    fn on_progress(&mut self, snapshot: &ProgressSnapshot) {
        self.lock().snapshots.push(snapshot.clone());
    }
}

/// Lock-free progress counters that another thread can poll.
#[derive(Debug, Default)]
pub struct AtomicProgress {
    words_tested: AtomicU64,
    total_words: AtomicU64,
}

impl AtomicProgress {
    /// Creates a shared atomic progress tracker.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Candidates tested as of the last emitted snapshot.
    pub fn words_tested(&self) -> u64 {
        self.words_tested.load(Ordering::Relaxed)
    }

    /// Candidates in the wordlist.
    pub fn total_words(&self) -> u64 {
        self.total_words.load(Ordering::Relaxed)
    }

    /// Completion percentage (0.0 - 100.0).
    pub fn percentage(&self) -> f64 {
        percent_complete(self.words_tested(), self.total_words())
    }
}

impl ProgressSink for Arc<AtomicProgress> {
    fn on_total(&mut self, total_words: u64) {
        self.total_words.store(total_words, Ordering::Relaxed);
    }

    fn on_progress(&mut self, snapshot: &ProgressSnapshot) {
        self.words_tested
            .store(snapshot.words_tested, Ordering::Relaxed);
    }
}

/// Forwards snapshots over an unbounded channel; never blocks.
impl ProgressSink for mpsc::Sender<ProgressSnapshot> {
    fn on_progress(&mut self, snapshot: &ProgressSnapshot) {
        // A dropped receiver only means nobody is watching.
        let _ = self.send(snapshot.clone());
    }
}

/// Forwards snapshots over a bounded channel, dropping them when it is full.
impl ProgressSink for mpsc::SyncSender<ProgressSnapshot> {
    fn on_progress(&mut self, snapshot: &ProgressSnapshot) {
        let _ = self.try_send(snapshot.clone());
    }
}

#[cfg(feature = "async")]
impl ProgressSink for tokio::sync::mpsc::UnboundedSender<ProgressSnapshot> {
    fn on_progress(&mut self, snapshot: &ProgressSnapshot) {
        let _ = self.send(snapshot.clone());
    }
}

/// A progress sink that calls a closure.
pub struct ClosureProgress<F> {
    callback: F,
}

impl<F> ProgressSink for ClosureProgress<F>
where
    F: FnMut(&ProgressSnapshot) + Send,
{
    fn on_progress(&mut self, snapshot: &ProgressSnapshot) {
        (self.callback)(snapshot)
    }
}

/// Creates a closure-based progress sink.
pub fn progress_fn<F>(f: F) -> ClosureProgress<F>
where
    F: FnMut(&ProgressSnapshot) + Send,
{
    ClosureProgress { callback: f }
}

/// Emission rate limits for progress snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleConfig {
    /// Minimum wall-clock time between two snapshots.
    pub min_interval: Duration,
    /// Emit whenever the tested-word count is a multiple of this (0 disables).
    pub every_n: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_secs(1),
            every_n: 1000,
        }
    }
}

impl ThrottleConfig {
    /// Creates the default throttle (1 second or 1000 words).
    pub fn new() -> Self {
        Self::default()
    }

    /// A throttle that lets every update through.
    pub fn unthrottled() -> Self {
        Self {
            min_interval: Duration::ZERO,
            every_n: 1,
        }
    }

    /// Sets the minimum interval between snapshots.
    pub fn min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    /// Sets the word-count interval.
    pub fn every_n(mut self, every_n: u64) -> Self {
        self.every_n = every_n;
        self
    }
}

/// Computes percentage and ETA, and decides when to emit.
#[derive(Debug, Clone)]
pub struct ProgressEstimator {
    start: Instant,
    last_emit: Instant,
    throttle: ThrottleConfig,
}

impl ProgressEstimator {
    /// Creates an estimator whose clock starts now.
    pub fn new(throttle: ThrottleConfig) -> Self {
        Self::started_at(Instant::now(), throttle)
    }

    /// Creates an estimator whose clock started at `start`.
    pub fn started_at(start: Instant, throttle: ThrottleConfig) -> Self {
        Self {
            start,
            last_emit: start,
            throttle,
        }
    }

    /// Time since the estimator started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Builds a snapshot without consulting the throttle.
    pub fn snapshot(
        &self,
        words_tested: u64,
        total_words: u64,
        current: Option<&Candidate>,
    ) -> ProgressSnapshot {
        let elapsed = self.start.elapsed();
        let percent = percent_complete(words_tested, total_words);
        ProgressSnapshot {
            percent_complete: percent,
            words_tested,
            total_words,
            elapsed,
            eta: estimate_remaining(elapsed, percent),
            current_candidate: current.map(|c| c.to_string_lossy().into_owned()),
        }
    }

    /// The snapshot emitted before the first candidate is tested.
    pub fn initial(&mut self, total_words: u64) -> ProgressSnapshot {
        self.last_emit = Instant::now();
        let mut snapshot = self.snapshot(0, total_words, None);
        snapshot.eta = Eta::Calculating;
        snapshot
    }

    /// Returns a snapshot if the throttle allows one for this update.
    pub fn update(
        &mut self,
        words_tested: u64,
        total_words: u64,
        current: Option<&Candidate>,
    ) -> Option<ProgressSnapshot> {
        let now = Instant::now();
        if !self.should_emit(now, words_tested) {
            return None;
        }
        self.last_emit = now;
        Some(self.snapshot(words_tested, total_words, current))
    }

    /// The snapshot emitted when the session terminates.
    ///
    /// With `complete` set (match or exhaustion) the percentage is forced to
    /// 100; otherwise the real percentage is kept. The current candidate is
    /// cleared and the remaining time is zero either way.
    pub fn finish(&mut self, words_tested: u64, total_words: u64, complete: bool) -> ProgressSnapshot {
        self.last_emit = Instant::now();
        let mut snapshot = self.snapshot(words_tested, total_words, None);
        if complete {
            snapshot.percent_complete = 100.0;
        }
        snapshot.eta = Eta::Remaining(Duration::ZERO);
        snapshot
    }

    fn should_emit(&self, now: Instant, words_tested: u64) -> bool {
        let by_count = self.throttle.every_n > 0 && words_tested % self.throttle.every_n == 0;
        let by_time = now.duration_since(self.last_emit) >= self.throttle.min_interval;
        by_count || by_time
    }
}

/// Percentage of `total` covered by `tested`, clamped to `0.0..=100.0`.
///
/// An unknown or empty total (`0`) yields `0.0`.
pub fn percent_complete(tested: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        ((tested as f64 / total as f64) * 100.0).clamp(0.0, 100.0)
    }
}

/// Extrapolates the remaining time from elapsed time and percentage.
///
/// `total = elapsed / percent * 100`, `remaining = total - elapsed`.
/// Undefined until some progress has been made.
pub fn estimate_remaining(elapsed: Duration, percent: f64) -> Eta {
    if percent <= 0.0 || !percent.is_finite() {
        return Eta::Calculating;
    }
    let elapsed_secs = elapsed.as_secs_f64();
    let estimated_total = elapsed_secs / percent * 100.0;
    let remaining = (estimated_total - elapsed_secs).max(0.0);
    // Saturates for vanishingly small percentages
    Eta::Remaining(Duration::try_from_secs_f64(remaining).unwrap_or(Duration::MAX))
}

/// Formats a duration as a human-readable string.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_throttle() -> ThrottleConfig {
        ThrottleConfig::new()
            .min_interval(Duration::from_secs(3600))
            .every_n(0)
    }

    #[test]
    fn test_percent_complete() {
        assert_eq!(percent_complete(0, 0), 0.0);
        assert_eq!(percent_complete(5, 0), 0.0);
        assert!((percent_complete(25, 100) - 25.0).abs() < 0.001);
        assert_eq!(percent_complete(150, 100), 100.0);
    }

    #[test]
    fn test_estimate_remaining() {
        assert_eq!(estimate_remaining(Duration::from_secs(10), 0.0), Eta::Calculating);
        assert_eq!(
            estimate_remaining(Duration::from_secs(10), 25.0),
            Eta::Remaining(Duration::from_secs(30))
        );
        assert_eq!(
            estimate_remaining(Duration::from_secs(10), 100.0),
            Eta::Remaining(Duration::ZERO)
        );
    }

    #[test]
    fn test_count_based_throttle() {
        let mut estimator = ProgressEstimator::new(quiet_throttle().every_n(3));
        let emitted: Vec<u64> = (1..=10)
            .filter_map(|n| estimator.update(n, 10, None))
            .map(|s| s.words_tested)
            .collect();
        assert_eq!(emitted, vec![3, 6, 9]);
    }

    #[test]
    fn test_time_based_throttle() {
        let throttle = ThrottleConfig::new()
            .min_interval(Duration::from_millis(10))
            .every_n(0);
        let mut estimator = ProgressEstimator::new(throttle);
        estimator.initial(100);

        // Should be throttled
        assert!(estimator.update(1, 100, None).is_none());

        // Wait and should pass through
        std::thread::sleep(Duration::from_millis(15));
        assert!(estimator.update(2, 100, None).is_some());
        assert!(estimator.update(3, 100, None).is_none());
    }

    #[test]
    fn test_unthrottled_emits_every_update() {
        let mut estimator = ProgressEstimator::new(ThrottleConfig::unthrottled());
        assert!((1..=5).all(|n| estimator.update(n, 5, None).is_some()));
    }

    #[test]
    fn test_initial_snapshot_is_calculating() {
        let mut estimator = ProgressEstimator::new(ThrottleConfig::default());
        let snapshot = estimator.initial(42);
        assert_eq!(snapshot.words_tested, 0);
        assert_eq!(snapshot.total_words, 42);
        assert_eq!(snapshot.eta, Eta::Calculating);
        assert_eq!(snapshot.estimated_remaining_millis(), None);
        assert_eq!(snapshot.format_eta(), "calculating");
    }

    #[test]
    fn test_finish_forces_completion() {
        let mut estimator = ProgressEstimator::new(ThrottleConfig::default());
        let done = estimator.finish(3, 10, true);
        assert_eq!(done.percent_complete, 100.0);
        assert_eq!(done.eta, Eta::Remaining(Duration::ZERO));
        assert!(done.current_candidate.is_none());

        let partial = estimator.finish(3, 10, false);
        assert!((partial.percent_complete - 30.0).abs() < 0.001);
        assert_eq!(partial.eta, Eta::Remaining(Duration::ZERO));
    }

    #[test]
    fn test_snapshot_carries_candidate() {
        let estimator = ProgressEstimator::new(ThrottleConfig::default());
        let candidate = Candidate::new("banana").unwrap();
        let snapshot = estimator.snapshot(2, 4, Some(&candidate));
        assert_eq!(snapshot.current_candidate.as_deref(), Some("banana"));
        assert!((snapshot.percent_complete - 50.0).abs() < 0.001);
    }

    #[test]
    fn test_collecting_progress_shares_storage() {
        let collector = CollectingProgress::new();
        let mut sink = collector.clone();
        sink.on_total(10);
        let estimator = ProgressEstimator::new(ThrottleConfig::default());
        sink.on_progress(&estimator.snapshot(1, 10, None));

        assert_eq!(collector.total(), Some(10));
        assert_eq!(collector.snapshots().len(), 1);
    }

    #[test]
    fn test_atomic_progress() {
        let progress = AtomicProgress::shared();
        let mut sink: Arc<AtomicProgress> = Arc::clone(&progress);
        let estimator = ProgressEstimator::new(ThrottleConfig::default());

        sink.on_total(1000);
        sink.on_progress(&estimator.snapshot(500, 1000, None));

        assert_eq!(progress.total_words(), 1000);
        assert_eq!(progress.words_tested(), 500);
        assert!((progress.percentage() - 50.0).abs() < 0.001);
    }

    #[test]
    fn test_channel_sink_survives_dropped_receiver() {
        let (mut tx, rx) = mpsc::channel::<ProgressSnapshot>();
        let estimator = ProgressEstimator::new(ThrottleConfig::default());
        tx.on_progress(&estimator.snapshot(1, 2, None));
        assert_eq!(rx.recv().unwrap().words_tested, 1);

        drop(rx);
        tx.on_progress(&estimator.snapshot(2, 2, None));
    }

    #[test]
    fn test_closure_progress() {
        let mut count = 0;
        {
            let mut progress = progress_fn(|_snapshot: &ProgressSnapshot| count += 1);
            let estimator = ProgressEstimator::new(ThrottleConfig::default());
            progress.on_progress(&estimator.snapshot(1, 2, None));
            progress.on_progress(&estimator.snapshot(2, 2, None));
        }
        assert_eq!(count, 2);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(45)), "45s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_secs(3700)), "1h 1m");
    }

    #[test]
    fn test_words_per_second() {
        let snapshot = ProgressSnapshot {
            percent_complete: 50.0,
            words_tested: 200,
            total_words: 400,
            elapsed: Duration::from_secs(2),
            eta: Eta::Remaining(Duration::from_secs(2)),
            current_candidate: None,
        };
        assert!((snapshot.words_per_second() - 100.0).abs() < 0.001);
        assert_eq!(snapshot.elapsed_millis(), 2000);
    }
}
