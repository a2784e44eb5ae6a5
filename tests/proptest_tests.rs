//! Property-based tests using proptest.
//!
//! These tests verify counting, ordering and progress invariants of the
//! session using randomly generated wordlists.

use std::io::Cursor;
use std::time::Duration;

use proptest::prelude::*;
use wordcrack::progress::{Eta, ThrottleConfig, estimate_remaining, percent_complete};
use wordcrack::wordlist::{LineStream, count_lines_from};
use wordcrack::{CollectingProgress, CrackSession, Outcome, SessionOptions};

mod common;
use common::{Fixture, assert_well_formed, password_is};

/// Wordlist lines: mostly words, some blank or whitespace-only.
fn line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-z0-9]{1,12}",
        1 => Just(String::new()),
        1 => "[ \t]{1,3}",
    ]
}

fn wordlist_strategy() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(line_strategy(), 0..60)
}

fn candidates_of(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

fn fixture_for(lines: &[String]) -> Fixture {
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    Fixture::new(&refs)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Without the password in the list, every candidate is tested once.
    #[test]
    fn exhaustion_tests_every_candidate(lines in wordlist_strategy()) {
        let fixture = fixture_for(&lines);
        let expected = candidates_of(&lines).len() as u64;

        let report = CrackSession::new(&fixture.archive, &fixture.wordlist)
            .strategies(password_is("UPPERCASE-NEVER-GENERATED"))
            .run();

        prop_assert_eq!(report.outcome(), Outcome::Exhausted);
        prop_assert_eq!(report.tested_words(), expected);
        prop_assert_eq!(report.total_words(), expected);
        prop_assert!(report.password().is_none());
    }

    /// A match stops the session at the first occurrence of the password.
    #[test]
    fn match_stops_at_first_occurrence(
        lines in wordlist_strategy().prop_filter("needs a candidate", |l| !candidates_of(l).is_empty()),
        pick in any::<prop::sample::Index>(),
    ) {
        let candidates = candidates_of(&lines);
        let password = candidates[pick.index(candidates.len())].clone();
        let first = candidates.iter().position(|c| *c == password).unwrap();
        let fixture = fixture_for(&lines);

        let report = CrackSession::new(&fixture.archive, &fixture.wordlist)
            .strategies(password_is(&password))
            .run();

        prop_assert!(report.success());
        prop_assert_eq!(report.password(), Some(password.as_str()));
        prop_assert_eq!(report.tested_words(), first as u64 + 1);
    }

    /// Emitted snapshots never go backwards and stay within 0..=100.
    #[test]
    fn snapshots_are_monotonic(
        lines in wordlist_strategy(),
        every_n in 0u64..10,
    ) {
        let fixture = fixture_for(&lines);
        let collector = CollectingProgress::new();
        let throttle = ThrottleConfig::new()
            .min_interval(Duration::from_secs(3600))
            .every_n(every_n);

        let _ = CrackSession::new(&fixture.archive, &fixture.wordlist)
            .strategies(password_is("UPPERCASE-NEVER-GENERATED"))
            .progress(collector.clone())
            .options(SessionOptions::new().throttle(throttle))
            .run();

        let snapshots = collector.snapshots();
        assert_well_formed(&snapshots);
        prop_assert!(snapshots.len() >= 2);
        prop_assert_eq!(snapshots.last().unwrap().percent_complete, 100.0);
    }

    /// Raw line counting agrees with splitting the same bytes.
    #[test]
    fn count_lines_matches_stream(data in proptest::collection::vec(any::<u8>(), 0..2048)) {
        let counted = count_lines_from(Cursor::new(&data)).unwrap();
        let streamed = LineStream::new(Cursor::new(data.clone())).count() as u64;
        prop_assert_eq!(counted, streamed);
    }

    /// Percentages are clamped to 0..=100 for any input.
    #[test]
    fn percent_complete_in_range(tested in any::<u64>(), total in any::<u64>()) {
        let percent = percent_complete(tested, total);
        prop_assert!((0.0..=100.0).contains(&percent));
    }

    /// The ETA is never negative and is undefined only at 0%.
    #[test]
    fn eta_is_non_negative(elapsed_ms in 0u64..10_000_000, percent in 0.0f64..=100.0) {
        let eta = estimate_remaining(Duration::from_millis(elapsed_ms), percent);
        if percent > 0.0 {
            prop_assert!(matches!(eta, Eta::Remaining(_)));
        } else {
            prop_assert_eq!(eta, Eta::Calculating);
        }
    }
}
