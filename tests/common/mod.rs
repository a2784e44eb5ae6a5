//! Shared test utilities for integration tests.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use wordcrack::progress::ProgressSnapshot;
use wordcrack::strategy::{FnStrategy, VerificationOutcome, strategy_fn};
use wordcrack::{CancelToken, Candidate, StrategySet};

/// Bytes written as the fake archive: a ZIP local header signature.
pub const FAKE_ZIP: &[u8] = b"PK\x03\x04\x14\x00\x01\x00fake-encrypted-entry";

/// A stored (uncompressed) ZIP with a plain `readme.txt` followed by
/// `secret.txt`, whose encryption flag is set when `encrypted` is true.
pub fn stored_zip(encrypted: bool) -> Vec<u8> {
    let entries: [(&[u8], u16); 2] = [
        (b"readme.txt", 0x0000),
        (b"secret.txt", if encrypted { 0x0001 } else { 0x0000 }),
    ];
    let data = b"payload";
    let mut zip = Vec::new();
    let mut central = Vec::new();

    for (name, flags) in entries {
        let offset = zip.len() as u32;

        zip.extend_from_slice(b"PK\x03\x04");
        zip.extend_from_slice(&20u16.to_le_bytes());
        zip.extend_from_slice(&flags.to_le_bytes());
        zip.extend_from_slice(&[0u8; 10]); // method, time, date, crc
        zip.extend_from_slice(&(data.len() as u32).to_le_bytes());
        zip.extend_from_slice(&(data.len() as u32).to_le_bytes());
        zip.extend_from_slice(&(name.len() as u16).to_le_bytes());
        zip.extend_from_slice(&0u16.to_le_bytes());
        zip.extend_from_slice(name);
        zip.extend_from_slice(data);

        central.extend_from_slice(b"PK\x01\x02");
        central.extend_from_slice(&20u16.to_le_bytes());
        central.extend_from_slice(&20u16.to_le_bytes());
        central.extend_from_slice(&flags.to_le_bytes());
        central.extend_from_slice(&[0u8; 10]); // method, time, date, crc
        central.extend_from_slice(&(data.len() as u32).to_le_bytes());
        central.extend_from_slice(&(data.len() as u32).to_le_bytes());
        central.extend_from_slice(&(name.len() as u16).to_le_bytes());
        central.extend_from_slice(&[0u8; 12]); // extra, comment, disk, attributes
        central.extend_from_slice(&offset.to_le_bytes());
        central.extend_from_slice(name);
    }

    let central_offset = zip.len() as u32;
    zip.extend_from_slice(&central);
    zip.extend_from_slice(b"PK\x05\x06");
    zip.extend_from_slice(&[0u8; 4]);
    zip.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    zip.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    zip.extend_from_slice(&(central.len() as u32).to_le_bytes());
    zip.extend_from_slice(&central_offset.to_le_bytes());
    zip.extend_from_slice(&0u16.to_le_bytes());
    zip
}

/// An archive and a wordlist living in a temporary directory.
pub struct Fixture {
    pub dir: TempDir,
    pub archive: PathBuf,
    pub wordlist: PathBuf,
}

impl Fixture {
    /// Writes `lines` (newline-terminated) as the wordlist.
    pub fn new(lines: &[&str]) -> Self {
        let mut contents = lines.join("\n");
        if !lines.is_empty() {
            contents.push('\n');
        }
        Self::with_bytes(contents.as_bytes())
    }

    /// Writes raw wordlist bytes.
    pub fn with_bytes(wordlist: &[u8]) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let archive = dir.path().join("secret.zip");
        let wordlist_path = dir.path().join("words.txt");
        std::fs::write(&archive, FAKE_ZIP).expect("Failed to write archive");
        std::fs::write(&wordlist_path, wordlist).expect("Failed to write wordlist");
        Self {
            dir,
            archive,
            wordlist: wordlist_path,
        }
    }

    /// Path inside the fixture directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// Generates `count` distinct words.
pub fn numbered_words(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("word{:05}", i)).collect()
}

/// A strategy that matches exactly `password`.
pub fn accepts(
    password: &str,
) -> FnStrategy<impl Fn(&Path, &Candidate) -> VerificationOutcome + Send + 'static + use<>> {
    let password = password.to_string();
    strategy_fn("mock", move |_, candidate| {
        if candidate.as_bytes() == password.as_bytes() {
            VerificationOutcome::Matched
        } else {
            VerificationOutcome::NotMatched
        }
    })
}

/// A set holding only [`accepts`].
pub fn password_is(password: &str) -> StrategySet {
    StrategySet::empty().with(accepts(password))
}

/// Shared log of every candidate a strategy saw, in order.
#[derive(Clone, Default)]
pub struct Seen(Arc<Mutex<Vec<String>>>);

impl Seen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn words(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    fn push(&self, word: &str) {
        self.0.lock().unwrap().push(word.to_string());
    }
}

/// A strategy that records candidates and matches `password`, if any.
pub fn recording(
    seen: Seen,
    password: Option<&str>,
) -> FnStrategy<impl Fn(&Path, &Candidate) -> VerificationOutcome + Send + 'static + use<>> {
    let password = password.map(str::to_string);
    strategy_fn("recording", move |_, candidate| {
        seen.push(&candidate.to_string_lossy());
        if password.as_deref().map(str::as_bytes) == Some(candidate.as_bytes()) {
            VerificationOutcome::Matched
        } else {
            VerificationOutcome::NotMatched
        }
    })
}

/// A strategy that rejects everything and cancels `token` on its `n`-th call.
pub fn cancel_on_call(
    n: usize,
    token: CancelToken,
    seen: Seen,
) -> FnStrategy<impl Fn(&Path, &Candidate) -> VerificationOutcome + Send + 'static + use<>> {
    strategy_fn("canceller", move |_, candidate| {
        seen.push(&candidate.to_string_lossy());
        if seen.len() == n {
            token.cancel();
        }
        VerificationOutcome::NotMatched
    })
}

/// Asserts the ordering and range guarantees of an emitted snapshot sequence.
pub fn assert_well_formed(snapshots: &[ProgressSnapshot]) {
    for snapshot in snapshots {
        assert!(
            (0.0..=100.0).contains(&snapshot.percent_complete),
            "percentage out of range: {}",
            snapshot.percent_complete
        );
    }
    for pair in snapshots.windows(2) {
        assert!(
            pair[0].words_tested <= pair[1].words_tested,
            "words_tested decreased: {} -> {}",
            pair[0].words_tested,
            pair[1].words_tested
        );
        assert!(
            pair[0].percent_complete <= pair[1].percent_complete,
            "percentage decreased: {} -> {}",
            pair[0].percent_complete,
            pair[1].percent_complete
        );
    }
}
