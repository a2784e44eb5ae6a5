//! Fuzz target for LineStream with arbitrary wordlist bytes.
//!
//! Exercises line splitting, CRLF stripping, the line length cap and
//! candidate trimming with adversarial input.
//!
//! Run with: cargo +nightly fuzz run line_stream
//!
//! Invariants checked:
//! - streaming never fails on in-memory input
//! - candidates are non-empty, already trimmed and within the length cap
//! - raw line count equals the number of lines streamed

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;
use wordcrack::wordlist::{Candidate, LineStream, MAX_LINE_LEN, count_lines_from};

fuzz_target!(|data: &[u8]| {
    let mut stream = LineStream::new(Cursor::new(data));
    let mut candidates = 0u64;
    while let Some(candidate) = stream.next_candidate().expect("in-memory read failed") {
        assert!(!candidate.is_empty());
        assert!(candidate.len() <= MAX_LINE_LEN);
        assert_eq!(Candidate::from_bytes(candidate.as_bytes()).as_ref(), Some(&candidate));
        candidates += 1;
    }

    let lines = count_lines_from(Cursor::new(data)).expect("in-memory count failed");
    assert_eq!(lines, stream.lines_read());
    assert!(candidates <= lines);
});
