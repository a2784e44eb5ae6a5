//! Streaming access to wordlists.
//!
//! Wordlists are read lazily, one line at a time, through a bounded buffer:
//! neither [`count_lines`] nor [`LineStream`] ever holds the whole file in
//! memory, so multi-gigabyte lists cost the same resident memory as tiny ones.
//!
//! # Line Handling
//!
//! - Lines are split on `\n`; a trailing `\r` is removed (CRLF lists).
//! - Lines longer than [`MAX_LINE_LEN`] bytes are skipped with a warning.
//! - A [`Candidate`] keeps the exact bytes of its line, so Latin-1 or other
//!   non-UTF-8 passwords reach the verification tools unchanged. Surrounding
//!   whitespace is trimmed; blank and whitespace-only lines never become
//!   candidates.
//! - [`LineStream::next_line`] is the text view: invalid UTF-8 is replaced
//!   with `U+FFFD`.
//!
//! # Example
//!
//! ```rust,no_run
//! use wordcrack::wordlist::Wordlist;
//!
//! # fn main() -> wordcrack::Result<()> {
//! let mut wordlist = Wordlist::open("rockyou.txt")?;
//! println!("{} candidates", wordlist.total_candidates()?);
//!
//! let mut stream = wordlist.stream()?;
//! while let Some(candidate) = stream.next_candidate()? {
//!     println!("{}", candidate.to_string_lossy());
//! }
//! # Ok(())
//! # }
//! ```

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use zeroize::Zeroizing;

use crate::READ_BUFFER_SIZE;
use crate::error::{Error, InputRole, Result};

/// Longest wordlist line, in bytes, that is still considered a candidate.
pub const MAX_LINE_LEN: usize = 8 * 1024;

/// A single candidate passphrase taken from a wordlist.
///
/// The bytes are trimmed and never empty. They are wiped from memory on drop
/// and are not shown by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Candidate {
    bytes: Zeroizing<Vec<u8>>,
}

impl Candidate {
    /// Creates a candidate from text.
    ///
    /// Returns `None` when the text is empty or whitespace-only.
    pub fn new(text: &str) -> Option<Self> {
        Self::from_bytes(text.as_bytes())
    }

    /// Creates a candidate from raw line bytes, which need not be UTF-8.
    ///
    /// UTF-8 input is trimmed of Unicode whitespace, anything else of ASCII
    /// whitespace. Returns `None` when nothing is left.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let trimmed = match std::str::from_utf8(bytes) {
            Ok(text) => text.trim().as_bytes(),
            Err(_) => bytes.trim_ascii(),
        };
        if trimmed.is_empty() {
            None
        } else {
            Some(Self {
                bytes: Zeroizing::new(trimmed.to_vec()),
            })
        }
    }

    /// The exact candidate bytes, as handed to verification tools.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The candidate as text, if it is valid UTF-8.
    pub fn to_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }

    /// Returns whether the candidate is valid UTF-8.
    pub fn is_utf8(&self) -> bool {
        self.to_str().is_some()
    }

    /// The candidate for display, with invalid UTF-8 replaced by `U+FFFD`.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    /// Returns the candidate length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always `false`; candidates are never empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Candidate")
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A lazy, forward-only stream of wordlist lines.
///
/// The stream cannot be rewound; open a new one to start over.
pub struct LineStream<R> {
    reader: R,
    buf: Zeroizing<Vec<u8>>,
    lines_read: u64,
    non_utf8_lines: u64,
    oversized_lines: u64,
}

impl LineStream<BufReader<File>> {
    /// Opens a wordlist file for streaming.
    ///
    /// Fails with an I/O error of kind [`io::ErrorKind::NotFound`] when the
    /// path does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(BufReader::with_capacity(READ_BUFFER_SIZE, file)))
    }
}

impl<R: BufRead> LineStream<R> {
    /// Wraps a buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            // Never grows past MAX_LINE_LEN, so no unwiped reallocations
            buf: Zeroizing::new(Vec::with_capacity(MAX_LINE_LEN)),
            lines_read: 0,
            non_utf8_lines: 0,
            oversized_lines: 0,
        }
    }

    /// Returns the next raw line as text, or `None` at end of stream.
    ///
    /// The line terminator and a preceding `\r` are stripped; whitespace is
    /// otherwise preserved. Invalid UTF-8 is replaced with `U+FFFD`.
    pub fn next_line(&mut self) -> Result<Option<String>> {
        if !self.fill_line()? {
            return Ok(None);
        }
        let line = match std::str::from_utf8(&self.buf) {
            Ok(text) => text.to_owned(),
            Err(_) => {
                self.note_non_utf8();
                String::from_utf8_lossy(&self.buf).into_owned()
            }
        };
        Ok(Some(line))
    }

    /// Returns the next non-blank line as a candidate, skipping blank lines.
    ///
    /// The candidate keeps the line's bytes as they are in the file.
    pub fn next_candidate(&mut self) -> Result<Option<Candidate>> {
        while self.fill_line()? {
            if let Some(candidate) = Candidate::from_bytes(&self.buf) {
                if !candidate.is_utf8() {
                    self.note_non_utf8();
                }
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    /// Number of raw lines consumed so far, blank and skipped lines included.
    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    /// Number of lines that were not valid UTF-8.
    pub fn non_utf8_lines(&self) -> u64 {
        self.non_utf8_lines
    }

    /// Number of lines skipped for exceeding [`MAX_LINE_LEN`].
    pub fn oversized_lines(&self) -> u64 {
        self.oversized_lines
    }

    /// Reads the next line into `buf` without its terminator.
    ///
    /// Returns `false` at end of stream. Over-long lines are consumed without
    /// being buffered and skipped.
    fn fill_line(&mut self) -> Result<bool> {
        loop {
            self.buf.clear();
            let mut any = false;
            let mut oversized = false;

            loop {
                let (used, done) = {
                    let available = match self.reader.fill_buf() {
                        Ok(chunk) => chunk,
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                        Err(e) => return Err(Error::Io(e)),
                    };
                    if available.is_empty() {
                        break;
                    }
                    any = true;

                    let (part, used, done) = match available.iter().position(|&b| b == b'\n') {
                        Some(end) => (&available[..end], end + 1, true),
                        None => (available, available.len(), false),
                    };
                    if !oversized {
                        if self.buf.len() + part.len() > MAX_LINE_LEN {
                            oversized = true;
                            self.buf.clear();
                        } else {
                            self.buf.extend_from_slice(part);
                        }
                    }
                    (used, done)
                };
                self.reader.consume(used);
                if done {
                    break;
                }
            }

            if !any {
                return Ok(false);
            }
            self.lines_read += 1;

            if oversized {
                self.oversized_lines += 1;
                log::warn!(
                    "wordlist line {} is longer than {} bytes, skipped",
                    self.lines_read,
                    MAX_LINE_LEN
                );
                continue;
            }
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
            return Ok(true);
        }
    }

    fn note_non_utf8(&mut self) {
        self.non_utf8_lines += 1;
        if self.non_utf8_lines == 1 {
            log::warn!(
                "wordlist line {} is not valid UTF-8, its raw bytes are tested",
                self.lines_read
            );
        } else {
            log::debug!("wordlist line {} is not valid UTF-8", self.lines_read);
        }
    }
}

impl<R: BufRead> Iterator for LineStream<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}

/// Counts raw lines in a file without loading it.
///
/// Every `\n` terminates a line; a final line without a terminator also
/// counts. Blank lines count. An empty file has zero lines.
pub fn count_lines(path: impl AsRef<Path>) -> Result<u64> {
    let file = File::open(path.as_ref())?;
    count_lines_from(file)
}

/// Counts raw lines from any reader. See [`count_lines`].
pub fn count_lines_from(reader: impl Read) -> Result<u64> {
    let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, reader);
    let mut count = 0u64;
    let mut last = None;

    loop {
        let chunk = match reader.fill_buf() {
            Ok(chunk) => chunk,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::Io(e)),
        };
        if chunk.is_empty() {
            break;
        }
        count += chunk.iter().filter(|&&b| b == b'\n').count() as u64;
        last = chunk.last().copied();
        let len = chunk.len();
        reader.consume(len);
    }

    if matches!(last, Some(b) if b != b'\n') {
        count += 1;
    }
    Ok(count)
}

/// Counts the lines of a file that would yield a [`Candidate`].
pub fn count_candidates(path: impl AsRef<Path>) -> Result<u64> {
    let mut stream = LineStream::open(path)?;
    let mut count = 0u64;
    while stream.next_candidate()?.is_some() {
        count += 1;
    }
    Ok(count)
}

/// A validated wordlist path with a cached candidate count.
#[derive(Debug, Clone)]
pub struct Wordlist {
    path: PathBuf,
    total: Option<u64>,
}

impl Wordlist {
    /// Validates that `path` is a readable regular file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        check_readable_file(InputRole::Wordlist, path)?;
        Ok(Self {
            path: path.to_path_buf(),
            total: None,
        })
    }

    /// Returns the wordlist path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of candidates, counting them on first use.
    pub fn total_candidates(&mut self) -> Result<u64> {
        match self.total {
            Some(total) => Ok(total),
            None => self.recount(),
        }
    }

    /// Recounts the candidates, replacing the cached value.
    pub fn recount(&mut self) -> Result<u64> {
        let total = count_candidates(&self.path)?;
        self.total = Some(total);
        Ok(total)
    }

    /// Returns the cached candidate count without touching the file.
    pub fn cached_total(&self) -> Option<u64> {
        self.total
    }

    /// Opens a fresh stream over the wordlist.
    pub fn stream(&self) -> Result<LineStream<BufReader<File>>> {
        LineStream::open(&self.path)
    }
}

/// Checks that `path` names a regular file that can be opened for reading.
pub(crate) fn check_readable_file(role: InputRole, path: &Path) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        let reason = match e.kind() {
            io::ErrorKind::NotFound => "file not found".to_string(),
            _ => e.to_string(),
        };
        Error::invalid_input(role, path, reason)
    })?;
    if !metadata.is_file() {
        return Err(Error::invalid_input(role, path, "not a regular file"));
    }
    File::open(path).map_err(|e| Error::invalid_input(role, path, e.to_string()))?;
    Ok(())
}
