//! Archive format detection and ZIP encryption checks.
//!
//! [`ArchiveKind::sniff`] looks at the leading signature bytes only.
//! [`zip_encryption`] reads the ZIP central directory (falling back to the
//! first local header) to tell whether there is anything to crack at all: an
//! archive without encrypted entries passes `7z t` and `unzip -t` with any
//! password.

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::READ_BUFFER_SIZE;

/// 7z signature: `'7' 'z' 0xBC 0xAF 0x27 0x1C`.
pub const SEVEN_ZIP_SIGNATURE: [u8; 6] = [0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C];

/// ZIP local file header, end of central directory, and spanning markers.
const ZIP_SIGNATURES: [[u8; 4]; 3] = [
    [0x50, 0x4B, 0x03, 0x04],
    [0x50, 0x4B, 0x05, 0x06],
    [0x50, 0x4B, 0x07, 0x08],
];

/// ZIP central directory file header signature.
const CENTRAL_HEADER_SIGNATURE: [u8; 4] = [0x50, 0x4B, 0x01, 0x02];

/// Fixed part of a central directory file header.
const CENTRAL_HEADER_LEN: usize = 46;

/// Fixed part of the end of central directory record.
const END_OF_CENTRAL_DIR_LEN: usize = 22;

/// Largest archive comment, which may follow the end of central directory.
const MAX_COMMENT_LEN: usize = u16::MAX as usize;

/// General purpose bit 0: the entry is encrypted.
const FLAG_ENCRYPTED: u16 = 0x0001;

/// Container format of the archive under attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    /// PKZIP archive (`.zip`).
    Zip,
    /// 7-Zip archive (`.7z`).
    SevenZip,
    /// Anything else; external tools may still recognise it.
    Unknown,
}

impl ArchiveKind {
    /// Classifies a buffer holding the first bytes of an archive.
    pub fn from_signature(header: &[u8]) -> Self {
        if header.starts_with(&SEVEN_ZIP_SIGNATURE) {
            Self::SevenZip
        } else if ZIP_SIGNATURES.iter().any(|sig| header.starts_with(sig)) {
            Self::Zip
        } else {
            Self::Unknown
        }
    }

    /// Reads at most the signature bytes of `path` and classifies them.
    pub fn sniff(path: impl AsRef<Path>) -> io::Result<Self> {
        let mut header = [0u8; SEVEN_ZIP_SIGNATURE.len()];
        let mut file = File::open(path.as_ref())?;
        let filled = read_up_to(&mut file, &mut header)?;
        Ok(Self::from_signature(&header[..filled]))
    }
}

/// Whether a ZIP archive has anything to crack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZipEncryption {
    /// At least one entry is encrypted.
    Encrypted,
    /// No entry is encrypted; every password "opens" the archive.
    Unencrypted,
    /// The headers could not be read (ZIP64, prefixed or damaged archives).
    Unknown,
}

/// Checks the entry flags of the ZIP archive at `path`.
///
/// Every central directory header is inspected, so an encrypted entry after
/// unencrypted ones (directories, readme files) is still found. Without a
/// usable central directory only the first local header is checked, which
/// can prove encryption but never its absence.
pub fn zip_encryption(path: impl AsRef<Path>) -> io::Result<ZipEncryption> {
    let mut file = File::open(path.as_ref())?;
    let len = file.metadata()?.len();

    if let Some(status) = scan_central_directory(&mut file, len)? {
        return Ok(status);
    }

    file.seek(SeekFrom::Start(0))?;
    let mut header = [0u8; 8];
    let filled = read_up_to(&mut file, &mut header)?;
    if filled == header.len()
        && header[..4] == ZIP_SIGNATURES[0]
        && le_u16(&header, 6) & FLAG_ENCRYPTED != 0
    {
        Ok(ZipEncryption::Encrypted)
    } else {
        Ok(ZipEncryption::Unknown)
    }
}

/// Returns `None` when no usable central directory is found.
fn scan_central_directory(file: &mut File, len: u64) -> io::Result<Option<ZipEncryption>> {
    let tail_len = len.min((END_OF_CENTRAL_DIR_LEN + MAX_COMMENT_LEN) as u64) as usize;
    if tail_len < END_OF_CENTRAL_DIR_LEN {
        return Ok(None);
    }
    file.seek(SeekFrom::Start(len - tail_len as u64))?;
    let mut tail = vec![0u8; tail_len];
    file.read_exact(&mut tail)?;

    let Some(start) = (0..=tail_len - END_OF_CENTRAL_DIR_LEN)
        .rev()
        .find(|&i| tail[i..i + 4] == ZIP_SIGNATURES[1])
    else {
        return Ok(None);
    };
    let record = &tail[start..start + END_OF_CENTRAL_DIR_LEN];
    let entries = le_u16(record, 10);
    let offset = le_u32(record, 16);

    // ZIP64 moves the real values elsewhere
    if entries == u16::MAX || offset == u32::MAX {
        return Ok(None);
    }
    if entries == 0 {
        return Ok(Some(ZipEncryption::Unencrypted));
    }
    if u64::from(offset) >= len {
        return Ok(None);
    }

    file.seek(SeekFrom::Start(u64::from(offset)))?;
    let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
    let mut header = [0u8; CENTRAL_HEADER_LEN];
    for _ in 0..entries {
        let filled = read_up_to(&mut reader, &mut header)?;
        if filled < CENTRAL_HEADER_LEN || header[..4] != CENTRAL_HEADER_SIGNATURE {
            return Ok(None);
        }
        if le_u16(&header, 8) & FLAG_ENCRYPTED != 0 {
            return Ok(Some(ZipEncryption::Encrypted));
        }
        let variable = i64::from(le_u16(&header, 28))
            + i64::from(le_u16(&header, 30))
            + i64::from(le_u16(&header, 32));
        reader.seek_relative(variable)?;
    }
    Ok(Some(ZipEncryption::Unencrypted))
}

/// Fills `buf` as far as the reader allows, returning the bytes read.
fn read_up_to(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn le_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

fn le_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

impl std::fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Zip => write!(f, "zip"),
            Self::SevenZip => write!(f, "7z"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}
