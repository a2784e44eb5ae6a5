//! Test-mode backends driving host archive tools.
//!
//! Both backends run one child process per candidate with stdin closed, so a
//! tool can never block waiting for an interactive password prompt. On Unix
//! each child gets its own process group, so a terminal Ctrl+C reaches only
//! this process and cancellation stays in its hands. Candidate bytes are
//! passed through unchanged on Unix.
//!
//! | Strategy | Command | Formats |
//! |----------|---------|---------|
//! | [`SevenZip`] | `7z t -p<candidate> -y -bso0 -bsp0 <archive>` | any |
//! | [`Unzip`] | `unzip -qq -t -P <candidate> <archive>` | ZIP and unrecognised |
//!
//! Exit statuses (and, for 7z, a few stderr markers) are classified into a
//! [`VerificationOutcome`] here, so nothing above this module ever sees tool
//! output.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::sync::OnceLock;

use zeroize::Zeroizing;

use super::{VerificationOutcome, VerificationStrategy};
use crate::archive_kind::ArchiveKind;
use crate::wordlist::Candidate;

/// Executables searched for the 7-Zip strategy, in order.
const SEVEN_ZIP_PROGRAMS: &[&str] = &["7z", "7zz", "7za"];

/// Executables searched for the unzip strategy.
const UNZIP_PROGRAMS: &[&str] = &["unzip"];

/// Longest stderr excerpt carried into a failure reason.
const STDERR_EXCERPT_LEN: usize = 200;

/// How to launch an external tool.
///
/// Either a list of program names searched on first use, or one explicit
/// program with leading arguments (e.g. an interpreter and a script).
#[derive(Debug)]
pub struct ToolCommand {
    programs: Vec<PathBuf>,
    prefix_args: Vec<OsString>,
    resolved: OnceLock<Option<PathBuf>>,
}

impl ToolCommand {
    /// Searches `programs` in order and uses the first that can be spawned.
    pub fn search(programs: &[&str]) -> Self {
        Self {
            programs: programs.iter().map(PathBuf::from).collect(),
            prefix_args: Vec::new(),
            resolved: OnceLock::new(),
        }
    }

    /// Uses exactly `program`, passing `prefix_args` before the tool arguments.
    pub fn explicit<I, S>(program: impl Into<PathBuf>, prefix_args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            programs: vec![program.into()],
            prefix_args: prefix_args.into_iter().map(Into::into).collect(),
            resolved: OnceLock::new(),
        }
    }

    /// Returns the program that will be launched, probing on first use.
    pub fn resolve(&self) -> Option<&Path> {
        self.resolved
            .get_or_init(|| {
                let found = self
                    .programs
                    .iter()
                    .find(|program| self.can_spawn(program))
                    .cloned();
                match &found {
                    Some(program) => log::debug!("using '{}'", program.display()),
                    None => log::debug!("none of {:?} could be launched", self.programs),
                }
                found
            })
            .as_deref()
    }

    fn command(&self, program: &Path) -> Command {
        let mut command = Command::new(program);
        command.args(&self.prefix_args).stdin(Stdio::null());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }
        command
    }

    fn can_spawn(&self, program: &Path) -> bool {
        self.command(program)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    }

    /// Runs the tool with `args` and collects its output.
    fn run(&self, program: &Path, args: &[OsString]) -> io::Result<Output> {
        self.command(program)
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
    }

    fn attempt_with(
        &self,
        tool: &str,
        args: &[OsString],
        classify: fn(Option<i32>, &str) -> VerificationOutcome,
    ) -> VerificationOutcome {
        let Some(program) = self.resolve() else {
            return VerificationOutcome::Unavailable;
        };

        match self.run(program, args) {
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let outcome = classify(output.status.code(), &stderr);
                log::debug!("{}: exit {:?} -> {:?}", tool, output.status.code(), outcome);
                outcome
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => VerificationOutcome::Unavailable,
            Err(e) => VerificationOutcome::Failed(format!("failed to launch: {}", e)),
        }
    }
}

/// Verification through the 7-Zip command-line tool.
#[derive(Debug)]
pub struct SevenZip {
    command: ToolCommand,
}

impl Default for SevenZip {
    fn default() -> Self {
        Self::new()
    }
}

impl SevenZip {
    /// Strategy name.
    pub const NAME: &'static str = "7z";

    /// Searches for `7z`, `7zz` or `7za` on `PATH`.
    pub fn new() -> Self {
        Self::with_command(ToolCommand::search(SEVEN_ZIP_PROGRAMS))
    }

    /// Uses a specific launch command.
    pub fn with_command(command: ToolCommand) -> Self {
        Self { command }
    }

    fn args(archive: &Path, candidate: &Candidate) -> Vec<OsString> {
        let mut password = Zeroizing::new(b"-p".to_vec());
        password.extend_from_slice(candidate.as_bytes());
        vec![
            "t".into(),
            os_arg(&password),
            "-y".into(),
            "-bso0".into(),
            "-bsp0".into(),
            archive.as_os_str().to_owned(),
        ]
    }
}

impl VerificationStrategy for SevenZip {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_available(&self) -> bool {
        self.command.resolve().is_some()
    }

    fn attempt(&self, archive: &Path, candidate: &Candidate) -> VerificationOutcome {
        let args = Self::args(archive, candidate);
        self.command
            .attempt_with(Self::NAME, &args, classify_seven_zip)
    }
}

/// Verification through Info-ZIP `unzip`.
#[derive(Debug)]
pub struct Unzip {
    command: ToolCommand,
}

impl Default for Unzip {
    fn default() -> Self {
        Self::new()
    }
}

impl Unzip {
    /// Strategy name.
    pub const NAME: &'static str = "unzip";

    /// Searches for `unzip` on `PATH`.
    pub fn new() -> Self {
        Self::with_command(ToolCommand::search(UNZIP_PROGRAMS))
    }

    /// Uses a specific launch command.
    pub fn with_command(command: ToolCommand) -> Self {
        Self { command }
    }

    fn args(archive: &Path, candidate: &Candidate) -> Vec<OsString> {
        vec![
            "-qq".into(),
            "-t".into(),
            "-P".into(),
            os_arg(candidate.as_bytes()),
            archive.as_os_str().to_owned(),
        ]
    }
}

impl VerificationStrategy for Unzip {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn supports(&self, kind: ArchiveKind) -> bool {
        matches!(kind, ArchiveKind::Zip | ArchiveKind::Unknown)
    }

    fn is_available(&self) -> bool {
        self.command.resolve().is_some()
    }

    fn attempt(&self, archive: &Path, candidate: &Candidate) -> VerificationOutcome {
        let args = Self::args(archive, candidate);
        self.command.attempt_with(Self::NAME, &args, classify_unzip)
    }
}

/// Builds a command-line argument from candidate bytes.
#[cfg(unix)]
fn os_arg(bytes: &[u8]) -> OsString {
    use std::os::unix::ffi::OsStrExt;
    std::ffi::OsStr::from_bytes(bytes).to_os_string()
}

/// Builds a command-line argument from candidate bytes.
///
/// Windows command lines are UTF-16, so invalid UTF-8 cannot be passed as is.
#[cfg(not(unix))]
fn os_arg(bytes: &[u8]) -> OsString {
    String::from_utf8_lossy(bytes).into_owned().into()
}

/// Maps a 7-Zip exit status to an outcome.
///
/// 7-Zip exits with 2 for a wrong password as well as for damaged or
/// unsupported archives; only a "Wrong password" marker on stderr counts as a
/// rejection. Exit 1 means warnings and is never a verdict on its own.
pub(crate) fn classify_seven_zip(code: Option<i32>, stderr: &str) -> VerificationOutcome {
    match code {
        Some(0) => VerificationOutcome::Matched,
        Some(code @ (1 | 2)) => {
            if stderr.contains("Wrong password") {
                VerificationOutcome::NotMatched
            } else if stderr.contains("Can not open the file as archive")
                || stderr.contains("Cannot open the file as archive")
            {
                VerificationOutcome::Failed("not an archive 7-Zip can open".into())
            } else if code == 1 {
                VerificationOutcome::Failed(failure("completed with warnings", stderr))
            } else {
                VerificationOutcome::Failed(failure("fatal error", stderr))
            }
        }
        Some(7) => VerificationOutcome::Failed(failure("command line error", stderr)),
        Some(8) => VerificationOutcome::Failed(failure("not enough memory", stderr)),
        Some(other) => VerificationOutcome::Failed(failure(&format!("exit status {}", other), stderr)),
        None => VerificationOutcome::Failed("terminated by signal".into()),
    }
}

/// Maps an Info-ZIP `unzip -t` exit status to an outcome.
pub(crate) fn classify_unzip(code: Option<i32>, stderr: &str) -> VerificationOutcome {
    match code {
        Some(0) => VerificationOutcome::Matched,
        // 82: every entry failed to decrypt; 1: some entries were skipped
        Some(82) | Some(1) => VerificationOutcome::NotMatched,
        // 81: encryption or compression method unzip does not implement
        Some(81) => VerificationOutcome::Unavailable,
        Some(9) => VerificationOutcome::Failed("not a zip archive".into()),
        Some(3) => VerificationOutcome::Failed(failure("severe error in zipfile format", stderr)),
        Some(other) => VerificationOutcome::Failed(failure(&format!("exit status {}", other), stderr)),
        None => VerificationOutcome::Failed("terminated by signal".into()),
    }
}

fn failure(what: &str, stderr: &str) -> String {
    let excerpt = stderr.trim();
    if excerpt.is_empty() {
        return what.to_string();
    }
    let excerpt: String = excerpt.chars().take(STDERR_EXCERPT_LEN).collect();
    format!("{}: {}", what, excerpt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_seven_zip() {
        assert_eq!(classify_seven_zip(Some(0), ""), VerificationOutcome::Matched);
        assert_eq!(
            classify_seven_zip(Some(2), "ERROR: Wrong password : secret.txt"),
            VerificationOutcome::NotMatched
        );
        assert_eq!(
            classify_seven_zip(Some(2), "Data Error in encrypted file. Wrong password?"),
            VerificationOutcome::NotMatched
        );
        assert!(matches!(
            classify_seven_zip(Some(2), "ERROR: x.bin\nCan not open the file as archive"),
            VerificationOutcome::Failed(_)
        ));
        assert_eq!(
            classify_seven_zip(Some(7), "Unknown switch"),
            VerificationOutcome::Failed("command line error: Unknown switch".into())
        );
        assert_eq!(
            classify_seven_zip(None, ""),
            VerificationOutcome::Failed("terminated by signal".into())
        );
    }

    #[test]
    fn test_classify_seven_zip_archive_errors_are_failures() {
        for stderr in [
            "ERROR: Unsupported Method : data.bin",
            "ERROR: data.7z\nHeaders Error",
            "ERROR: Unexpected end of archive",
            "",
        ] {
            match classify_seven_zip(Some(2), stderr) {
                VerificationOutcome::Failed(reason) => {
                    assert!(reason.starts_with("fatal error"), "reason: {}", reason);
                    assert!(reason.contains(stderr.trim()), "reason: {}", reason);
                }
                other => panic!("{:?} classified as {:?}", stderr, other),
            }
        }

        assert_eq!(
            classify_seven_zip(Some(1), "WARNING: data.bin : Headers Error"),
            VerificationOutcome::Failed(
                "completed with warnings: WARNING: data.bin : Headers Error".into()
            )
        );
        assert_eq!(
            classify_seven_zip(Some(1), "Can not open encrypted archive. Wrong password?"),
            VerificationOutcome::NotMatched
        );
    }

    #[test]
    fn test_classify_unzip() {
        assert_eq!(classify_unzip(Some(0), ""), VerificationOutcome::Matched);
        assert_eq!(classify_unzip(Some(82), ""), VerificationOutcome::NotMatched);
        assert_eq!(classify_unzip(Some(81), ""), VerificationOutcome::Unavailable);
        assert_eq!(
            classify_unzip(Some(9), ""),
            VerificationOutcome::Failed("not a zip archive".into())
        );
        assert_eq!(
            classify_unzip(Some(50), ""),
            VerificationOutcome::Failed("exit status 50".into())
        );
    }

    #[test]
    fn test_failure_truncates_stderr() {
        let long = "x".repeat(STDERR_EXCERPT_LEN * 2);
        let reason = failure("exit status 3", &long);
        assert_eq!(reason.len(), "exit status 3: ".len() + STDERR_EXCERPT_LEN);
    }

    #[test]
    fn test_seven_zip_args_test_mode() {
        let candidate = Candidate::new("hunter2").unwrap();
        let args = SevenZip::args(Path::new("/tmp/a.7z"), &candidate);
        assert_eq!(args[0], OsString::from("t"));
        assert_eq!(args[1], OsString::from("-phunter2"));
        assert_eq!(args.last().unwrap(), &OsString::from("/tmp/a.7z"));
    }

    #[cfg(unix)]
    #[test]
    fn test_args_carry_raw_bytes() {
        use std::os::unix::ffi::OsStrExt;

        let candidate = Candidate::from_bytes(b"caf\xe9").unwrap();
        let args = SevenZip::args(Path::new("/tmp/a.7z"), &candidate);
        assert_eq!(args[1].as_bytes(), b"-pcaf\xe9");
        let args = Unzip::args(Path::new("/tmp/a.zip"), &candidate);
        assert_eq!(args[3].as_bytes(), b"caf\xe9");
    }

    #[test]
    fn test_unzip_args_test_mode() {
        let candidate = Candidate::new("hunter2").unwrap();
        let args = Unzip::args(Path::new("/tmp/a.zip"), &candidate);
        assert!(args.contains(&OsString::from("-t")));
        assert!(!args.iter().any(|a| a == "-x" || a == "-d"));
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let strategy = SevenZip::with_command(ToolCommand::search(&[
            "wordcrack-definitely-missing-7z",
        ]));
        assert!(!strategy.is_available());
        let candidate = Candidate::new("x").unwrap();
        assert_eq!(
            strategy.attempt(Path::new("a.7z"), &candidate),
            VerificationOutcome::Unavailable
        );
    }

    #[test]
    fn test_unzip_skips_seven_zip_archives() {
        let unzip = Unzip::new();
        assert!(unzip.supports(ArchiveKind::Zip));
        assert!(unzip.supports(ArchiveKind::Unknown));
        assert!(!unzip.supports(ArchiveKind::SevenZip));
        assert!(SevenZip::new().supports(ArchiveKind::SevenZip));
    }
}
