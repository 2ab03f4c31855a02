// src/core/fit.rs

//! Fault-insertion file parsing, grounded on `amon.c`'s debug-mode file
//! convention: a small text file whose first line names which fault to
//! inject. `amon.c` keys the file to a per-process `/var/run/<name>.debug`
//! path and never re-reads it after process start; this module generalizes
//! that to the engine's single `fitinfo` file and renames it on
//! consumption so a fresh copy must be dropped to re-arm, rather than
//! requiring a process restart.

use crate::core::constants::{FITINFO_FILE, FITINFO_FILE_CONSUMED_SUFFIX};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitCode {
    Magic,
    Sequence,
    Process,
}

impl FitCode {
    fn parse(word: &str) -> Option<Self> {
        match word {
            "magic" => Some(FitCode::Magic),
            "sequence" => Some(FitCode::Sequence),
            "process" => Some(FitCode::Process),
            _ => None,
        }
    }
}

/// Reads and consumes the fitinfo file if present, renaming it with the
/// `.done` suffix so the same fault isn't re-applied on the next check.
/// Returns `None` if the file is absent, empty, or names an unrecognized
/// fault; any of those is treated as "no fault armed" rather than an error.
pub fn consume_fitinfo() -> Option<FitCode> {
    consume_fitinfo_at(Path::new(FITINFO_FILE))
}

fn consume_fitinfo_at(path: &Path) -> Option<FitCode> {
    let contents = std::fs::read_to_string(path).ok()?;
    let first_word = contents.split_whitespace().next()?;
    let code = FitCode::parse(first_word);

    let mut consumed: PathBuf = path.to_path_buf();
    let renamed_name = format!(
        "{}{}",
        path.file_name()?.to_string_lossy(),
        FITINFO_FILE_CONSUMED_SUFFIX
    );
    consumed.set_file_name(renamed_name);
    let _ = std::fs::rename(path, &consumed);

    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_magic_and_renames_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fitinfo");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "magic").unwrap();
        drop(f);

        assert_eq!(consume_fitinfo_at(&path), Some(FitCode::Magic));
        assert!(!path.exists());
        assert!(dir.path().join("fitinfo.done").exists());
    }

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist");
        assert_eq!(consume_fitinfo_at(&path), None);
    }

    #[test]
    fn unrecognized_word_is_none_but_still_consumed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fitinfo");
        std::fs::write(&path, "bogus\n").unwrap();
        assert_eq!(consume_fitinfo_at(&path), None);
        assert!(!path.exists());
    }
}
