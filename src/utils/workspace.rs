//! Output workspace maintenance.
//!
//! Compile outputs accumulate per session; these helpers keep the
//! workspace directory bounded. All removal is best-effort: individual
//! failures are logged and skipped.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Duration, Local};
use tracing::{debug, warn};

use crate::utils::error::DocumentResult;

/// Create the workspace directory tree if missing.
pub fn ensure_workspace(dir: &Path) -> DocumentResult<()> {
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Remove everything inside `dir`, keeping `dir` itself.
///
/// Returns the number of entries removed.
pub fn clear_workspace(dir: &Path) -> usize {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(dir = %dir.display(), error = %err, "could not read workspace");
            return 0;
        }
    };
    let mut removed = 0;
    for entry in entries.flatten() {
        if remove_entry(&entry.path()) {
            removed += 1;
        }
    }
    removed
}

/// Remove workspace entries whose modification time is older than
/// `days_to_keep` days, returning how many were removed.
pub fn remove_stale_outputs(dir: &Path, days_to_keep: u32) -> usize {
    let cutoff = Local::now() - Duration::days(i64::from(days_to_keep));
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(dir = %dir.display(), error = %err, "could not read workspace");
            return 0;
        }
    };
    let mut removed = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        let modified = match entry.metadata().and_then(|meta| meta.modified()) {
            Ok(time) => DateTime::<Local>::from(time),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "could not read modification time");
                continue;
            }
        };
        if modified >= cutoff {
            continue;
        }
        if remove_entry(&path) {
            debug!(path = %path.display(), "removed stale output");
            removed += 1;
        }
    }
    removed
}

fn remove_entry(path: &Path) -> bool {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Ok(()) => true,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "could not remove workspace entry");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_workspace_creates_tree() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("outputs/session-1");
        assert!(ensure_workspace(&nested).is_ok());
        assert!(nested.is_dir());
        // Idempotent
        assert!(ensure_workspace(&nested).is_ok());
    }

    #[test]
    fn test_clear_workspace_removes_entries() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("a.pdf"), b"x").expect("write");
        fs::create_dir(dir.path().join("session")).expect("mkdir");
        fs::write(dir.path().join("session/b.log"), b"y").expect("write");

        let removed = clear_workspace(dir.path());
        assert_eq!(removed, 2);
        assert_eq!(fs::read_dir(dir.path()).expect("read").count(), 0);
        assert!(dir.path().is_dir());
    }

    #[test]
    fn test_fresh_outputs_are_kept() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("recent.pdf"), b"x").expect("write");
        let removed = remove_stale_outputs(dir.path(), 7);
        assert_eq!(removed, 0);
        assert!(dir.path().join("recent.pdf").exists());
    }

    #[test]
    fn test_missing_dir_is_a_noop() {
        assert_eq!(clear_workspace(Path::new("/nonexistent/cvtex-ws")), 0);
        assert_eq!(remove_stale_outputs(Path::new("/nonexistent/cvtex-ws"), 7), 0);
    }
}
