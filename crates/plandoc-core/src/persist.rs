//! Reading and committing plan documents on disk.
//!
//! [`write_atomic`] never leaves a partially written document behind: the
//! new text goes to a temporary file in the target's directory, is synced,
//! and then renamed over the target. A reader sees either the old text or
//! the new text.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::PersistError;

/// Read a plan document as UTF-8 text.
pub fn read_document(path: &Path) -> Result<String, PersistError> {
    let text = std::fs::read_to_string(path).map_err(|source| PersistError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = text.len(), "read plan document");
    Ok(text)
}

/// Replace the contents of `path` with `contents` atomically.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), PersistError> {
    let write_err = |source| PersistError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(contents.as_bytes()).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    debug!(path = %path.display(), bytes = contents.len(), "committed plan document");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("PLAN.md");
        write_atomic(&path, "# Plan\n").unwrap();
        assert_eq!(read_document(&path).unwrap(), "# Plan\n");
    }

    #[test]
    fn overwrite_leaves_no_temp_files() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("PLAN.md");
        write_atomic(&path, "old").unwrap();
        write_atomic(&path, "new").unwrap();
        assert_eq!(read_document(&path).unwrap(), "new");

        let entries: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn read_missing_reports_path() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("absent.md");
        let err = read_document(&path).unwrap_err();
        assert!(matches!(err, PersistError::Read { .. }));
        assert!(err.to_string().contains("absent.md"));
    }

    #[test]
    fn write_into_missing_directory_fails_cleanly() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("nope").join("PLAN.md");
        let err = write_atomic(&path, "text").unwrap_err();
        assert!(matches!(err, PersistError::Write { .. }));
        assert!(!path.exists());
    }
}
