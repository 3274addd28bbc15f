//! Deletion executor with freed-space accounting.
//!
//! # Overview
//!
//! Removes an explicitly selected set of files and accumulates the freed
//! byte count. Each deletion is independent: a file that is already gone
//! or not removable is reported as a failure while the remaining
//! deletions proceed.
//!
//! Accounting uses the file's live size at deletion time, not the size
//! recorded at scan time, since the goal is "space freed" rather than
//! "space recorded". The two can differ if a file changed between scan
//! and delete; that race is accepted.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::duplicates::DuplicateListing;

/// Error type for deletion operations. All variants are per-path and
/// recoverable; they are collected into the [`DeleteReport`].
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (already removed or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An ordinal that does not exist in the listing.
    #[error("no such ordinal in listing: {0}")]
    UnknownOrdinal(usize),

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

/// A successfully deleted file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedFile {
    /// Path that was removed
    pub path: PathBuf,
    /// Live size at deletion time, in bytes
    pub bytes: u64,
}

/// A deletion that could not be carried out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteFailure {
    /// Ordinal that selected the file, when deleting by ordinal
    pub ordinal: Option<usize>,
    /// Path that failed, when the selection resolved to one
    pub path: Option<PathBuf>,
    /// Human-readable reason
    pub message: String,
}

/// Outcome of a deletion batch: freed bytes plus per-path failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteReport {
    /// Successfully deleted files
    pub deleted: Vec<DeletedFile>,
    /// Failures, one per path or unknown ordinal
    pub failures: Vec<DeleteFailure>,
    /// Aggregate bytes freed across successful deletions
    pub bytes_freed: u64,
}

impl DeleteReport {
    /// Number of successful deletions.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.deleted.len()
    }

    /// Number of failed deletions.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Check if every requested deletion succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary of the batch.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.all_succeeded() {
            format!(
                "Deleted {} file(s), freed {}",
                self.success_count(),
                bytesize::ByteSize(self.bytes_freed)
            )
        } else {
            format!(
                "Deleted {} file(s), {} failed, freed {}",
                self.success_count(),
                self.failure_count(),
                bytesize::ByteSize(self.bytes_freed)
            )
        }
    }

    fn record(&mut self, ordinal: Option<usize>, result: Result<DeletedFile, DeleteError>) {
        match result {
            Ok(deleted) => {
                self.bytes_freed += deleted.bytes;
                self.deleted.push(deleted);
            }
            Err(e) => {
                log::warn!("Deletion failed: {}", e);
                let path = match &e {
                    DeleteError::NotFound(p)
                    | DeleteError::PermissionDenied(p)
                    | DeleteError::Io { path: p, .. } => Some(p.clone()),
                    DeleteError::UnknownOrdinal(_) => None,
                };
                self.failures.push(DeleteFailure {
                    ordinal,
                    path,
                    message: e.to_string(),
                });
            }
        }
    }
}

/// Remove one file, returning its live size for accounting.
fn delete_one(path: &Path) -> Result<DeletedFile, DeleteError> {
    let metadata = fs::symlink_metadata(path).map_err(|e| DeleteError::from_io(path, e))?;
    let bytes = metadata.len();
    fs::remove_file(path).map_err(|e| DeleteError::from_io(path, e))?;
    log::info!("Deleted: {} ({} bytes)", path.display(), bytes);
    Ok(DeletedFile {
        path: path.to_path_buf(),
        bytes,
    })
}

/// Delete an explicit set of paths, accumulating freed bytes.
///
/// Each deletion is independent; failures are collected, never fatal.
/// Paths not passed in are never touched.
pub fn delete_files<'a>(paths: impl IntoIterator<Item = &'a Path>) -> DeleteReport {
    let mut report = DeleteReport::default();
    for path in paths {
        report.record(None, delete_one(path));
    }
    log::info!("{}", report.summary());
    report
}

/// Delete the files a set of ordinals names in a listing.
///
/// Ordinals are resolved against the listing before any file is touched;
/// an ordinal outside the listing is reported as a failure and the rest
/// proceed. This is the deletion entry point the UI layer calls after
/// the user confirms a selection.
///
/// # Example
///
/// ```no_run
/// use dupehand::actions::delete_by_ordinals;
/// use dupehand::duplicates::DuplicateListing;
/// use std::collections::BTreeSet;
///
/// let listing = DuplicateListing::default();
/// let report = delete_by_ordinals(&listing, &BTreeSet::from([2, 3]));
/// println!("freed {} bytes", report.bytes_freed);
/// ```
pub fn delete_by_ordinals(listing: &DuplicateListing, ordinals: &BTreeSet<usize>) -> DeleteReport {
    let mut report = DeleteReport::default();
    for &ordinal in ordinals {
        match listing.resolve(ordinal) {
            Some(entry) => report.record(Some(ordinal), delete_one(&entry.path)),
            None => report.record(Some(ordinal), Err(DeleteError::UnknownOrdinal(ordinal))),
        }
    }
    log::info!("{}", report.summary());
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duplicates::{build_listing, group_by_size, SortOrder};
    use crate::scanner::FileEntry;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> FileEntry {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        FileEntry::new(path, content.len() as u64)
    }

    #[test]
    fn test_delete_files_frees_live_bytes() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.txt", b"hello");
        let b = write_file(&dir, "b.txt", b"hello world");

        let paths = [a.path.as_path(), b.path.as_path()];
        let report = delete_files(paths);

        assert!(report.all_succeeded());
        assert_eq!(report.success_count(), 2);
        assert_eq!(report.bytes_freed, 16);
        assert!(!a.path.exists());
        assert!(!b.path.exists());
    }

    #[test]
    fn test_delete_files_accounts_live_size_not_scanned_size() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.txt", b"hello");
        // File grew after the scan; accounting must use the live size
        fs::write(&a.path, b"hello, much longer now").unwrap();

        let report = delete_files([a.path.as_path()]);
        assert_eq!(report.bytes_freed, 22);
    }

    #[test]
    fn test_delete_files_missing_file_is_reported_not_fatal() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.txt", b"hello");
        let ghost = dir.path().join("ghost.txt");

        let report = delete_files([ghost.as_path(), a.path.as_path()]);

        assert_eq!(report.success_count(), 1);
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.bytes_freed, 5);
        assert_eq!(report.failures[0].path, Some(ghost));
        assert!(!a.path.exists());
    }

    #[test]
    fn test_delete_by_ordinals_removes_exactly_selected() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            write_file(&dir, "a.txt", b"hello"),
            write_file(&dir, "b.txt", b"hello"),
            write_file(&dir, "c.txt", b"hello"),
        ];
        let (buckets, _) = group_by_size(files.clone());
        let listing = build_listing(&buckets, None, SortOrder::Ascending);

        let report = delete_by_ordinals(&listing, &BTreeSet::from([2, 3]));

        assert!(report.all_succeeded());
        assert_eq!(report.bytes_freed, 10);
        assert!(files[0].path.exists(), "unselected file untouched");
        assert!(!files[1].path.exists());
        assert!(!files[2].path.exists());
    }

    #[test]
    fn test_delete_by_ordinals_unknown_ordinal() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            write_file(&dir, "a.txt", b"hello"),
            write_file(&dir, "b.txt", b"hello"),
        ];
        let (buckets, _) = group_by_size(files.clone());
        let listing = build_listing(&buckets, None, SortOrder::Ascending);

        let report = delete_by_ordinals(&listing, &BTreeSet::from([1, 99]));

        assert_eq!(report.success_count(), 1);
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.failures[0].ordinal, Some(99));
        assert!(report.failures[0].path.is_none());
        assert!(!files[0].path.exists());
        assert!(files[1].path.exists());
    }

    #[test]
    fn test_delete_by_ordinals_empty_selection() {
        let listing = DuplicateListing::default();
        let report = delete_by_ordinals(&listing, &BTreeSet::new());
        assert!(report.all_succeeded());
        assert_eq!(report.bytes_freed, 0);
    }

    #[test]
    fn test_report_summary() {
        let mut report = DeleteReport::default();
        report.deleted.push(DeletedFile {
            path: PathBuf::from("/a"),
            bytes: 5,
        });
        report.bytes_freed = 5;
        assert!(report.summary().starts_with("Deleted 1 file(s)"));

        report.failures.push(DeleteFailure {
            ordinal: None,
            path: None,
            message: "nope".into(),
        });
        assert!(report.summary().contains("1 failed"));
    }
}
