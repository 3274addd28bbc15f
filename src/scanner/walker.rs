//! Directory walker implementation using jwalk for parallel traversal.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory
//! tree and collecting `(path, size)` pairs for duplicate detection.
//! Directory children are sorted per read-dir so the traversal order, and
//! therefore every downstream ordering, is deterministic.
//!
//! # Symlink policy
//!
//! Symbolic links are never followed: symlinked directories are not
//! descended into (avoids cycles) and symlinked files are skipped. This is
//! fixed behavior, not configurable.
//!
//! # Example
//!
//! ```no_run
//! use dupehand::scanner::{ScanConfig, Walker};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), ScanConfig::default());
//! for entry in walker.walk().unwrap() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use jwalk::WalkDir;

use super::{FileEntry, ScanConfig, ScanError};

/// Directory walker for deterministic file discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: ScanConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given root.
    #[must_use]
    pub fn new(root: &Path, config: ScanConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops iteration as soon
    /// as possible.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Check if a path passes the extension filter.
    ///
    /// The filter is case-sensitive and carries the leading dot, so
    /// `".txt"` matches `notes.txt` but not `notes.TXT` or `txt`.
    fn matches_extension(&self, path: &Path) -> bool {
        let Some(filter) = self.config.extension_filter.as_deref() else {
            return true;
        };
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => filter.strip_prefix('.') == Some(ext),
            None => false,
        }
    }

    /// Walk the directory tree, yielding file entries.
    ///
    /// Returns an iterator over [`FileEntry`] results. Recoverable errors
    /// (unreadable subtrees, vanished entries) are yielded as [`ScanError`]
    /// values rather than stopping iteration.
    ///
    /// # Errors
    ///
    /// Fails up front with [`ScanError::RootNotFound`] if the root does not
    /// exist, or [`ScanError::NotADirectory`] if it is not a directory.
    /// These are the only fatal scan errors.
    pub fn walk(&self) -> Result<impl Iterator<Item = Result<FileEntry, ScanError>> + '_, ScanError> {
        let root_meta = std::fs::metadata(&self.root)
            .map_err(|_| ScanError::RootNotFound(self.root.clone()))?;
        if !root_meta.is_dir() {
            return Err(ScanError::NotADirectory(self.root.clone()));
        }

        let walk_dir = WalkDir::new(&self.root)
            .follow_links(false)
            .skip_hidden(false)
            .process_read_dir(|_depth, _path, _read_dir_state, children| {
                // Sort children so traversal order is reproducible
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });
            });

        Ok(walk_dir.into_iter().filter_map(move |entry_result| {
            if self.is_shutdown_requested() {
                log::debug!("Walker: shutdown requested, stopping iteration");
                return None;
            }

            match entry_result {
                Ok(entry) => {
                    let path = entry.path();

                    if path == self.root {
                        return None;
                    }

                    let file_type = entry.file_type();
                    if file_type.is_dir() {
                        return None;
                    }
                    if file_type.is_symlink() {
                        log::trace!("Skipping symlink: {}", path.display());
                        return None;
                    }

                    if !self.matches_extension(&path) {
                        log::trace!("Skipping file (extension filter): {}", path.display());
                        return None;
                    }

                    match std::fs::symlink_metadata(&path) {
                        Ok(metadata) => {
                            // Special files (fifos, sockets) are not scannable
                            if !metadata.is_file() {
                                return None;
                            }
                            Some(Ok(FileEntry::new(path, metadata.len())))
                        }
                        Err(e) => Some(Err(self.map_io_error(&path, e))),
                    }
                }
                Err(e) => Some(Err(self.map_walk_error(e))),
            }
        }))
    }

    /// Map an I/O error during file access to a recoverable [`ScanError`].
    fn map_io_error(&self, path: &Path, error: std::io::Error) -> ScanError {
        use std::io::ErrorKind;
        match error.kind() {
            ErrorKind::PermissionDenied => {
                log::warn!("Permission denied: {}", path.display());
                ScanError::PermissionDenied(path.to_path_buf())
            }
            _ => {
                log::warn!("I/O error for {}: {}", path.display(), error);
                ScanError::Io {
                    path: path.to_path_buf(),
                    source: error,
                }
            }
        }
    }

    /// Map a jwalk traversal error to a recoverable [`ScanError`].
    fn map_walk_error(&self, error: jwalk::Error) -> ScanError {
        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);
        log::warn!("Walker error for {}: {}", path.display(), error);
        if error
            .io_error()
            .is_some_and(|e| e.kind() == std::io::ErrorKind::PermissionDenied)
        {
            ScanError::PermissionDenied(path)
        } else {
            ScanError::Io {
                path,
                source: std::io::Error::other(error.to_string()),
            }
        }
    }
}
