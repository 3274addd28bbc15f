//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Parallel directory walking using jwalk
//! - Streaming content hashing with BLAKE3
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: BLAKE3 file hashing (streaming)
//!
//! # Example
//!
//! ```no_run
//! use dupehand::scanner::{ScanConfig, Walker};
//! use std::path::Path;
//!
//! let config = ScanConfig {
//!     extension_filter: Some(".txt".to_string()),
//! };
//!
//! let walker = Walker::new(Path::new("."), config);
//! for entry in walker.walk().unwrap() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod hasher;
pub mod walker;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// Re-export main types
pub use hasher::{digest_to_hex, Digest, Hasher};
pub use walker::Walker;

/// Metadata for a discovered file.
///
/// Holds everything duplicate detection needs: the absolute path and the
/// byte size recorded at scan time. Immutable once scanned; the size may
/// drift before a later deletion, which is an accepted race.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes at scan time
    pub size: u64,
}

impl FileEntry {
    /// Create a new FileEntry.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self { path, size }
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Only yield files whose extension exactly matches this filter.
    ///
    /// The filter is case-sensitive and includes the leading dot, e.g.
    /// `".txt"`. Files without an extension never match a filter.
    pub extension_filter: Option<String>,
}

/// Errors that can occur during directory scanning.
///
/// Only [`ScanError::RootNotFound`] and [`ScanError::NotADirectory`] are
/// fatal; the per-subtree variants are collected and the walk continues.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The scan root does not exist. Fatal.
    #[error("root directory not found: {0}")]
    RootNotFound(PathBuf),

    /// The scan root exists but is not a directory. Fatal.
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Permission was denied for a file or subtree. Recoverable.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading a directory entry. Recoverable.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Whether this error aborts the whole run.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::RootNotFound(_) | Self::NotADirectory(_))
    }

    /// The path this error refers to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::RootNotFound(p)
            | Self::NotADirectory(p)
            | Self::PermissionDenied(p)
            | Self::Io { path: p, .. } => p,
        }
    }
}

/// Errors that can occur while hashing a single file.
///
/// All variants are recoverable: the offending file is excluded from its
/// digest bucket and the run continues.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The file vanished between scan and hash.
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// The path this error refers to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) | Self::Io { path: p, .. } => p,
        }
    }

    pub(crate) fn from_io(path: &std::path::Path, error: std::io::Error) -> Self {
        use std::io::ErrorKind;
        match error.kind() {
            ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}
