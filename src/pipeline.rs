//! Top-level detection pipeline entry points.
//!
//! Ties the phases together for the UI layer:
//! scan + size bucketing ([`scan_and_group`]), content digests
//! ([`crate::duplicates::compute_digests`]), listing construction
//! ([`crate::duplicates::build_listing`]) and deletion by ordinal
//! ([`crate::actions::delete_by_ordinals`]).
//!
//! The pipeline is stateless per invocation: all configuration travels in
//! an explicit [`PipelineConfig`], no process-wide mutable state.

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::duplicates::{group_by_size, GroupingStats, SizeBuckets};
use crate::scanner::{ScanConfig, ScanError, Walker};

/// Configuration for one pipeline invocation.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root directory to scan
    pub root: PathBuf,
    /// Optional extension filter, with leading dot (e.g. `".txt"`)
    pub extension_filter: Option<String>,
    /// I/O thread count for the digest phase
    pub io_threads: usize,
    /// Optional shutdown flag threaded through walker and hasher
    pub shutdown_flag: Option<Arc<AtomicBool>>,
}

impl PipelineConfig {
    /// Create a configuration for the given root with defaults.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            extension_filter: None,
            io_threads: 4,
            shutdown_flag: None,
        }
    }

    /// Set the extension filter.
    #[must_use]
    pub fn with_extension_filter(mut self, filter: Option<String>) -> Self {
        self.extension_filter = filter;
        self
    }

    /// Set the I/O thread count for hashing.
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the shutdown flag.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }
}

/// Result of the scan + size bucketing phase.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Files bucketed by exact byte size
    pub buckets: SizeBuckets,
    /// Recoverable scan errors (skipped subtrees, vanished entries)
    pub errors: Vec<ScanError>,
    /// Statistics about the bucketing
    pub stats: GroupingStats,
}

impl ScanOutcome {
    /// Whether any subtree had to be skipped.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Scan a directory tree and bucket the discovered files by size.
///
/// Combined entry point for the walk and grouping phases. Recoverable
/// errors are collected into the outcome so the caller can report exactly
/// which subtrees were skipped; duplicates found in readable subtrees are
/// still reported.
///
/// # Errors
///
/// Fails only when the root does not exist or is not a directory.
pub fn scan_and_group(config: &PipelineConfig) -> Result<ScanOutcome, ScanError> {
    let scan_config = ScanConfig {
        extension_filter: config.extension_filter.clone(),
    };
    let mut walker = Walker::new(&config.root, scan_config);
    if let Some(flag) = &config.shutdown_flag {
        walker = walker.with_shutdown_flag(Arc::clone(flag));
    }

    let mut files = Vec::new();
    let mut errors = Vec::new();
    for result in walker.walk()? {
        match result {
            Ok(entry) => files.push(entry),
            Err(e) => errors.push(e),
        }
    }

    let (buckets, stats) = group_by_size(files);
    Ok(ScanOutcome {
        buckets,
        errors,
        stats,
    })
}
