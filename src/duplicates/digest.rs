//! Content digest bucketing (Phase 2 of duplicate detection).
//!
//! # Overview
//!
//! For each size bucket with 2+ members, every file's full content is
//! hashed and the bucket is re-partitioned by digest. Singleton size
//! buckets are excluded from the output mapping entirely: a digest bucket
//! is never created for a size that cannot contain duplicates.
//!
//! Hashing is embarrassingly parallel, so files are hashed across a
//! bounded rayon pool and the results merged back in input order. The
//! merge keeps bucket contents deterministic regardless of which worker
//! finished first.
//!
//! A file that fails to hash (permission denied, removed between scan and
//! hash) is excluded from its digest bucket and reported in the outcome's
//! error list; one unreadable file never aborts detection of the rest.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use super::groups::SizeBuckets;
use crate::scanner::{Digest, FileEntry, HashError, Hasher};

/// Digest sub-buckets per size: size -> digest -> files.
///
/// `BTreeMap` over the raw digest bytes orders sub-buckets lexically by
/// digest value, which is also lexical hex order. That is the documented
/// tie-break making ordinal assignment reproducible.
pub type DigestBuckets = BTreeMap<u64, BTreeMap<Digest, Vec<FileEntry>>>;

/// Configuration for the digest phase.
#[derive(Debug, Clone)]
pub struct DigestConfig {
    /// Number of I/O threads for parallel hashing.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            shutdown_flag: None,
        }
    }
}

impl DigestConfig {
    /// Set the I/O thread count.
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the shutdown flag for graceful termination.
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
}

/// Statistics from the digest phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestStats {
    /// Files that entered the digest phase (from buckets with 2+ members)
    pub input_files: usize,
    /// Files successfully hashed
    pub hashed_files: usize,
    /// Files that failed to hash
    pub failed_files: usize,
    /// Files skipped because shutdown was requested
    pub skipped_files: usize,
    /// Total bytes hashed
    pub bytes_hashed: u64,
    /// Digest sub-buckets holding 2+ files (confirmed duplicate sets)
    pub duplicate_buckets: usize,
    /// Whether the phase was interrupted by shutdown
    pub interrupted: bool,
}

/// Result of the digest phase: buckets plus collected per-file errors.
#[derive(Debug, Default)]
pub struct DigestOutcome {
    /// Digest buckets for every size bucket that had 2+ members
    pub buckets: DigestBuckets,
    /// Per-file errors; the affected files are absent from `buckets`
    pub errors: Vec<HashError>,
    /// Statistics about the phase
    pub stats: DigestStats,
}

/// Compute content digests for all size buckets with 2+ members.
///
/// Buckets with exactly one path are passed over without any I/O. For the
/// rest, every file is hashed in full (streaming reads, bounded memory)
/// and re-partitioned by digest.
///
/// # Example
///
/// ```no_run
/// use dupehand::duplicates::{compute_digests, group_by_size, DigestConfig};
/// use dupehand::scanner::Hasher;
///
/// let (buckets, _) = group_by_size(vec![]);
/// let outcome = compute_digests(&buckets, &Hasher::new(), &DigestConfig::default());
/// println!("{} duplicate sets confirmed", outcome.stats.duplicate_buckets);
/// ```
#[must_use]
pub fn compute_digests(
    size_buckets: &SizeBuckets,
    hasher: &Hasher,
    config: &DigestConfig,
) -> DigestOutcome {
    // Candidates in canonical (size, walk) order; singleton buckets skipped
    let candidates: Vec<FileEntry> = size_buckets
        .values()
        .filter(|entries| entries.len() > 1)
        .flat_map(|entries| entries.iter().cloned())
        .collect();

    let mut outcome = DigestOutcome::default();
    outcome.stats.input_files = candidates.len();

    if candidates.is_empty() {
        log::debug!("Phase 2: no size bucket has multiple members, nothing to hash");
        return outcome;
    }

    log::info!("Phase 2: hashing {} files", candidates.len());

    // Bounded pool keeps disk I/O from thrashing on spinning media
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.io_threads)
        .build()
        .unwrap_or_else(|_| {
            log::warn!(
                "Failed to create custom thread pool, using global pool with {} threads",
                rayon::current_num_threads()
            );
            rayon::ThreadPoolBuilder::new().build().unwrap()
        });

    // `collect` on an indexed parallel iterator preserves input order, so
    // the sequential merge below sees files in canonical order no matter
    // how the workers interleaved.
    let results: Vec<(FileEntry, Option<Result<Digest, HashError>>)> = pool.install(|| {
        candidates
            .into_par_iter()
            .map(|file| {
                if config.is_shutdown_requested() {
                    return (file, None);
                }
                let result = hasher.hash_file(&file.path);
                if let Err(ref e) = result {
                    log::warn!("Failed to hash {}: {}", file.path.display(), e);
                }
                (file, Some(result))
            })
            .collect()
    });

    if config.is_shutdown_requested() {
        outcome.stats.interrupted = true;
        log::info!("Phase 2: interrupted by shutdown signal");
    }

    for (file, result) in results {
        match result {
            Some(Ok(digest)) => {
                outcome.stats.hashed_files += 1;
                outcome.stats.bytes_hashed += file.size;
                outcome
                    .buckets
                    .entry(file.size)
                    .or_default()
                    .entry(digest)
                    .or_default()
                    .push(file);
            }
            Some(Err(e)) => {
                outcome.stats.failed_files += 1;
                outcome.errors.push(e);
            }
            None => outcome.stats.skipped_files += 1,
        }
    }

    outcome.stats.duplicate_buckets = outcome
        .buckets
        .values()
        .flat_map(BTreeMap::values)
        .filter(|files| files.len() > 1)
        .count();

    log::info!(
        "Phase 2 complete: {} files hashed, {} failed, {} duplicate sets",
        outcome.stats.hashed_files,
        outcome.stats.failed_files,
        outcome.stats.duplicate_buckets
    );

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duplicates::group_by_size;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> FileEntry {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        FileEntry::new(path, content.len() as u64)
    }

    #[test]
    fn test_compute_digests_splits_by_content() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            write_file(&dir, "a.txt", b"hello"),
            write_file(&dir, "b.txt", b"hello"),
            write_file(&dir, "c.txt", b"world"),
        ];
        let (buckets, _) = group_by_size(files);

        let outcome = compute_digests(&buckets, &Hasher::new(), &DigestConfig::default());

        let sub = &outcome.buckets[&5];
        assert_eq!(sub.len(), 2, "two distinct contents, two digest buckets");
        let mut lens: Vec<usize> = sub.values().map(Vec::len).collect();
        lens.sort_unstable();
        assert_eq!(lens, vec![1, 2]);
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.stats.duplicate_buckets, 1);
        assert_eq!(outcome.stats.bytes_hashed, 15);
    }

    #[test]
    fn test_compute_digests_skips_singleton_buckets() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            write_file(&dir, "solo.txt", b"unique"),
            write_file(&dir, "pair1.txt", b"dup"),
            write_file(&dir, "pair2.txt", b"dup"),
        ];
        let (buckets, _) = group_by_size(files);

        let outcome = compute_digests(&buckets, &Hasher::new(), &DigestConfig::default());

        // Only the 3-byte bucket was hashed; no digest bucket for size 6
        assert!(!outcome.buckets.contains_key(&6));
        assert!(outcome.buckets.contains_key(&3));
        assert_eq!(outcome.stats.input_files, 2);
    }

    #[test]
    fn test_compute_digests_empty_input() {
        let (buckets, _) = group_by_size(vec![]);
        let outcome = compute_digests(&buckets, &Hasher::new(), &DigestConfig::default());
        assert!(outcome.buckets.is_empty());
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.stats, DigestStats::default());
    }

    #[test]
    fn test_compute_digests_missing_file_continues() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.txt", b"hello");
        let b = write_file(&dir, "b.txt", b"hello");
        // Same size as a/b so it shares their bucket, but gone by hash time
        let ghost = FileEntry::new(PathBuf::from(dir.path().join("ghost.txt")), 5);

        let (buckets, _) = group_by_size(vec![a.clone(), b.clone(), ghost]);
        let outcome = compute_digests(&buckets, &Hasher::new(), &DigestConfig::default());

        assert_eq!(outcome.errors.len(), 1);
        assert!(matches!(outcome.errors[0], HashError::NotFound(_)));
        assert_eq!(outcome.stats.failed_files, 1);

        // The readable pair is still confirmed as duplicates
        let sub = &outcome.buckets[&5];
        assert_eq!(sub.len(), 1);
        assert_eq!(sub.values().next().unwrap().len(), 2);
    }

    #[test]
    fn test_compute_digests_deterministic_across_runs() {
        let dir = TempDir::new().unwrap();
        let files: Vec<FileEntry> = (0..20)
            .map(|i| write_file(&dir, &format!("f{i}.dat"), if i % 2 == 0 { b"xxxx" } else { b"yyyy" }))
            .collect();
        let (buckets, _) = group_by_size(files);

        let first = compute_digests(&buckets, &Hasher::new(), &DigestConfig::default());
        let second =
            compute_digests(&buckets, &Hasher::new(), &DigestConfig::default().with_io_threads(1));

        assert_eq!(first.buckets, second.buckets);
    }

    #[test]
    fn test_compute_digests_shutdown_skips_files() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            write_file(&dir, "a.txt", b"hello"),
            write_file(&dir, "b.txt", b"hello"),
        ];
        let (buckets, _) = group_by_size(files);

        let flag = Arc::new(AtomicBool::new(true));
        let config = DigestConfig::default().with_shutdown_flag(flag);
        let outcome = compute_digests(&buckets, &Hasher::new(), &config);

        assert!(outcome.stats.interrupted);
        assert_eq!(outcome.stats.skipped_files, 2);
        assert!(outcome.buckets.is_empty());
    }
}
