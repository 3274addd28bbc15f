//! Size-based file bucketing (Phase 1 of duplicate detection).
//!
//! # Overview
//!
//! Files with different sizes cannot be duplicates, so bucketing by exact
//! byte size eliminates most candidates before any file content is read.
//! Singleton buckets are retained in the structure (callers may want
//! total-size statistics) but treated as non-duplicates downstream.
//!
//! # Example
//!
//! ```
//! use dupehand::scanner::FileEntry;
//! use dupehand::duplicates::group_by_size;
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     FileEntry::new(PathBuf::from("/file1.txt"), 1024),
//!     FileEntry::new(PathBuf::from("/file2.txt"), 1024),
//!     FileEntry::new(PathBuf::from("/file3.txt"), 2048),
//! ];
//!
//! let (buckets, stats) = group_by_size(files);
//!
//! assert_eq!(buckets.len(), 2);          // singleton buckets are kept
//! assert_eq!(stats.potential_duplicates, 2);  // the two 1024-byte files
//! ```

use std::collections::BTreeMap;

use crate::scanner::FileEntry;

/// Files partitioned by exact byte size.
///
/// Insertion order within a bucket is walk order, which is deterministic
/// because the walker sorts directory children. A `BTreeMap` keeps sizes
/// in ascending order for the extraction phase.
pub type SizeBuckets = BTreeMap<u64, Vec<FileEntry>>;

/// Statistics from the size bucketing phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files bucketed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of distinct file sizes
    pub unique_sizes: usize,
    /// Number of files sharing a size with at least one other file
    pub potential_duplicates: usize,
    /// Number of buckets with 2+ files
    pub duplicate_buckets: usize,
    /// Number of singleton buckets (files with a unique size)
    pub singleton_buckets: usize,
}

impl GroupingStats {
    /// Percentage of files ruled out by size bucketing alone.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.singleton_buckets as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Bucket files by exact byte size (Phase 1 of duplicate detection).
///
/// Pure aggregation: O(n) in entry count, no file I/O (sizes were
/// obtained during the walk, not re-stat'd). Singleton buckets are kept;
/// downstream phases skip them.
///
/// # Example
///
/// ```
/// use dupehand::scanner::FileEntry;
/// use dupehand::duplicates::group_by_size;
/// use std::path::PathBuf;
///
/// let files = vec![
///     FileEntry::new(PathBuf::from("/a.txt"), 100),
///     FileEntry::new(PathBuf::from("/b.txt"), 100),
///     FileEntry::new(PathBuf::from("/c.txt"), 200),
/// ];
///
/// let (buckets, stats) = group_by_size(files);
///
/// assert_eq!(buckets[&100].len(), 2);
/// assert_eq!(buckets[&200].len(), 1);
/// assert_eq!(stats.duplicate_buckets, 1);
/// ```
#[must_use]
pub fn group_by_size(
    files: impl IntoIterator<Item = FileEntry>,
) -> (SizeBuckets, GroupingStats) {
    let mut buckets: SizeBuckets = BTreeMap::new();
    let mut stats = GroupingStats::default();

    for file in files {
        stats.total_files += 1;
        stats.total_size += file.size;
        buckets.entry(file.size).or_default().push(file);
    }

    stats.unique_sizes = buckets.len();
    for (size, entries) in &buckets {
        if entries.len() > 1 {
            stats.duplicate_buckets += 1;
            stats.potential_duplicates += entries.len();
            log::debug!(
                "Size bucket {} bytes: {} potential duplicates",
                size,
                entries.len()
            );
        } else {
            stats.singleton_buckets += 1;
            log::trace!(
                "Singleton size {}: {}",
                size,
                entries[0].path.display()
            );
        }
    }

    log::info!(
        "Phase 1 complete: {} files -> {} potential duplicates ({:.1}% eliminated)",
        stats.total_files,
        stats.potential_duplicates,
        stats.elimination_rate()
    );

    (buckets, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn make_file(path: &str, size: u64) -> FileEntry {
        FileEntry::new(PathBuf::from(path), size)
    }

    #[test]
    fn test_group_by_size_empty_input() {
        let (buckets, stats) = group_by_size(vec![]);
        assert!(buckets.is_empty());
        assert_eq!(stats, GroupingStats::default());
    }

    #[test]
    fn test_group_by_size_all_unique() {
        let files = vec![
            make_file("/a.txt", 100),
            make_file("/b.txt", 200),
            make_file("/c.txt", 300),
        ];
        let (buckets, stats) = group_by_size(files);

        // Singletons are retained, not pruned
        assert_eq!(buckets.len(), 3);
        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.unique_sizes, 3);
        assert_eq!(stats.singleton_buckets, 3);
        assert_eq!(stats.potential_duplicates, 0);
        assert_eq!(stats.duplicate_buckets, 0);
    }

    #[test]
    fn test_group_by_size_with_duplicates() {
        let files = vec![
            make_file("/a.txt", 100),
            make_file("/b.txt", 100),
            make_file("/c.txt", 200),
        ];
        let (buckets, stats) = group_by_size(files);

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[&100].len(), 2);
        assert_eq!(buckets[&200].len(), 1);

        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.potential_duplicates, 2);
        assert_eq!(stats.duplicate_buckets, 1);
        assert_eq!(stats.singleton_buckets, 1);
    }

    #[test]
    fn test_group_by_size_preserves_insertion_order() {
        let files = vec![
            make_file("/z.txt", 100),
            make_file("/a.txt", 100),
            make_file("/m.txt", 100),
        ];
        let (buckets, _) = group_by_size(files);

        let paths: Vec<_> = buckets[&100].iter().map(|f| f.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/z.txt"),
                PathBuf::from("/a.txt"),
                PathBuf::from("/m.txt"),
            ]
        );
    }

    #[test]
    fn test_group_by_size_sizes_ascend() {
        let files = vec![
            make_file("/big.txt", 300),
            make_file("/small.txt", 100),
            make_file("/mid.txt", 200),
        ];
        let (buckets, _) = group_by_size(files);
        let sizes: Vec<u64> = buckets.keys().copied().collect();
        assert_eq!(sizes, vec![100, 200, 300]);
    }

    #[test]
    fn test_group_by_size_empty_files_bucketed_together() {
        let files = vec![make_file("/e1.txt", 0), make_file("/e2.txt", 0)];
        let (buckets, stats) = group_by_size(files);

        assert_eq!(buckets[&0].len(), 2);
        assert_eq!(stats.potential_duplicates, 2);
    }

    #[test]
    fn test_group_by_size_total_size() {
        let files = vec![
            make_file("/a.txt", 100),
            make_file("/b.txt", 200),
            make_file("/c.txt", 300),
        ];
        let (_, stats) = group_by_size(files);
        assert_eq!(stats.total_size, 600);
    }

    #[test]
    fn test_elimination_rate() {
        let files = vec![
            make_file("/a.txt", 100),
            make_file("/b.txt", 100),
            make_file("/c.txt", 200),
            make_file("/d.txt", 300),
        ];
        let (_, stats) = group_by_size(files);
        assert!((stats.elimination_rate() - 50.0).abs() < 0.1);
    }

    #[test]
    fn test_elimination_rate_empty() {
        assert_eq!(GroupingStats::default().elimination_rate(), 0.0);
    }
}
