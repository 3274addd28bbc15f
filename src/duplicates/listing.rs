//! Duplicate set extraction and ordinal assignment.
//!
//! # Overview
//!
//! A [`DuplicateListing`] flattens the digest buckets (or the raw size
//! buckets when hashing was skipped) into an ordered sequence of duplicate
//! sets, assigning every file a 1-based ordinal. The listing is the single
//! source of truth for deletion: ordinals are resolved against it, never
//! re-derived by repeating the traversal, so the listing pass and the
//! deletion pass can never disagree about which file an ordinal names.
//!
//! # Ordering
//!
//! Outer groups are ordered by size according to [`SortOrder`]. Within one
//! size, digest groups are ordered by lexical digest value; within one
//! group, files keep walk order. All three orders are deterministic for a
//! given (root, filter, sort order) triple, so ordinals are reproducible
//! even when hashing ran in parallel.

use serde::{Deserialize, Serialize};

use super::digest::DigestBuckets;
use super::groups::SizeBuckets;
use crate::scanner::{digest_to_hex, Digest, FileEntry};

/// Size order for the outer groups of a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    /// Smallest sizes first
    #[default]
    Ascending,
    /// Largest sizes first
    Descending,
}

/// One file in a listing, addressable by its ordinal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedFile {
    /// 1-based position across the whole listing
    pub ordinal: usize,
    /// The file this ordinal names
    pub entry: FileEntry,
}

/// One duplicate set: files sharing a size and, if hashing ran, a digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Byte size shared by every file in the set
    pub size: u64,
    /// Content digest shared by the set; `None` when hashing was skipped
    pub digest: Option<Digest>,
    /// Members in walk order, each with its assigned ordinal
    pub files: Vec<ListedFile>,
}

impl DuplicateGroup {
    /// Number of files in this set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Digest as a hex string, when hashing ran.
    #[must_use]
    pub fn digest_hex(&self) -> Option<String> {
        self.digest.as_ref().map(digest_to_hex)
    }

    /// Space recoverable by keeping one copy of this set.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * (self.files.len().saturating_sub(1) as u64)
    }
}

/// An ordered listing of duplicate sets with stable ordinals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateListing {
    /// Duplicate sets in emission order
    pub groups: Vec<DuplicateGroup>,
    /// Size order the listing was built with
    pub sort_order: SortOrder,
}

impl DuplicateListing {
    /// Check if no duplicates were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of duplicate sets.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Total number of listed files, which equals the highest ordinal.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.groups.iter().map(DuplicateGroup::len).sum()
    }

    /// Resolve an ordinal to its file entry.
    ///
    /// Returns `None` for ordinals outside `1..=file_count()`.
    #[must_use]
    pub fn resolve(&self, ordinal: usize) -> Option<&FileEntry> {
        if ordinal == 0 {
            return None;
        }
        self.iter_files()
            .find(|f| f.ordinal == ordinal)
            .map(|f| &f.entry)
    }

    /// Iterate all listed files in ordinal order.
    pub fn iter_files(&self) -> impl Iterator<Item = &ListedFile> {
        self.groups.iter().flat_map(|g| g.files.iter())
    }

    /// Total space recoverable by keeping one copy per set.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.groups.iter().map(DuplicateGroup::wasted_space).sum()
    }
}

/// Build a [`DuplicateListing`] from the bucketing phases.
///
/// When `digest_buckets` is `Some`, groups are digest-level duplicate
/// sets; otherwise same-size sets are emitted directly. Only sets with 2+
/// members appear; an empty listing means no duplicates were found (not
/// an error). Ordinals are assigned sequentially as groups are emitted.
///
/// # Example
///
/// ```
/// use dupehand::duplicates::{build_listing, group_by_size, SortOrder};
/// use dupehand::scanner::FileEntry;
/// use std::path::PathBuf;
///
/// let files = vec![
///     FileEntry::new(PathBuf::from("/a.txt"), 5),
///     FileEntry::new(PathBuf::from("/b.txt"), 5),
/// ];
/// let (buckets, _) = group_by_size(files);
/// let listing = build_listing(&buckets, None, SortOrder::Ascending);
///
/// assert_eq!(listing.file_count(), 2);
/// assert_eq!(listing.resolve(1).unwrap().path, PathBuf::from("/a.txt"));
/// ```
#[must_use]
pub fn build_listing(
    size_buckets: &SizeBuckets,
    digest_buckets: Option<&DigestBuckets>,
    sort_order: SortOrder,
) -> DuplicateListing {
    let mut listing = DuplicateListing {
        groups: Vec::new(),
        sort_order,
    };
    let mut next_ordinal = 1usize;

    let mut sizes: Vec<u64> = size_buckets.keys().copied().collect();
    if sort_order == SortOrder::Descending {
        sizes.reverse();
    }

    for size in sizes {
        match digest_buckets {
            Some(digests) => {
                let Some(sub_buckets) = digests.get(&size) else {
                    continue;
                };
                // BTreeMap iteration gives lexical digest order
                for (digest, files) in sub_buckets {
                    if files.len() < 2 {
                        continue;
                    }
                    listing.groups.push(make_group(
                        size,
                        Some(*digest),
                        files,
                        &mut next_ordinal,
                    ));
                }
            }
            None => {
                let files = &size_buckets[&size];
                if files.len() < 2 {
                    continue;
                }
                listing
                    .groups
                    .push(make_group(size, None, files, &mut next_ordinal));
            }
        }
    }

    log::info!(
        "Listing built: {} duplicate sets, {} files, {} bytes recoverable",
        listing.group_count(),
        listing.file_count(),
        listing.wasted_space()
    );

    listing
}

fn make_group(
    size: u64,
    digest: Option<Digest>,
    files: &[FileEntry],
    next_ordinal: &mut usize,
) -> DuplicateGroup {
    let files = files
        .iter()
        .map(|entry| {
            let ordinal = *next_ordinal;
            *next_ordinal += 1;
            ListedFile {
                ordinal,
                entry: entry.clone(),
            }
        })
        .collect();
    DuplicateGroup {
        size,
        digest,
        files,
    }
}
