//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file bucketing (Phase 1)
//! - Content digest bucketing (Phase 2)
//! - Duplicate listing with stable ordinals

pub mod digest;
pub mod groups;
pub mod listing;

pub use digest::{compute_digests, DigestBuckets, DigestConfig, DigestOutcome, DigestStats};
pub use groups::{group_by_size, GroupingStats, SizeBuckets};
pub use listing::{build_listing, DuplicateGroup, DuplicateListing, ListedFile, SortOrder};
