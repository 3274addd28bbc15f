//! Command-line interface definitions and listing rendering.
//!
//! Thin shell over the core pipeline: argument parsing via the clap
//! derive API, plus the text rendering of a duplicate listing. No
//! detection logic lives here.
//!
//! # Example
//!
//! ```bash
//! # List duplicate files under a directory
//! dupehand ~/Downloads
//!
//! # Only consider .txt files, largest duplicate sets first
//! dupehand ~/Downloads --ext .txt --sort desc
//!
//! # Group by size only, skipping content hashing
//! dupehand ~/Downloads --no-hash
//!
//! # Delete the files listed under ordinals 2 and 3
//! dupehand ~/Downloads --delete 2 3
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::duplicates::{DuplicateListing, SortOrder};

/// Duplicate file handler.
///
/// Finds duplicate files under a directory by comparing sizes and, for
/// files sharing a size, BLAKE3 content digests. Files in the listing are
/// numbered; deletion selects files by those ordinals.
#[derive(Debug, Parser)]
#[command(name = "dupehand")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan for duplicates
    #[arg(value_name = "PATH")]
    pub root: PathBuf,

    /// Only consider files with this extension (leading dot, case-sensitive)
    #[arg(long, value_name = "EXT", value_parser = parse_extension)]
    pub ext: Option<String>,

    /// Size order for the listing
    #[arg(long, value_enum, default_value = "asc")]
    pub sort: SortOrderArg,

    /// Group by size only; skip content hashing
    ///
    /// Same-size files are then reported as one set without digest
    /// verification.
    #[arg(long)]
    pub no_hash: bool,

    /// Delete the files at these listing ordinals (space-separated)
    #[arg(long, value_name = "ORDINAL", num_args = 1..)]
    pub delete: Option<Vec<usize>>,

    /// Skip the confirmation prompt before deleting
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Number of I/O threads for hashing (default: 4)
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N", default_value = "4")]
    pub io_threads: usize,

    /// Increase verbosity level (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Emit fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

/// Size order argument for the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortOrderArg {
    /// Smallest sizes first
    Asc,
    /// Largest sizes first
    Desc,
}

impl From<SortOrderArg> for SortOrder {
    fn from(arg: SortOrderArg) -> Self {
        match arg {
            SortOrderArg::Asc => SortOrder::Ascending,
            SortOrderArg::Desc => SortOrder::Descending,
        }
    }
}

/// Validate an extension filter: leading dot plus a non-empty name.
fn parse_extension(value: &str) -> Result<String, String> {
    if !value.starts_with('.') || value.len() < 2 {
        return Err(format!(
            "extension must include the leading dot, e.g. '.txt' (got '{value}')"
        ));
    }
    Ok(value.to_string())
}

/// Render a listing as `<size> bytes` / `Hash: <digest>` /
/// `<ordinal>. <path>` groupings.
#[must_use]
pub fn render_listing(listing: &DuplicateListing) -> String {
    let mut out = String::new();
    let mut last_size = None;

    for group in &listing.groups {
        if last_size != Some(group.size) {
            out.push_str(&format!("\n{} bytes\n", group.size));
            last_size = Some(group.size);
        }
        if let Some(hex) = group.digest_hex() {
            out.push_str(&format!("Hash: {hex}\n"));
        }
        for file in &group.files {
            out.push_str(&format!("{}. {}\n", file.ordinal, file.entry.path.display()));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duplicates::{build_listing, group_by_size};
    use crate::scanner::FileEntry;
    use clap::CommandFactory;

    #[test]
    fn test_cli_verifies() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_extension() {
        assert_eq!(parse_extension(".txt").unwrap(), ".txt");
        assert!(parse_extension("txt").is_err());
        assert!(parse_extension(".").is_err());
    }

    #[test]
    fn test_sort_order_mapping() {
        assert_eq!(SortOrder::from(SortOrderArg::Asc), SortOrder::Ascending);
        assert_eq!(SortOrder::from(SortOrderArg::Desc), SortOrder::Descending);
    }

    #[test]
    fn test_render_listing_empty() {
        let listing = DuplicateListing::default();
        assert_eq!(render_listing(&listing), "");
    }

    #[test]
    fn test_render_listing_size_only() {
        let files = vec![
            FileEntry::new(PathBuf::from("/a.txt"), 5),
            FileEntry::new(PathBuf::from("/b.txt"), 5),
        ];
        let (buckets, _) = group_by_size(files);
        let listing = build_listing(&buckets, None, SortOrder::Ascending);

        let out = render_listing(&listing);
        assert_eq!(out, "\n5 bytes\n1. /a.txt\n2. /b.txt\n");
    }

    #[test]
    fn test_render_listing_shares_size_header_across_digests() {
        use crate::duplicates::{DuplicateGroup, ListedFile};

        let listing = DuplicateListing {
            groups: vec![
                DuplicateGroup {
                    size: 5,
                    digest: Some([0u8; 32]),
                    files: vec![ListedFile {
                        ordinal: 1,
                        entry: FileEntry::new(PathBuf::from("/a"), 5),
                    }],
                },
                DuplicateGroup {
                    size: 5,
                    digest: Some([1u8; 32]),
                    files: vec![ListedFile {
                        ordinal: 2,
                        entry: FileEntry::new(PathBuf::from("/b"), 5),
                    }],
                },
            ],
            sort_order: SortOrder::Ascending,
        };

        let out = render_listing(&listing);
        assert_eq!(out.matches("5 bytes").count(), 1);
        assert_eq!(out.matches("Hash: ").count(), 2);
    }
}
