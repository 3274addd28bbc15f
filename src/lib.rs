//! dupehand - Duplicate File Handler
//!
//! Finds duplicate files under a directory tree by comparing file sizes
//! and, for files sharing a size, BLAKE3 content digests, then optionally
//! deletes a user-selected subset of the duplicates.
//!
//! The detection pipeline is:
//! recursive scan → size bucketing → selective hashing → duplicate-set
//! extraction → deletion with space accounting.

pub mod actions;
pub mod cli;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod scanner;

use std::collections::BTreeSet;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};

pub use pipeline::{scan_and_group, PipelineConfig, ScanOutcome};

use crate::actions::delete_by_ordinals;
use crate::cli::{render_listing, Cli};
use crate::duplicates::{build_listing, compute_digests, DigestConfig};
use crate::error::ExitCode;
use crate::scanner::Hasher;

/// Run the application end to end and map the result to an exit code.
///
/// This is the thin shell around the core pipeline: it wires the CLI
/// arguments into a [`PipelineConfig`], renders the listing, and drives
/// deletion by ordinal after confirmation.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&shutdown);
        ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
            .context("failed to install Ctrl+C handler")?;
    }

    let config = PipelineConfig::new(cli.root.clone())
        .with_extension_filter(cli.ext.clone())
        .with_io_threads(cli.io_threads)
        .with_shutdown_flag(Arc::clone(&shutdown));

    let scan = scan_and_group(&config).context("scan failed")?;
    for error in &scan.errors {
        eprintln!("Warning: {error}");
    }

    let digests = if cli.no_hash {
        None
    } else {
        let digest_config = DigestConfig::default()
            .with_io_threads(config.io_threads)
            .with_shutdown_flag(Arc::clone(&shutdown));
        let outcome = compute_digests(&scan.buckets, &Hasher::new(), &digest_config);
        for error in &outcome.errors {
            eprintln!("Warning: {error}");
        }
        Some(outcome)
    };

    if shutdown.load(Ordering::SeqCst) {
        return Ok(ExitCode::Interrupted);
    }

    let listing = build_listing(
        &scan.buckets,
        digests.as_ref().map(|o| &o.buckets),
        cli.sort.into(),
    );
    print!("{}", render_listing(&listing));

    let mut had_errors =
        scan.is_partial() || digests.as_ref().is_some_and(|o| !o.errors.is_empty());

    if let Some(ordinals) = &cli.delete {
        let selection: BTreeSet<usize> = ordinals.iter().copied().collect();
        if listing.is_empty() {
            println!("\nNothing to delete: no duplicates found");
        } else if cli.yes || confirm_deletion(selection.len())? {
            let report = delete_by_ordinals(&listing, &selection);
            println!("\n{}", report.summary());
            for failure in &report.failures {
                eprintln!("Warning: {}", failure.message);
            }
            had_errors = had_errors || !report.all_succeeded();
        } else {
            println!("\nDeletion cancelled");
        }
    }

    if shutdown.load(Ordering::SeqCst) {
        Ok(ExitCode::Interrupted)
    } else {
        Ok(completion_code(listing.is_empty(), had_errors))
    }
}

/// Map a completed run to its exit code.
///
/// Recoverable errors take precedence over the no-duplicates outcome: a
/// run that skipped subtrees must not report a clean empty result, since
/// the skipped subtrees may well have held duplicates.
fn completion_code(no_duplicates: bool, had_errors: bool) -> ExitCode {
    if had_errors {
        ExitCode::PartialSuccess
    } else if no_duplicates {
        ExitCode::NoDuplicates
    } else {
        ExitCode::Success
    }
}


/// Ask the user to confirm a deletion batch. Defaults to no.
fn confirm_deletion(count: usize) -> Result<bool> {
    print!("\nDelete {count} file(s)? This cannot be undone. [y/N] ");
    std::io::stdout().flush().context("failed to flush stdout")?;

    let mut answer = String::new();
    std::io::stdin()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
