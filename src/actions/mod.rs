//! File actions module.
//!
//! Deletion is destructive and irreversible; the executor only ever acts
//! on paths explicitly selected by the caller, keyed by ordinal from a
//! [`crate::duplicates::DuplicateListing`]. It never infers "the other
//! copy" on its own.

pub mod delete;

pub use delete::{
    delete_by_ordinals, delete_files, DeleteError, DeleteFailure, DeleteReport, DeletedFile,
};
