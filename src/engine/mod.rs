// src/engine/mod.rs

//! Reusable engines the concrete modules are built from.
//!
//! - [`retry`]: exponential-backoff retry around one fallible operation.
//! - [`finder`]: glob / regex file enumeration under a root directory.
//! - [`transfer`]: per-file copy/move with directory creation, overwrite
//!   policy, retries and between-file cancellation.
//!
//! These are plain functions taking explicit configuration; modules compose
//! them rather than inheriting them.

pub mod finder;
pub mod retry;
pub mod transfer;

pub use finder::{FileMatcher, find_files, require_path};
pub use retry::{RetryPolicy, retry};
pub use transfer::{
    TransferLayout, TransferMode, TransferOptions, TransferPlanEntry, plan_entry,
    remove_source_directory, transfer_files,
};
