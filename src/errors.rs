// src/errors.rs

//! Crate-wide error taxonomy and `Result` alias.
//!
//! The variants map onto the failure classes a module can surface:
//! - `Validation`: required configuration missing or malformed, raised before
//!   any I/O and never retried.
//! - `Io`: a filesystem operation failed. Inside a retry scope this is the
//!   transient kind; once it escapes a module the retries are exhausted.
//! - `OverwriteConflict`: the destination exists and overwrite is disabled.
//!   Never retried.
//! - `ProcessFailure`: an external process could not be launched or waited on.
//! - `Cancelled`: the module observed its cancellation signal.

use std::path::PathBuf;

use thiserror::Error;

use crate::modules::ProcessResult;

#[derive(Error, Debug)]
pub enum ModuleError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Destination already exists and overwrite is disabled: {0:?}")]
    OverwriteConflict(PathBuf),

    #[error("Process failure: {}", .0.error_message.as_deref().unwrap_or("unknown error"))]
    ProcessFailure(Box<ProcessResult>),

    #[error("Module cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ModuleError {
    /// Wrap an I/O error together with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ModuleError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether a retry scope may try the failed operation again.
    pub fn is_transient(&self) -> bool {
        matches!(self, ModuleError::Io { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ModuleError::Cancelled)
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ModuleError>;
