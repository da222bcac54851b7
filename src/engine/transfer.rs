// src/engine/transfer.rs

//! Shared copy/move logic behind the file and directory transfer modules.
//!
//! Files are processed one at a time, in the order given. For each file:
//! 1. compute its destination (tree layouts keep the path relative to the
//!    source root, flat layouts keep only the file name);
//! 2. create the destination's parent directory if needed (retried);
//! 3. copy the file (retried, except for overwrite conflicts; a partial
//!    copy left by a failed attempt is removed before the next one);
//! 4. for moves, delete the source file (retried);
//! 5. record the destination.
//!
//! Cancellation is checked before each file; a copy that has started is
//! never interrupted. The first failing file aborts the whole transfer and
//! files already transferred stay where they are.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::engine::retry::{RetryPolicy, retry};
use crate::errors::{ModuleError, Result};
use crate::fs::FileSystem;
use crate::module::{LogMessage, ModuleCore, ModuleLog};

/// Copy leaves the source in place; Move deletes it after a successful copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMode {
    #[default]
    Copy,
    Move,
}

impl TransferMode {
    fn verb(self) -> &'static str {
        match self {
            TransferMode::Copy => "copy",
            TransferMode::Move => "move",
        }
    }
}

impl fmt::Display for TransferMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// How a source file maps onto the destination root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferLayout {
    /// Mirror the directory structure below `source_root`.
    Tree { source_root: PathBuf },
    /// Put every file directly into the destination root.
    Flat,
}

/// Per-file plan, computed during a run and discarded afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlanEntry {
    pub source: PathBuf,
    pub relative_dir: PathBuf,
    pub destination: PathBuf,
}

#[derive(Debug, Clone)]
pub struct TransferOptions {
    pub mode: TransferMode,
    pub destination_root: PathBuf,
    pub overwrite: bool,
    pub retry: RetryPolicy,
}

/// Work out where `source` goes under `destination_root`.
pub fn plan_entry(
    source: &Path,
    layout: &TransferLayout,
    destination_root: &Path,
) -> Result<TransferPlanEntry> {
    let file_name = source.file_name().ok_or_else(|| {
        ModuleError::Validation(format!("source {source:?} does not name a file"))
    })?;

    let relative_dir = match layout {
        TransferLayout::Flat => PathBuf::new(),
        TransferLayout::Tree { source_root } => source
            .parent()
            .and_then(|dir| dir.strip_prefix(source_root).ok())
            .map(Path::to_path_buf)
            .ok_or_else(|| {
                ModuleError::Validation(format!(
                    "source {source:?} is not below {source_root:?}"
                ))
            })?,
    };

    let destination = destination_root.join(&relative_dir).join(file_name);
    if destination == source {
        return Err(ModuleError::Validation(format!(
            "source and destination are the same file: {source:?}"
        )));
    }

    Ok(TransferPlanEntry {
        source: source.to_path_buf(),
        relative_dir,
        destination,
    })
}

/// Transfer `files` and return their destinations in the same order.
pub async fn transfer_files(
    core: &ModuleCore,
    files: &[PathBuf],
    layout: &TransferLayout,
    options: &TransferOptions,
) -> Result<Vec<PathBuf>> {
    options.retry.validate()?;

    let mut destinations = Vec::with_capacity(files.len());
    for source in files {
        if core.cancel.is_cancelled() {
            core.log.warn(format!(
                "Cancellation requested; stopping before \"{}\"",
                source.display()
            ));
            return Err(ModuleError::Cancelled);
        }

        match transfer_one(core, source, layout, options).await {
            Ok(destination) => destinations.push(destination),
            Err(ModuleError::Cancelled) => return Err(ModuleError::Cancelled),
            Err(err) => {
                // Name the failing file; the error detail travels with the error.
                core.log.error(format!(
                    "Failed to {} file \"{}\"",
                    options.mode,
                    source.display()
                ));
                core.log.error(LogMessage::failure(&err));
                return Err(err);
            }
        }
    }

    Ok(destinations)
}

async fn transfer_one(
    core: &ModuleCore,
    source: &Path,
    layout: &TransferLayout,
    options: &TransferOptions,
) -> Result<PathBuf> {
    let entry = plan_entry(source, layout, &options.destination_root)?;
    let fs: &dyn FileSystem = core.fs.as_ref();
    let log = &core.log;
    let destination = entry.destination.as_path();
    let overwrite = options.overwrite;

    if let Some(parent) = destination.parent() {
        if !fs.is_dir(parent).await {
            retry(&options.retry, log, &core.cancel, move || async move {
                fs.create_dir_all(parent)
                    .await
                    .map_err(|e| ModuleError::io(parent, e))
            })
            .await?;
        }
    }

    // Conflicts are decided once, against what existed before the first attempt.
    let existed = fs.exists(destination).await;
    if existed && !overwrite {
        return Err(ModuleError::OverwriteConflict(destination.to_path_buf()));
    }

    retry(&options.retry, log, &core.cancel, move || async move {
        log.info(format!(
            "Copying file \"{}\" to \"{}\"",
            source.display(),
            destination.display()
        ));
        match fs.copy_file(source, destination, overwrite).await {
            Ok(_) => Ok(()),
            Err(e) if !overwrite && e.kind() == ErrorKind::AlreadyExists => {
                Err(ModuleError::OverwriteConflict(destination.to_path_buf()))
            }
            Err(e) => {
                if !existed {
                    discard_partial_copy(fs, log, destination).await;
                }
                Err(ModuleError::io(source, e))
            }
        }
    })
    .await?;

    if options.mode == TransferMode::Move {
        retry(&options.retry, log, &core.cancel, move || async move {
            log.info(format!("Deleting file \"{}\"", source.display()));
            fs.remove_file(source)
                .await
                .map_err(|e| ModuleError::io(source, e))
        })
        .await?;
    }

    Ok(entry.destination)
}

/// Remove whatever a failed copy attempt left at `destination`, so the next
/// attempt starts from a missing file.
async fn discard_partial_copy(fs: &dyn FileSystem, log: &ModuleLog, destination: &Path) {
    if !fs.is_file(destination).await {
        return;
    }
    if let Err(e) = fs.remove_file(destination).await {
        log.warn(format!(
            "Could not remove partial copy \"{}\": {e}",
            destination.display()
        ));
    }
}

/// Delete the source directory of a move once its files are gone.
///
/// Recursive moves remove the whole (now file-less) tree. Top-level moves
/// only remove the directory if nothing is left in it; nested content that
/// was not part of the move stays in place.
pub async fn remove_source_directory(
    core: &ModuleCore,
    directory: &Path,
    recursive: bool,
    policy: &RetryPolicy,
) -> Result<()> {
    core.check_cancelled()?;
    let fs: &dyn FileSystem = core.fs.as_ref();
    let log = &core.log;

    let outcome = if recursive {
        retry(policy, log, &core.cancel, move || async move {
            log.info(format!("Deleting directory \"{}\"", directory.display()));
            fs.remove_dir_all(directory)
                .await
                .map_err(|e| ModuleError::io(directory, e))
        })
        .await
    } else {
        match fs.read_dir(directory).await {
            Ok(remaining) if !remaining.is_empty() => {
                log.info(format!(
                    "Directory \"{}\" still holds {} entries; leaving it in place",
                    directory.display(),
                    remaining.len()
                ));
                return Ok(());
            }
            Ok(_) => {
                retry(policy, log, &core.cancel, move || async move {
                    log.info(format!("Deleting directory \"{}\"", directory.display()));
                    fs.remove_dir(directory)
                        .await
                        .map_err(|e| ModuleError::io(directory, e))
                })
                .await
            }
            Err(e) => Err(ModuleError::io(directory, e)),
        }
    };

    if let Err(err) = &outcome {
        if !err.is_cancelled() {
            log.error(format!(
                "Failed to delete directory \"{}\"",
                directory.display()
            ));
            log.error(LogMessage::failure(err));
        }
    }
    outcome
}
