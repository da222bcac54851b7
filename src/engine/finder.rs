// src/engine/finder.rs

//! File enumeration under a root directory, filtered by glob or regex.
//!
//! Patterns are tested against the file *name* only. Results keep the
//! filesystem's enumeration order: the files of a directory come before the
//! files of its subdirectories, which are visited breadth-first.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use regex::Regex;

use crate::errors::{ModuleError, Result};
use crate::fs::FileSystem;

/// Name filter applied to every enumerated file.
#[derive(Debug, Clone)]
pub enum FileMatcher {
    Any,
    Glob(GlobMatcher),
    Regex(Regex),
}

impl FileMatcher {
    /// Wildcard pattern with `*` and `?`; every other character is literal.
    /// An empty pattern matches everything.
    ///
    /// Matching is case-insensitive on Windows, like the native shell.
    pub fn glob(pattern: &str) -> Result<Self> {
        let pattern = pattern.trim();
        if pattern.is_empty() || pattern == "*" {
            return Ok(FileMatcher::Any);
        }
        let glob = GlobBuilder::new(&wildcard_to_glob(pattern))
            .case_insensitive(cfg!(windows))
            .build()
            .map_err(|e| ModuleError::Validation(format!("invalid glob pattern {pattern:?}: {e}")))?;
        Ok(FileMatcher::Glob(glob.compile_matcher()))
    }

    /// Regular expression searched (unanchored) in the file name.
    pub fn regex(pattern: &str) -> Result<Self> {
        if pattern.trim().is_empty() {
            return Err(ModuleError::Validation("Regex pattern is empty".to_string()));
        }
        let regex = Regex::new(pattern)
            .map_err(|e| ModuleError::Validation(format!("invalid regex {pattern:?}: {e}")))?;
        Ok(FileMatcher::Regex(regex))
    }

    pub fn is_match(&self, file_name: &str) -> bool {
        match self {
            FileMatcher::Any => true,
            FileMatcher::Glob(glob) => glob.is_match(file_name),
            FileMatcher::Regex(regex) => regex.is_match(file_name),
        }
    }
}

/// Rewrite a shell wildcard as a globset pattern. Brackets and braces are
/// escaped, and runs of `*` collapse to one.
fn wildcard_to_glob(pattern: &str) -> String {
    let mut glob = String::with_capacity(pattern.len());
    let mut literal = String::new();
    for c in pattern.chars() {
        if c == '*' || c == '?' {
            glob.push_str(&globset::escape(&literal));
            literal.clear();
            if !(c == '*' && glob.ends_with('*')) {
                glob.push(c);
            }
        } else {
            literal.push(c);
        }
    }
    glob.push_str(&globset::escape(&literal));
    glob
}

/// Fail with a validation error if a required path field is blank.
pub fn require_path(path: &Path, what: &str) -> Result<()> {
    if path.as_os_str().to_string_lossy().trim().is_empty() {
        return Err(ModuleError::Validation(format!("{what} path is empty")));
    }
    Ok(())
}

/// Enumerate files under `root` whose names satisfy `matcher`.
///
/// With `recursive = false` only the immediate children of `root` are
/// considered.
pub async fn find_files(
    fs: &dyn FileSystem,
    root: &Path,
    matcher: &FileMatcher,
    recursive: bool,
) -> Result<Vec<PathBuf>> {
    require_path(root, "Source directory")?;

    let mut files = Vec::new();
    let mut pending = VecDeque::from([root.to_path_buf()]);

    while let Some(dir) = pending.pop_front() {
        let entries = fs
            .read_dir(&dir)
            .await
            .map_err(|e| ModuleError::io(&dir, e))?;

        for path in entries {
            if fs.is_dir(&path).await {
                if recursive {
                    pending.push_back(path);
                }
            } else if fs.is_file(&path).await {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy())
                    .unwrap_or_default();
                if matcher.is_match(&name) {
                    files.push(path);
                }
            }
        }
    }

    Ok(files)
}
