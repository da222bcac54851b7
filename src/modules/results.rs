// src/modules/results.rs

//! Result records returned by the concrete modules. Each run builds a fresh
//! value and hands it to the caller.

use std::path::PathBuf;

/// Paths produced by a finder or transfer, in enumeration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilePathsResult {
    pub file_paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilePathResult {
    pub file_path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadLinesResult {
    pub lines: Vec<String>,
}

/// Outcome of an external process.
///
/// A non-zero exit code is not an error by itself; callers decide. The
/// error fields are only filled when the process could not be launched or
/// waited on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessResult {
    pub exit_code: i32,
    pub error_message: Option<String>,
    pub error_detail: Option<String>,
}

impl ProcessResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0 && self.error_message.is_none()
    }
}
