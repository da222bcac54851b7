// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{PipelineFile, RawPipelineFile};
use crate::errors::{ModuleError, Result};

/// Read and deserialize a pipeline file without semantic validation.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawPipelineFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| ModuleError::io(path, e))?;
    parse_str(&contents)
}

pub fn parse_str(contents: &str) -> Result<RawPipelineFile> {
    let raw: RawPipelineFile = toml::from_str(contents)?;
    Ok(raw)
}

/// Load a pipeline file and validate it.
///
/// Checks that there is at least one stage, that stage names are unique and
/// non-empty, and that the retry settings are usable. Per-stage module
/// configuration is validated later, by each module before it does any I/O.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<PipelineFile> {
    let raw = load_from_path(&path)?;
    PipelineFile::try_from(raw)
}
