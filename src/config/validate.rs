// src/config/validate.rs

use std::collections::HashSet;

use crate::config::model::{PipelineFile, RawPipelineFile};
use crate::errors::{ModuleError, Result};

impl TryFrom<RawPipelineFile> for PipelineFile {
    type Error = ModuleError;

    fn try_from(raw: RawPipelineFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_pipeline(&raw)?;
        Ok(PipelineFile::new_unchecked(raw.pipeline, raw.stage))
    }
}

fn validate_raw_pipeline(cfg: &RawPipelineFile) -> Result<()> {
    ensure_has_stages(cfg)?;
    validate_pipeline_section(cfg)?;
    validate_stage_names(cfg)?;
    Ok(())
}

fn ensure_has_stages(cfg: &RawPipelineFile) -> Result<()> {
    if cfg.stage.is_empty() {
        return Err(ModuleError::Config(
            "pipeline must contain at least one [[stage]] table".to_string(),
        ));
    }
    Ok(())
}

fn validate_pipeline_section(cfg: &RawPipelineFile) -> Result<()> {
    if cfg.pipeline.retry_attempts == 0 {
        return Err(ModuleError::Config(
            "[pipeline].retry_attempts must be >= 1 (got 0)".to_string(),
        ));
    }

    let base = cfg.pipeline.retry_base_seconds;
    if !base.is_finite() || base < 0.0 {
        return Err(ModuleError::Config(format!(
            "[pipeline].retry_base_seconds must be a non-negative number (got {base})"
        )));
    }

    Ok(())
}

fn validate_stage_names(cfg: &RawPipelineFile) -> Result<()> {
    let mut seen = HashSet::new();
    for (index, stage) in cfg.stage.iter().enumerate() {
        let name = stage.name.trim();
        if name.is_empty() {
            return Err(ModuleError::Config(format!(
                "stage #{} has an empty name",
                index + 1
            )));
        }
        if !seen.insert(name) {
            return Err(ModuleError::Config(format!(
                "stage name '{name}' is used more than once"
            )));
        }
    }
    Ok(())
}
