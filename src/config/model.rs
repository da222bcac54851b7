// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::engine::{RetryPolicy, TransferMode, retry::DEFAULT_MAX_ATTEMPTS};
use crate::modules::TextEncoding;
use crate::process::ArgumentDescriptor;

/// Pipeline file exactly as deserialized from TOML.
///
/// ```toml
/// [pipeline]
/// name = "nightly"
/// retry_attempts = 5
///
/// [[stage]]
/// name = "mirror inputs"
/// module = "copy_directory"
/// source_directory = "in"
/// destination_directory = "out"
/// recursive = true
/// ```
///
/// Convert into [`PipelineFile`] with `TryFrom` to validate it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPipelineFile {
    #[serde(default)]
    pub pipeline: PipelineSection,

    /// `[[stage]]` tables, in execution order.
    #[serde(default)]
    pub stage: Vec<StageConfig>,
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSection {
    #[serde(default = "default_pipeline_name")]
    pub name: String,

    /// Total attempts per file operation in transfer stages.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Backoff base in seconds; the wait after attempt `n` is `base * 2^n`.
    #[serde(default = "default_retry_base_seconds")]
    pub retry_base_seconds: f64,
}

fn default_pipeline_name() -> String {
    "pipeline".to_string()
}

fn default_retry_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_retry_base_seconds() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            name: default_pipeline_name(),
            retry_attempts: default_retry_attempts(),
            retry_base_seconds: default_retry_base_seconds(),
        }
    }
}

/// One `[[stage]]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct StageConfig {
    pub name: String,

    #[serde(flatten)]
    pub kind: StageKind,
}

/// Stage kind, selected by the `module` key.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "module", rename_all = "snake_case")]
pub enum StageKind {
    FindFiles {
        source_directory: PathBuf,
        #[serde(default)]
        search_pattern: String,
        #[serde(default)]
        recursive: bool,
    },
    RegexFindFiles {
        source_directory: PathBuf,
        regex_pattern: String,
        #[serde(default)]
        recursive: bool,
    },
    CopyFiles {
        source_file_paths: Vec<PathBuf>,
        destination_directory: PathBuf,
        #[serde(default)]
        overwrite: bool,
    },
    MoveFiles {
        source_file_paths: Vec<PathBuf>,
        destination_directory: PathBuf,
        #[serde(default)]
        overwrite: bool,
    },
    CopyDirectory {
        source_directory: PathBuf,
        destination_directory: PathBuf,
        #[serde(default)]
        recursive: bool,
        #[serde(default)]
        overwrite: bool,
    },
    MoveDirectory {
        source_directory: PathBuf,
        destination_directory: PathBuf,
        #[serde(default)]
        recursive: bool,
        #[serde(default)]
        overwrite: bool,
    },
    TransferFiles {
        #[serde(default)]
        transfer_mode: TransferMode,
        source_directory: PathBuf,
        #[serde(default)]
        search_pattern: String,
        #[serde(default)]
        recursive: bool,
        destination_directory: PathBuf,
        #[serde(default)]
        overwrite: bool,
    },
    FileList {
        file_paths: Vec<PathBuf>,
        file_path: PathBuf,
        #[serde(default = "default_true")]
        include_directory_path: bool,
        #[serde(default)]
        overwrite: bool,
    },
    ReadLines {
        file_path: PathBuf,
        #[serde(default)]
        encoding: TextEncoding,
    },
    ApplicationProcess {
        application_path: PathBuf,
        /// Raw argument string; takes precedence over `args`.
        #[serde(default)]
        arguments: Option<String>,
        #[serde(default)]
        args: Vec<ArgumentDescriptor>,
        #[serde(default)]
        working_directory: Option<PathBuf>,
        /// Treat a non-zero exit code as success.
        #[serde(default)]
        ignore_exit_code: bool,
    },
}

impl StageKind {
    /// The `module` key this kind was selected with.
    pub fn module_key(&self) -> &'static str {
        match self {
            StageKind::FindFiles { .. } => "find_files",
            StageKind::RegexFindFiles { .. } => "regex_find_files",
            StageKind::CopyFiles { .. } => "copy_files",
            StageKind::MoveFiles { .. } => "move_files",
            StageKind::CopyDirectory { .. } => "copy_directory",
            StageKind::MoveDirectory { .. } => "move_directory",
            StageKind::TransferFiles { .. } => "transfer_files",
            StageKind::FileList { .. } => "file_list",
            StageKind::ReadLines { .. } => "read_lines",
            StageKind::ApplicationProcess { .. } => "application_process",
        }
    }
}

/// A validated pipeline file. Only obtainable through `TryFrom<RawPipelineFile>`.
#[derive(Debug, Clone)]
pub struct PipelineFile {
    pub pipeline: PipelineSection,
    pub stages: Vec<StageConfig>,
}

impl PipelineFile {
    pub(crate) fn new_unchecked(pipeline: PipelineSection, stages: Vec<StageConfig>) -> Self {
        Self { pipeline, stages }
    }

    /// Retry policy applied to every transfer stage.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.pipeline.retry_attempts)
            .with_base_delay(Duration::from_secs_f64(self.pipeline.retry_base_seconds))
    }
}
