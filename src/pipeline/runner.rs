// src/pipeline/runner.rs

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::{PipelineFile, StageConfig, StageKind};
use crate::errors::{ModuleError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::module::{LogSink, Module, ModuleContext, StagePath};
use crate::modules::{
    ApplicationProcessConfig, ApplicationProcessModule, CopyDirectoryModule, CopyFilesModule,
    DirectoryTransferConfig, FileListConfig, FileListModule, FileListTransferConfig,
    FindFilesConfig, FindFilesModule, MoveDirectoryModule, MoveFilesModule, ProcessResult,
    ReadLinesConfig, ReadLinesModule, RegexFindFilesConfig, RegexFindFilesModule,
    TransferFilesConfig, TransferFilesModule,
};

/// What one stage produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Files(Vec<PathBuf>),
    File(PathBuf),
    Lines(Vec<String>),
    Process(ProcessResult),
}

impl fmt::Display for StageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageOutcome::Files(paths) => write!(f, "{} files", paths.len()),
            StageOutcome::File(path) => write!(f, "wrote {}", path.display()),
            StageOutcome::Lines(lines) => write!(f, "{} lines", lines.len()),
            StageOutcome::Process(result) => write!(f, "exit code {}", result.exit_code),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StageReport {
    pub stage_path: StagePath,
    pub name: String,
    pub module: &'static str,
    pub outcome: StageOutcome,
    pub elapsed: Duration,
}

/// Outcomes of a completed run, in stage order.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub name: String,
    pub stages: Vec<StageReport>,
}

impl PipelineReport {
    pub fn stage(&self, name: &str) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.name == name)
    }
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "pipeline '{}': {} stages", self.name, self.stages.len())?;
        for stage in &self.stages {
            writeln!(
                f,
                "  [{}] {} ({}): {} in {:.2?}",
                stage.stage_path, stage.name, stage.module, stage.outcome, stage.elapsed
            )?;
        }
        Ok(())
    }
}

/// Runs the stages of a pipeline file one after another.
///
/// Stage `n` (1-based) logs under the stage path `root.n` and gets a child of
/// the runner's cancellation token. The first failing stage ends the run.
#[derive(Debug, Clone)]
pub struct PipelineRunner {
    file: PipelineFile,
    sink: LogSink,
    cancel: CancellationToken,
    fs: Arc<dyn FileSystem>,
    root: StagePath,
}

impl PipelineRunner {
    pub fn new(file: PipelineFile, sink: LogSink, cancel: CancellationToken) -> Self {
        Self {
            file,
            sink,
            cancel,
            fs: Arc::new(RealFileSystem),
            root: StagePath::empty(),
        }
    }

    pub fn with_file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn with_root(mut self, root: StagePath) -> Self {
        self.root = root;
        self
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub async fn run(&self) -> Result<PipelineReport> {
        let name = self.file.pipeline.name.clone();
        info!(pipeline = %name, stages = self.file.stages.len(), "pipeline started");

        let mut stages = Vec::with_capacity(self.file.stages.len());
        for (index, stage) in self.file.stages.iter().enumerate() {
            if self.cancel.is_cancelled() {
                info!(pipeline = %name, "pipeline cancelled before stage '{}'", stage.name);
                return Err(ModuleError::Cancelled);
            }

            let stage_path = self.root.child(index as u32 + 1);
            let module = stage.kind.module_key();
            info!(stage = %stage_path, name = %stage.name, module, "stage started");

            let started = Instant::now();
            let outcome = match self.run_stage(&stage_path, stage).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    error!(stage = %stage_path, name = %stage.name, module, error = %err, "stage failed");
                    return Err(err);
                }
            };
            let elapsed = started.elapsed();
            info!(stage = %stage_path, name = %stage.name, %outcome, ?elapsed, "stage finished");

            stages.push(StageReport {
                stage_path,
                name: stage.name.clone(),
                module,
                outcome,
                elapsed,
            });
        }

        info!(pipeline = %name, "pipeline finished");
        Ok(PipelineReport { name, stages })
    }

    async fn run_stage(&self, stage_path: &StagePath, stage: &StageConfig) -> Result<StageOutcome> {
        let ctx = ModuleContext::new(
            stage_path.clone(),
            self.cancel.child_token(),
            self.sink.clone(),
        )
        .with_name(stage.name.clone())
        .with_file_system(Arc::clone(&self.fs));
        let retry = self.file.retry_policy();

        match &stage.kind {
            StageKind::FindFiles {
                source_directory,
                search_pattern,
                recursive,
            } => {
                let config = FindFilesConfig {
                    source_directory: source_directory.clone(),
                    search_pattern: search_pattern.clone(),
                    recursive: *recursive,
                };
                let result = FindFilesModule::new(&ctx, config).run().await?;
                Ok(StageOutcome::Files(result.file_paths))
            }
            StageKind::RegexFindFiles {
                source_directory,
                regex_pattern,
                recursive,
            } => {
                let config = RegexFindFilesConfig {
                    source_directory: source_directory.clone(),
                    regex_pattern: regex_pattern.clone(),
                    recursive: *recursive,
                };
                let result = RegexFindFilesModule::new(&ctx, config).run().await?;
                Ok(StageOutcome::Files(result.file_paths))
            }
            StageKind::CopyFiles {
                source_file_paths,
                destination_directory,
                overwrite,
            }
            | StageKind::MoveFiles {
                source_file_paths,
                destination_directory,
                overwrite,
            } => {
                let config = FileListTransferConfig {
                    source_file_paths: source_file_paths.clone(),
                    destination_directory: destination_directory.clone(),
                    overwrite: *overwrite,
                    retry,
                };
                let result = if matches!(stage.kind, StageKind::MoveFiles { .. }) {
                    MoveFilesModule::new(&ctx, config).run().await?
                } else {
                    CopyFilesModule::new(&ctx, config).run().await?
                };
                Ok(StageOutcome::Files(result.file_paths))
            }
            StageKind::CopyDirectory {
                source_directory,
                destination_directory,
                recursive,
                overwrite,
            }
            | StageKind::MoveDirectory {
                source_directory,
                destination_directory,
                recursive,
                overwrite,
            } => {
                let config = DirectoryTransferConfig {
                    source_directory: source_directory.clone(),
                    destination_directory: destination_directory.clone(),
                    recursive: *recursive,
                    overwrite: *overwrite,
                    retry,
                };
                let result = if matches!(stage.kind, StageKind::MoveDirectory { .. }) {
                    MoveDirectoryModule::new(&ctx, config).run().await?
                } else {
                    CopyDirectoryModule::new(&ctx, config).run().await?
                };
                Ok(StageOutcome::Files(result.file_paths))
            }
            StageKind::TransferFiles {
                transfer_mode,
                source_directory,
                search_pattern,
                recursive,
                destination_directory,
                overwrite,
            } => {
                let config = TransferFilesConfig {
                    transfer_mode: *transfer_mode,
                    source_directory: source_directory.clone(),
                    search_pattern: search_pattern.clone(),
                    recursive: *recursive,
                    destination_directory: destination_directory.clone(),
                    overwrite: *overwrite,
                    retry,
                };
                let result = TransferFilesModule::new(&ctx, config).run().await?;
                Ok(StageOutcome::Files(result.file_paths))
            }
            StageKind::FileList {
                file_paths,
                file_path,
                include_directory_path,
                overwrite,
            } => {
                let config = FileListConfig {
                    file_paths: file_paths.clone(),
                    file_path: file_path.clone(),
                    include_directory_path: *include_directory_path,
                    overwrite: *overwrite,
                };
                let result = FileListModule::new(&ctx, config).run().await?;
                Ok(StageOutcome::File(result.file_path))
            }
            StageKind::ReadLines {
                file_path,
                encoding,
            } => {
                let config = ReadLinesConfig {
                    file_path: file_path.clone(),
                    encoding: *encoding,
                };
                let result = ReadLinesModule::new(&ctx, config).run().await?;
                Ok(StageOutcome::Lines(result.lines))
            }
            StageKind::ApplicationProcess {
                application_path,
                arguments,
                args,
                working_directory,
                ignore_exit_code,
            } => {
                let config = ApplicationProcessConfig {
                    application_path: application_path.clone(),
                    arguments: arguments.clone(),
                    argument_source: args.clone(),
                    working_directory: working_directory.clone(),
                };
                let result = ApplicationProcessModule::new(&ctx, config).run().await?;
                if result.exit_code != 0 && !ignore_exit_code {
                    return Err(ModuleError::ProcessFailure(Box::new(ProcessResult {
                        error_message: Some(format!(
                            "{} exited with code {}",
                            application_path.display(),
                            result.exit_code
                        )),
                        ..result
                    })));
                }
                Ok(StageOutcome::Process(result))
            }
        }
    }
}
