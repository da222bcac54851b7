// src/modules/transfer_files.rs

use std::path::PathBuf;

use async_trait::async_trait;

use crate::engine::{
    FileMatcher, RetryPolicy, TransferLayout, TransferMode, TransferOptions, find_files,
    require_path, transfer_files,
};
use crate::errors::Result;
use crate::module::{Module, ModuleContext, ModuleCore};
use crate::modules::FilePathsResult;

/// Copy or move the files matching a glob below a source root, keeping
/// their relative paths. Unlike a directory move, the source directories
/// are left in place.
#[derive(Debug, Clone, Default)]
pub struct TransferFilesConfig {
    pub transfer_mode: TransferMode,
    pub source_directory: PathBuf,
    pub search_pattern: String,
    pub recursive: bool,
    pub destination_directory: PathBuf,
    pub overwrite: bool,
    pub retry: RetryPolicy,
}

#[derive(Debug)]
pub struct TransferFilesModule {
    core: ModuleCore,
    config: TransferFilesConfig,
}

impl TransferFilesModule {
    pub const DEFAULT_NAME: &'static str = "Transfer Files";

    pub fn new(ctx: &ModuleContext, config: TransferFilesConfig) -> Self {
        Self {
            core: ModuleCore::new(ctx, Self::DEFAULT_NAME),
            config,
        }
    }
}

#[async_trait]
impl Module for TransferFilesModule {
    type Output = FilePathsResult;

    fn core(&self) -> &ModuleCore {
        &self.core
    }

    fn validate(&self) -> Result<()> {
        require_path(&self.config.source_directory, "Source directory")?;
        require_path(&self.config.destination_directory, "Destination directory")?;
        FileMatcher::glob(&self.config.search_pattern)?;
        self.config.retry.validate()
    }

    async fn execute(&self) -> Result<FilePathsResult> {
        let config = &self.config;
        let matcher = FileMatcher::glob(&config.search_pattern)?;
        let files = find_files(
            self.core.fs.as_ref(),
            &config.source_directory,
            &matcher,
            config.recursive,
        )
        .await?;

        let layout = TransferLayout::Tree {
            source_root: config.source_directory.clone(),
        };
        let options = TransferOptions {
            mode: config.transfer_mode,
            destination_root: config.destination_directory.clone(),
            overwrite: config.overwrite,
            retry: config.retry,
        };
        let file_paths = transfer_files(&self.core, &files, &layout, &options).await?;
        Ok(FilePathsResult { file_paths })
    }
}
