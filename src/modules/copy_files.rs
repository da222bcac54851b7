// src/modules/copy_files.rs

//! Copy and move an explicit list of files into one flat destination
//! directory. Only the file name of each source is kept.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::engine::{
    RetryPolicy, TransferLayout, TransferMode, TransferOptions, require_path, transfer_files,
};
use crate::errors::Result;
use crate::module::{Module, ModuleContext, ModuleCore};
use crate::modules::FilePathsResult;

#[derive(Debug, Clone, Default)]
pub struct FileListTransferConfig {
    pub source_file_paths: Vec<PathBuf>,
    pub destination_directory: PathBuf,
    pub overwrite: bool,
    pub retry: RetryPolicy,
}

pub type CopyFilesConfig = FileListTransferConfig;
pub type MoveFilesConfig = FileListTransferConfig;

#[derive(Debug)]
struct FlatTransfer {
    core: ModuleCore,
    config: FileListTransferConfig,
    mode: TransferMode,
}

impl FlatTransfer {
    fn validate(&self) -> Result<()> {
        require_path(&self.config.destination_directory, "Destination directory")?;
        self.config.retry.validate()
    }

    async fn execute(&self) -> Result<FilePathsResult> {
        let options = TransferOptions {
            mode: self.mode,
            destination_root: self.config.destination_directory.clone(),
            overwrite: self.config.overwrite,
            retry: self.config.retry,
        };
        let file_paths = transfer_files(
            &self.core,
            &self.config.source_file_paths,
            &TransferLayout::Flat,
            &options,
        )
        .await?;
        Ok(FilePathsResult { file_paths })
    }
}

#[derive(Debug)]
pub struct CopyFilesModule(FlatTransfer);

impl CopyFilesModule {
    pub const DEFAULT_NAME: &'static str = "Copy Files";

    pub fn new(ctx: &ModuleContext, config: CopyFilesConfig) -> Self {
        Self(FlatTransfer {
            core: ModuleCore::new(ctx, Self::DEFAULT_NAME),
            config,
            mode: TransferMode::Copy,
        })
    }
}

#[async_trait]
impl Module for CopyFilesModule {
    type Output = FilePathsResult;

    fn core(&self) -> &ModuleCore {
        &self.0.core
    }

    fn validate(&self) -> Result<()> {
        self.0.validate()
    }

    async fn execute(&self) -> Result<FilePathsResult> {
        self.0.execute().await
    }
}

/// Like [`CopyFilesModule`], deleting each source once it is copied.
#[derive(Debug)]
pub struct MoveFilesModule(FlatTransfer);

impl MoveFilesModule {
    pub const DEFAULT_NAME: &'static str = "Move Files";

    pub fn new(ctx: &ModuleContext, config: MoveFilesConfig) -> Self {
        Self(FlatTransfer {
            core: ModuleCore::new(ctx, Self::DEFAULT_NAME),
            config,
            mode: TransferMode::Move,
        })
    }
}

#[async_trait]
impl Module for MoveFilesModule {
    type Output = FilePathsResult;

    fn core(&self) -> &ModuleCore {
        &self.0.core
    }

    fn validate(&self) -> Result<()> {
        self.0.validate()
    }

    async fn execute(&self) -> Result<FilePathsResult> {
        self.0.execute().await
    }
}
