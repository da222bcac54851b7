// src/modules/copy_directory.rs

//! Mirror a directory (optionally its whole tree) beneath a destination root.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::engine::{
    FileMatcher, RetryPolicy, TransferLayout, TransferMode, TransferOptions, find_files,
    remove_source_directory, require_path, transfer_files,
};
use crate::errors::Result;
use crate::module::{Module, ModuleContext, ModuleCore};
use crate::modules::FilePathsResult;

#[derive(Debug, Clone, Default)]
pub struct DirectoryTransferConfig {
    pub source_directory: PathBuf,
    pub destination_directory: PathBuf,
    pub recursive: bool,
    pub overwrite: bool,
    pub retry: RetryPolicy,
}

pub type CopyDirectoryConfig = DirectoryTransferConfig;
pub type MoveDirectoryConfig = DirectoryTransferConfig;

#[derive(Debug)]
struct TreeTransfer {
    core: ModuleCore,
    config: DirectoryTransferConfig,
    mode: TransferMode,
}

impl TreeTransfer {
    fn validate(&self) -> Result<()> {
        require_path(&self.config.source_directory, "Source directory")?;
        require_path(&self.config.destination_directory, "Destination directory")?;
        self.config.retry.validate()
    }

    async fn execute(&self) -> Result<FilePathsResult> {
        let config = &self.config;
        let files = find_files(
            self.core.fs.as_ref(),
            &config.source_directory,
            &FileMatcher::Any,
            config.recursive,
        )
        .await?;

        let layout = TransferLayout::Tree {
            source_root: config.source_directory.clone(),
        };
        let options = TransferOptions {
            mode: self.mode,
            destination_root: config.destination_directory.clone(),
            overwrite: config.overwrite,
            retry: config.retry,
        };
        let file_paths = transfer_files(&self.core, &files, &layout, &options).await?;

        if self.mode == TransferMode::Move {
            remove_source_directory(
                &self.core,
                &config.source_directory,
                config.recursive,
                &config.retry,
            )
            .await?;
        }

        Ok(FilePathsResult { file_paths })
    }
}

#[derive(Debug)]
pub struct CopyDirectoryModule(TreeTransfer);

impl CopyDirectoryModule {
    pub const DEFAULT_NAME: &'static str = "Copy Directory";

    pub fn new(ctx: &ModuleContext, config: CopyDirectoryConfig) -> Self {
        Self(TreeTransfer {
            core: ModuleCore::new(ctx, Self::DEFAULT_NAME),
            config,
            mode: TransferMode::Copy,
        })
    }
}

#[async_trait]
impl Module for CopyDirectoryModule {
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

/// Move every file of the tree, then delete the source directory.
#[derive(Debug)]
pub struct MoveDirectoryModule(TreeTransfer);

impl MoveDirectoryModule {
    pub const DEFAULT_NAME: &'static str = "Move Directory";

    pub fn new(ctx: &ModuleContext, config: MoveDirectoryConfig) -> Self {
        Self(TreeTransfer {
            core: ModuleCore::new(ctx, Self::DEFAULT_NAME),
            config,
            mode: TransferMode::Move,
        })
    }
}

#[async_trait]
impl Module for MoveDirectoryModule {
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
