// src/modules/find_files.rs

use std::path::PathBuf;

use async_trait::async_trait;

use crate::engine::{FileMatcher, find_files, require_path};
use crate::errors::Result;
use crate::module::{Module, ModuleContext, ModuleCore};
use crate::modules::FilePathsResult;

/// Glob search. An empty pattern matches every file.
#[derive(Debug, Clone, Default)]
pub struct FindFilesConfig {
    pub source_directory: PathBuf,
    pub search_pattern: String,
    pub recursive: bool,
}

#[derive(Debug)]
pub struct FindFilesModule {
    core: ModuleCore,
    config: FindFilesConfig,
}

impl FindFilesModule {
    pub const DEFAULT_NAME: &'static str = "Find Files";

    pub fn new(ctx: &ModuleContext, config: FindFilesConfig) -> Self {
        Self {
            core: ModuleCore::new(ctx, Self::DEFAULT_NAME),
            config,
        }
    }
}

#[async_trait]
impl Module for FindFilesModule {
    type Output = FilePathsResult;

    fn core(&self) -> &ModuleCore {
        &self.core
    }

    fn validate(&self) -> Result<()> {
        require_path(&self.config.source_directory, "Source directory")?;
        FileMatcher::glob(&self.config.search_pattern)?;
        Ok(())
    }

    async fn execute(&self) -> Result<FilePathsResult> {
        let matcher = FileMatcher::glob(&self.config.search_pattern)?;
        let file_paths = find_files(
            self.core.fs.as_ref(),
            &self.config.source_directory,
            &matcher,
            self.config.recursive,
        )
        .await?;

        self.core.log.info(format!(
            "Found {} files in \"{}\"",
            file_paths.len(),
            self.config.source_directory.display()
        ));
        Ok(FilePathsResult { file_paths })
    }
}
