// src/modules/regex_find_files.rs

use std::path::PathBuf;

use async_trait::async_trait;

use crate::engine::{FileMatcher, find_files, require_path};
use crate::errors::Result;
use crate::module::{Module, ModuleContext, ModuleCore};
use crate::modules::FilePathsResult;

/// Regex search over file names (not full paths). The pattern is required.
#[derive(Debug, Clone, Default)]
pub struct RegexFindFilesConfig {
    pub source_directory: PathBuf,
    pub regex_pattern: String,
    pub recursive: bool,
}

#[derive(Debug)]
pub struct RegexFindFilesModule {
    core: ModuleCore,
    config: RegexFindFilesConfig,
}

impl RegexFindFilesModule {
    pub const DEFAULT_NAME: &'static str = "Regex Find Files";

    pub fn new(ctx: &ModuleContext, config: RegexFindFilesConfig) -> Self {
        Self {
            core: ModuleCore::new(ctx, Self::DEFAULT_NAME),
            config,
        }
    }
}

#[async_trait]
impl Module for RegexFindFilesModule {
    type Output = FilePathsResult;

    fn core(&self) -> &ModuleCore {
        &self.core
    }

    fn validate(&self) -> Result<()> {
        require_path(&self.config.source_directory, "Source directory")?;
        FileMatcher::regex(&self.config.regex_pattern)?;
        Ok(())
    }

    async fn execute(&self) -> Result<FilePathsResult> {
        let matcher = FileMatcher::regex(&self.config.regex_pattern)?;
        let file_paths = find_files(
            self.core.fs.as_ref(),
            &self.config.source_directory,
            &matcher,
            self.config.recursive,
        )
        .await?;
        Ok(FilePathsResult { file_paths })
    }
}
