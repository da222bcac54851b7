// src/modules/file_list.rs

//! Write a list of paths to a text file, one per line.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::engine::require_path;
use crate::errors::{ModuleError, Result};
use crate::module::{LogMessage, Module, ModuleContext, ModuleCore};
use crate::modules::FilePathResult;

#[cfg(windows)]
const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
const LINE_ENDING: &str = "\n";

#[derive(Debug, Clone)]
pub struct FileListConfig {
    pub file_paths: Vec<PathBuf>,
    /// Output file.
    pub file_path: PathBuf,
    /// When false only the file name of each entry is written.
    pub include_directory_path: bool,
    pub overwrite: bool,
}

impl Default for FileListConfig {
    fn default() -> Self {
        Self {
            file_paths: Vec::new(),
            file_path: PathBuf::new(),
            include_directory_path: true,
            overwrite: false,
        }
    }
}

#[derive(Debug)]
pub struct FileListModule {
    core: ModuleCore,
    config: FileListConfig,
}

impl FileListModule {
    pub const DEFAULT_NAME: &'static str = "File List";

    pub fn new(ctx: &ModuleContext, config: FileListConfig) -> Self {
        Self {
            core: ModuleCore::new(ctx, Self::DEFAULT_NAME),
            config,
        }
    }

    fn render(&self) -> String {
        let mut out = String::new();
        for path in &self.config.file_paths {
            out.push_str(&entry_text(path, self.config.include_directory_path));
            out.push_str(LINE_ENDING);
        }
        out
    }
}

fn entry_text(path: &Path, include_directory_path: bool) -> String {
    if include_directory_path {
        return path.display().to_string();
    }
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[async_trait]
impl Module for FileListModule {
    type Output = FilePathResult;

    fn core(&self) -> &ModuleCore {
        &self.core
    }

    fn validate(&self) -> Result<()> {
        require_path(&self.config.file_path, "Output file")
    }

    async fn execute(&self) -> Result<FilePathResult> {
        let target = &self.config.file_path;
        let contents = self.render();

        self.core.log.info(format!(
            "Writing {} entries to \"{}\"",
            self.config.file_paths.len(),
            target.display()
        ));

        match self
            .core
            .fs
            .write(target, contents.as_bytes(), self.config.overwrite)
            .await
        {
            Ok(()) => Ok(FilePathResult {
                file_path: target.clone(),
            }),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let err = ModuleError::OverwriteConflict(target.clone());
                self.core.log.error(LogMessage::failure(&err));
                Err(err)
            }
            Err(e) => {
                let err = ModuleError::io(target, e);
                self.core.log.error(LogMessage::failure(&err));
                Err(err)
            }
        }
    }
}
