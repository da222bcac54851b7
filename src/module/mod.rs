// src/module/mod.rs

//! The contract every unit of work implements.
//!
//! A module is constructed from a [`ModuleContext`] (stage address,
//! cancellation signal, log sink, filesystem) and an immutable config value.
//! [`Module::run`] is then invoked by whoever owns the stage; it validates the
//! config, performs the work once and returns a freshly built result.
//!
//! - [`stage_path`] holds the hierarchical log-correlation address.
//! - [`events`] holds log levels, events, the fan-out [`LogSink`] and the
//!   per-module [`ModuleLog`] handle.

pub mod events;
pub mod stage_path;

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::errors::{ModuleError, Result};
use crate::fs::{FileSystem, RealFileSystem};

pub use events::{LogEvent, LogLevel, LogMessage, LogSink, ModuleLog};
pub use stage_path::StagePath;

/// What the surrounding stage hands to a module at construction time.
#[derive(Debug, Clone)]
pub struct ModuleContext {
    stage_path: StagePath,
    name: Option<String>,
    cancel: CancellationToken,
    sink: LogSink,
    fs: Arc<dyn FileSystem>,
}

impl ModuleContext {
    pub fn new(stage_path: StagePath, cancel: CancellationToken, sink: LogSink) -> Self {
        Self {
            stage_path,
            name: None,
            cancel,
            sink,
            fs: Arc::new(RealFileSystem),
        }
    }

    /// Override the module's default display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn stage_path(&self) -> &StagePath {
        &self.stage_path
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn sink(&self) -> &LogSink {
        &self.sink
    }

    pub fn file_system(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }
}

/// Runtime plumbing shared by every concrete module.
#[derive(Debug, Clone)]
pub struct ModuleCore {
    pub log: ModuleLog,
    pub cancel: CancellationToken,
    pub fs: Arc<dyn FileSystem>,
}

impl ModuleCore {
    /// Build the core for a module whose name defaults to `default_name`
    /// unless the context overrides it.
    pub fn new(ctx: &ModuleContext, default_name: &str) -> Self {
        let name = ctx.name.as_deref().unwrap_or(default_name);
        Self {
            log: ModuleLog::new(ctx.stage_path.clone(), name, ctx.sink.clone()),
            cancel: ctx.cancel.clone(),
            fs: Arc::clone(&ctx.fs),
        }
    }

    pub fn name(&self) -> &str {
        self.log.module()
    }

    /// Fail with `Cancelled` if the signal has fired.
    pub fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(ModuleError::Cancelled);
        }
        Ok(())
    }
}

/// One unit of automation work producing a typed result.
///
/// `run` may be called again after it returns; it is not meant to be called
/// concurrently on the same instance.
#[async_trait]
pub trait Module: Send + Sync {
    type Output: Send;

    fn core(&self) -> &ModuleCore;

    /// Check required configuration. Runs before any I/O.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Perform the work once.
    async fn execute(&self) -> Result<Self::Output>;

    fn name(&self) -> &str {
        self.core().name()
    }

    async fn run(&self) -> Result<Self::Output> {
        let core = self.core();
        core.check_cancelled()?;

        if let Err(err) = self.validate() {
            core.log.fatal(LogMessage::failure(&err));
            return Err(err);
        }

        match self.execute().await {
            Ok(output) => {
                core.log.info(format!("{} completed", core.name()));
                Ok(output)
            }
            Err(ModuleError::Cancelled) => {
                core.log.warn(format!("{} cancelled", core.name()));
                Err(ModuleError::Cancelled)
            }
            Err(err) => Err(err),
        }
    }
}
