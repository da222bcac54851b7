// src/modules/application_process.rs

//! Run an external executable under a [`ProcessSupervisor`].
//!
//! The command line comes from the `arguments` override when set, otherwise
//! from the typed argument source (anything implementing [`CommandLine`]).
//! A non-zero exit code is returned as data; only launch and wait failures
//! become [`ModuleError::ProcessFailure`].

use std::path::PathBuf;

use async_trait::async_trait;

use crate::engine::require_path;
use crate::errors::{ModuleError, Result};
use crate::module::{LogMessage, Module, ModuleContext, ModuleCore};
use crate::modules::ProcessResult;
use crate::process::{
    CommandLine, ProcessExit, ProcessRequest, ProcessState, ProcessSupervisor, format_arguments,
};

#[derive(Debug, Clone, Default)]
pub struct ApplicationProcessConfig<A = ()> {
    pub application_path: PathBuf,
    /// Raw argument string. Replaces whatever `argument_source` describes.
    pub arguments: Option<String>,
    pub argument_source: A,
    pub working_directory: Option<PathBuf>,
}

pub struct ApplicationProcessModule<A: CommandLine = ()> {
    core: ModuleCore,
    config: ApplicationProcessConfig<A>,
    supervisor: ProcessSupervisor,
}

impl<A: CommandLine> ApplicationProcessModule<A> {
    pub const DEFAULT_NAME: &'static str = "Application Process";

    pub fn new(ctx: &ModuleContext, config: ApplicationProcessConfig<A>) -> Self {
        let core = ModuleCore::new(ctx, Self::DEFAULT_NAME);
        let supervisor = ProcessSupervisor::new(core.log.clone(), core.cancel.clone());
        Self {
            core,
            config,
            supervisor,
        }
    }

    pub fn state(&self) -> ProcessState {
        self.supervisor.state()
    }

    /// Identifier of the running child, if any.
    pub fn pid(&self) -> Option<u32> {
        self.supervisor.pid()
    }

    pub fn command_arguments(&self) -> String {
        match &self.config.arguments {
            Some(raw) => raw.trim().to_string(),
            None => format_arguments(self.config.argument_source.arguments()),
        }
    }

    pub fn request(&self) -> ProcessRequest {
        ProcessRequest {
            program: self.config.application_path.to_string_lossy().into_owned(),
            arguments: self.command_arguments(),
            working_directory: self.config.working_directory.clone(),
        }
    }
}

#[async_trait]
impl<A: CommandLine> Module for ApplicationProcessModule<A> {
    type Output = ProcessResult;

    fn core(&self) -> &ModuleCore {
        &self.core
    }

    fn validate(&self) -> Result<()> {
        require_path(&self.config.application_path, "Application")?;
        self.request().validate()
    }

    async fn execute(&self) -> Result<ProcessResult> {
        let request = self.request();
        match self.supervisor.supervise(&request).await {
            Ok(ProcessExit::Exited(exit_code)) => Ok(ProcessResult {
                exit_code,
                ..ProcessResult::default()
            }),
            Ok(ProcessExit::Killed) => Err(ModuleError::Cancelled),
            Err(e) => {
                self.core.log.error(LogMessage::failure(&e));
                Err(ModuleError::ProcessFailure(Box::new(ProcessResult {
                    exit_code: -1,
                    error_message: Some(e.to_string()),
                    error_detail: Some(format!("{e:?}")),
                })))
            }
        }
    }
}
