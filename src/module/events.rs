// src/module/events.rs

//! Log events emitted by modules and the sink that fans them out.
//!
//! A `LogSink` holds a list of subscribers. Every event is delivered
//! synchronously to each subscriber in registration order, and mirrored into
//! `tracing` so that a process-wide subscriber sees module output as well.

use std::fmt;
use std::sync::{Arc, RwLock};

use tracing::{error, info, warn};

use super::StagePath;

/// Severity of a module log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Information,
    Warning,
    Error,
    Fatal,
}

/// Payload of a log event: plain text, or a structured failure carrying an
/// error's message and its full detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogMessage {
    Text(String),
    Failure { message: String, detail: String },
}

impl LogMessage {
    /// Structured form of an error: display text plus debug detail.
    pub fn failure(err: &(dyn std::error::Error + 'static)) -> Self {
        LogMessage::Failure {
            message: err.to_string(),
            detail: format!("{err:?}"),
        }
    }
}

impl fmt::Display for LogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogMessage::Text(text) => f.write_str(text),
            LogMessage::Failure { message, .. } => f.write_str(message),
        }
    }
}

impl From<String> for LogMessage {
    fn from(text: String) -> Self {
        LogMessage::Text(text)
    }
}

impl From<&str> for LogMessage {
    fn from(text: &str) -> Self {
        LogMessage::Text(text.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub stage_path: StagePath,
    pub module: String,
    pub level: LogLevel,
    pub message: LogMessage,
}

type Subscriber = Arc<dyn Fn(&LogEvent) + Send + Sync>;

/// Fan-out point for module log events.
///
/// Cloning a sink shares its subscriber list.
#[derive(Clone, Default)]
pub struct LogSink {
    subscribers: Arc<RwLock<Vec<Subscriber>>>,
}

impl fmt::Debug for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogSink")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback that receives every subsequent event.
    pub fn subscribe<F>(&self, subscriber: F)
    where
        F: Fn(&LogEvent) + Send + Sync + 'static,
    {
        self.subscribers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Arc::new(subscriber));
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .map(|subs| subs.len())
            .unwrap_or(0)
    }

    pub fn emit(&self, event: LogEvent) {
        mirror_to_tracing(&event);

        // Snapshot so a subscriber may subscribe further callbacks.
        let subscribers: Vec<Subscriber> = self
            .subscribers
            .read()
            .map(|subs| subs.clone())
            .unwrap_or_default();

        for subscriber in subscribers {
            subscriber(&event);
        }
    }
}

fn mirror_to_tracing(event: &LogEvent) {
    let stage = &event.stage_path;
    let module = event.module.as_str();
    match (&event.level, &event.message) {
        (LogLevel::Information, msg) => info!(%stage, module, "{msg}"),
        (LogLevel::Warning, LogMessage::Failure { message, detail }) => {
            warn!(%stage, module, detail = %detail, "{message}")
        }
        (LogLevel::Warning, msg) => warn!(%stage, module, "{msg}"),
        (LogLevel::Error | LogLevel::Fatal, LogMessage::Failure { message, detail }) => error!(
            %stage,
            module,
            fatal = event.level == LogLevel::Fatal,
            detail = %detail,
            "{message}"
        ),
        (LogLevel::Error | LogLevel::Fatal, msg) => error!(
            %stage,
            module,
            fatal = event.level == LogLevel::Fatal,
            "{msg}"
        ),
    }
}

/// Per-module handle onto a sink, stamping each event with the module's
/// name and stage path.
#[derive(Debug, Clone)]
pub struct ModuleLog {
    stage_path: StagePath,
    module: String,
    sink: LogSink,
}

impl ModuleLog {
    pub fn new(stage_path: StagePath, module: impl Into<String>, sink: LogSink) -> Self {
        Self {
            stage_path,
            module: module.into(),
            sink,
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn stage_path(&self) -> &StagePath {
        &self.stage_path
    }

    pub fn log(&self, level: LogLevel, message: impl Into<LogMessage>) {
        self.sink.emit(LogEvent {
            stage_path: self.stage_path.clone(),
            module: self.module.clone(),
            level,
            message: message.into(),
        });
    }

    pub fn info(&self, message: impl Into<LogMessage>) {
        self.log(LogLevel::Information, message);
    }

    pub fn warn(&self, message: impl Into<LogMessage>) {
        self.log(LogLevel::Warning, message);
    }

    pub fn error(&self, message: impl Into<LogMessage>) {
        self.log(LogLevel::Error, message);
    }

    pub fn fatal(&self, message: impl Into<LogMessage>) {
        self.log(LogLevel::Fatal, message);
    }
}
