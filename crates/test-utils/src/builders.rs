#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use stagework::config::{PipelineFile, PipelineSection, RawPipelineFile, StageConfig, StageKind};
use stagework::engine::RetryPolicy;
use stagework::fs::mock::MockFileSystem;
use stagework::module::{LogSink, ModuleContext, StagePath};
use tokio_util::sync::CancellationToken;

/// Builder for `PipelineFile` to simplify test setup.
pub struct PipelineBuilder {
    raw: RawPipelineFile,
}

impl PipelineBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            raw: RawPipelineFile {
                pipeline: PipelineSection {
                    name: name.to_string(),
                    ..PipelineSection::default()
                },
                stage: Vec::new(),
            },
        }
    }

    pub fn retry(mut self, attempts: u32, base_seconds: f64) -> Self {
        self.raw.pipeline.retry_attempts = attempts;
        self.raw.pipeline.retry_base_seconds = base_seconds;
        self
    }

    pub fn stage(mut self, name: &str, kind: StageKind) -> Self {
        self.raw.stage.push(StageConfig {
            name: name.to_string(),
            kind,
        });
        self
    }

    pub fn raw(self) -> RawPipelineFile {
        self.raw
    }

    pub fn build(self) -> PipelineFile {
        PipelineFile::try_from(self.raw).expect("Failed to build valid pipeline from builder")
    }
}

/// Retry policy with a 1ms base, for tests running on real time.
pub fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::new(max_attempts).with_base_delay(Duration::from_millis(1))
}

/// Context at stage `1` with a fresh token, on the real filesystem.
pub fn context(sink: &LogSink) -> ModuleContext {
    ModuleContext::new(StagePath::new([1]), CancellationToken::new(), sink.clone())
}

/// Same as [`context`], sharing `cancel`.
pub fn context_with_cancel(sink: &LogSink, cancel: &CancellationToken) -> ModuleContext {
    ModuleContext::new(StagePath::new([1]), cancel.clone(), sink.clone())
}

/// Context backed by `fs`.
pub fn mock_context(sink: &LogSink, fs: &MockFileSystem) -> ModuleContext {
    context(sink).with_file_system(Arc::new(fs.clone()))
}
