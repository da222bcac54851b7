pub mod builders;
pub mod fixtures;

use std::sync::{Arc, Mutex, Once};

use stagework::module::{LogEvent, LogLevel, LogSink};
use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Run a future with a 5-second timeout.
#[allow(dead_code)]
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}

/// Collects every event delivered to a [`LogSink`].
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    events: Arc<Mutex<Vec<LogEvent>>>,
}

impl LogCapture {
    /// Subscribe a new capture to `sink`.
    pub fn attach(sink: &LogSink) -> Self {
        let capture = Self::default();
        let events = Arc::clone(&capture.events);
        sink.subscribe(move |event| {
            events.lock().expect("log capture poisoned").push(event.clone());
        });
        capture
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().expect("log capture poisoned").clone()
    }

    /// Rendered messages, in emission order.
    pub fn messages(&self) -> Vec<String> {
        self.events()
            .iter()
            .map(|e| e.message.to_string())
            .collect()
    }

    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.events()
            .iter()
            .filter(|e| e.level == level)
            .map(|e| e.message.to_string())
            .collect()
    }

    /// Whether any message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.messages().iter().any(|m| m.contains(needle))
    }
}
