// src/process/supervisor.rs

//! Launch a child process, pump its output into a module log and kill it
//! when the module is cancelled.
//!
//! State machine: `Idle -> Launching -> Running -> {Completed | Failed | Killed}`.
//!
//! stdout and stderr are read by two independent Tokio tasks; each non-empty
//! line goes to the log as it arrives (stdout at Information, stderr at
//! Warning). Both pumps are drained before `supervise` returns so no
//! trailing output is lost, unless cancellation fires first.

use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::errors::Result;
use crate::module::{LogLevel, ModuleLog};
use crate::process::arguments::split_arguments;

/// How long to wait for output pumps after a kill. A grandchild that
/// inherited the pipes can keep them open past the kill.
const KILLED_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Idle,
    Launching,
    Running,
    Completed,
    Failed,
    Killed,
}

/// How a supervised process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessExit {
    /// Natural exit. Processes ended by a signal report `-1`.
    Exited(i32),
    /// Killed because cancellation was requested.
    Killed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRequest {
    pub program: String,
    pub arguments: String,
    pub working_directory: Option<PathBuf>,
}

impl ProcessRequest {
    /// The command line as it is logged before launch.
    pub fn command_line(&self) -> String {
        format!("{} {}", self.program, self.arguments)
            .trim()
            .to_string()
    }

    /// Check that the argument string can be handed to the OS.
    pub fn validate(&self) -> Result<()> {
        if !cfg!(windows) {
            split_arguments(&self.arguments)?;
        }
        Ok(())
    }

    fn build_command(&self) -> io::Result<Command> {
        let mut cmd = Command::new(&self.program);

        // Windows programs parse their own command line, so pass it verbatim.
        #[cfg(windows)]
        {
            if !self.arguments.trim().is_empty() {
                cmd.raw_arg(&self.arguments);
            }
        }

        #[cfg(not(windows))]
        {
            let argv = split_arguments(&self.arguments)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
            cmd.args(argv);
        }

        if let Some(dir) = &self.working_directory {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        Ok(cmd)
    }
}

#[derive(Debug, Default)]
struct Tracked {
    state: Option<ProcessState>,
    pid: Option<u32>,
}

/// Runs one process at a time on behalf of a module.
#[derive(Debug, Clone)]
pub struct ProcessSupervisor {
    log: ModuleLog,
    cancel: CancellationToken,
    tracked: Arc<Mutex<Tracked>>,
}

impl ProcessSupervisor {
    pub fn new(log: ModuleLog, cancel: CancellationToken) -> Self {
        Self {
            log,
            cancel,
            tracked: Arc::new(Mutex::new(Tracked::default())),
        }
    }

    pub fn state(&self) -> ProcessState {
        self.lock().state.unwrap_or(ProcessState::Idle)
    }

    /// Identifier of the running child, if any.
    pub fn pid(&self) -> Option<u32> {
        self.lock().pid
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tracked> {
        self.tracked
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn transition(&self, next: ProcessState) {
        let mut tracked = self.lock();
        debug!(
            module = self.log.module(),
            from = ?tracked.state.unwrap_or(ProcessState::Idle),
            to = ?next,
            "process state change"
        );
        tracked.state = Some(next);
        if matches!(
            next,
            ProcessState::Completed | ProcessState::Failed | ProcessState::Killed
        ) {
            tracked.pid = None;
        }
    }

    /// Launch `request` and wait until it exits or is killed.
    ///
    /// Launch and wait failures are returned as the raw `io::Error` so the
    /// caller can record its message and detail.
    pub async fn supervise(&self, request: &ProcessRequest) -> io::Result<ProcessExit> {
        self.transition(ProcessState::Launching);
        self.log.info(request.command_line());

        let mut child = match request.build_command().and_then(|mut cmd| cmd.spawn()) {
            Ok(child) => child,
            Err(e) => {
                self.transition(ProcessState::Failed);
                return Err(e);
            }
        };

        let pid = child.id();
        self.lock().pid = pid;
        self.transition(ProcessState::Running);
        self.log.info(format!(
            "Process started with id {}",
            pid.map(|p| p.to_string()).unwrap_or_else(|| "?".to_string())
        ));

        let stdout_pump = child
            .stdout
            .take()
            .map(|out| spawn_pump(out, self.log.clone(), LogLevel::Information));
        let stderr_pump = child
            .stderr
            .take()
            .map(|err| spawn_pump(err, self.log.clone(), LogLevel::Warning));

        // The OS wait is not interruptible; cancellation has to kill the child.
        let outcome = tokio::select! {
            status = child.wait() => status.map(|s| ProcessExit::Exited(s.code().unwrap_or(-1))),
            _ = self.cancel.cancelled() => {
                self.log.warn(format!(
                    "Cancellation requested; killing process {}",
                    pid.map(|p| p.to_string()).unwrap_or_default()
                ));
                if let Err(e) = child.kill().await {
                    self.log.warn(format!("Failed to kill process: {e}"));
                }
                Ok(ProcessExit::Killed)
            }
        };

        match outcome {
            Ok(ProcessExit::Exited(code)) => {
                // A grandchild may still hold the pipes; stop waiting on cancel.
                drain(stdout_pump, stderr_pump, None, Some(&self.cancel)).await;
                self.transition(ProcessState::Completed);
                self.log.info(format!("Process exited with code {code}"));
                Ok(ProcessExit::Exited(code))
            }
            Ok(ProcessExit::Killed) => {
                drain(stdout_pump, stderr_pump, Some(KILLED_DRAIN_TIMEOUT), None).await;
                self.transition(ProcessState::Killed);
                Ok(ProcessExit::Killed)
            }
            Err(e) => {
                let _ = child.start_kill();
                drain(stdout_pump, stderr_pump, Some(KILLED_DRAIN_TIMEOUT), None).await;
                self.transition(ProcessState::Failed);
                Err(e)
            }
        }
    }
}

fn spawn_pump<R>(reader: R, log: ModuleLog, level: LogLevel) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    let line = line.trim_end_matches(['\r', '\n']);
                    if !line.is_empty() {
                        log.log(level, line.to_string());
                    }
                }
                Err(e) => {
                    debug!(module = log.module(), error = %e, "output pump stopped");
                    break;
                }
            }
        }
    })
}

/// Wait for both pumps to finish, giving up after `limit` or once `cancel`
/// fires. Abandoned pumps are aborted.
async fn drain(
    stdout: Option<JoinHandle<()>>,
    stderr: Option<JoinHandle<()>>,
    limit: Option<Duration>,
    cancel: Option<&CancellationToken>,
) {
    for pump in [stdout, stderr].into_iter().flatten() {
        let abort = pump.abort_handle();
        let wait = async {
            match limit {
                Some(limit) => tokio::time::timeout(limit, pump).await.ok(),
                None => Some(pump.await),
            }
        };
        let joined = tokio::select! {
            joined = wait => joined,
            _ = cancelled(cancel) => None,
        };
        match joined {
            Some(Ok(())) => {}
            Some(Err(e)) => debug!(error = %e, "output pump task failed"),
            None => {
                debug!("output pump still open; abandoning it");
                abort.abort();
            }
        }
    }
}

async fn cancelled(cancel: Option<&CancellationToken>) {
    match cancel {
        Some(cancel) => cancel.cancelled().await,
        None => std::future::pending().await,
    }
}
