// Subprocess runner implementation
// reason: tokio::process for both strategies (one supervisor, two schedulers)
use async_trait::async_trait;
use std::io::ErrorKind;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use hostkit_core::application::constants::DRAIN_TIMEOUT;
use hostkit_core::domain::{CommandError, Completion, Invocation};
use hostkit_core::port::CommandRunner;

use crate::process_control;

/// Read size for pipe drains
const PIPE_READ_CHUNK: usize = 4096;

type SharedBuffer = Arc<Mutex<Vec<u8>>>;

/// Subprocess runner
///
/// Launches the argument vector directly (no shell) and enforces the
/// invocation's deadline. On timeout the child is killed and reaped before
/// its pipes are drained, so the drain cannot wait on a live writer.
///
/// Both strategies share one supervisor. `run_async` awaits it on the
/// caller's runtime; `run_blocking` drives it on a private current-thread
/// runtime and parks the calling thread until it resolves.
pub struct SubprocessRunner {
    drain_timeout: Duration,
}

impl SubprocessRunner {
    /// Create a new subprocess runner
    ///
    /// # Example
    /// ```ignore
    /// let runner = SubprocessRunner::new();
    /// let completion = runner.run_blocking(&Invocation::with_defaults("uname -r")?)?;
    /// ```
    pub fn new() -> Self {
        Self {
            drain_timeout: DRAIN_TIMEOUT,
        }
    }

    /// Override how long pipes may be drained once the child is gone
    pub fn with_drain_timeout(mut self, drain_timeout: Duration) -> Self {
        self.drain_timeout = drain_timeout;
        self
    }

    /// Time left before the deadline, but never less than the drain allowance
    ///
    /// A deadline too far out to represent leaves the drain unbounded.
    fn drain_window(&self, deadline: Option<Instant>) -> Duration {
        deadline
            .map_or(Duration::MAX, |d| d.saturating_duration_since(Instant::now()))
            .max(self.drain_timeout)
    }

    /// Launch, wait against the deadline, kill on expiry, then drain
    async fn supervise(&self, invocation: &Invocation) -> Result<Completion, CommandError> {
        let deadline = Instant::now().checked_add(invocation.timeout());

        let mut child = command_for(invocation)
            .spawn()
            .map_err(|e| CommandError::launch(invocation.program(), e))?;
        let pid = child.id();

        info!(
            pid = ?pid,
            program = %invocation.program(),
            args = ?invocation.args(),
            timeout_ms = %invocation.timeout().as_millis(),
            "Subprocess started"
        );

        let stdout = PipeDrain::spawn(child.stdout.take());
        let stderr = PipeDrain::spawn(child.stderr.take());

        // tokio saturates oversized timeouts to a far-future deadline
        match tokio::time::timeout(invocation.timeout(), child.wait()).await {
            Ok(Ok(status)) => {
                let within = self.drain_window(deadline);
                let completion = Completion {
                    exit_code: status.code(),
                    stdout: finish_drain(stdout, within).await,
                    stderr: finish_drain(stderr, within).await,
                };

                info!(pid = ?pid, exit_code = ?completion.exit_code, "Subprocess execution completed");
                Ok(completion)
            }
            Ok(Err(e)) => {
                // `child` is dropped on return; kill_on_drop takes care of it
                kill_descendants(pid, invocation);
                Err(CommandError::Unexpected(format!(
                    "Failed to wait on child: {}",
                    e
                )))
            }
            Err(_) => {
                warn!(
                    pid = ?pid,
                    timeout_ms = %invocation.timeout().as_millis(),
                    "Deadline exceeded, killing subprocess"
                );

                // Kill, reap, and only then drain
                kill_descendants(pid, invocation);
                child
                    .kill()
                    .await
                    .map_err(|e| CommandError::Unexpected(format!("Failed to kill child: {}", e)))?;

                let partial_stdout = finish_drain(stdout, self.drain_timeout).await;
                let _ = finish_drain(stderr, self.drain_timeout).await;

                Err(CommandError::Timeout {
                    timeout: invocation.timeout(),
                    partial_stdout,
                })
            }
        }
    }

    /// Drive the supervisor to completion on a runtime owned by this call
    ///
    /// Dropping the runtime on return cancels any reader still parked on a
    /// pipe held open by a grandchild, which closes the read end.
    fn supervise_on_private_runtime(
        &self,
        invocation: &Invocation,
    ) -> Result<Completion, CommandError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                CommandError::Unexpected(format!("Failed to start supervisor runtime: {}", e))
            })?;

        runtime.block_on(self.supervise(invocation))
    }
}

impl Default for SubprocessRunner {
    fn default() -> Self {
        Self::new()
    }
}

// ----------------------------------------------------------------------------
// Launch
// ----------------------------------------------------------------------------

/// Capturing children get piped output, no stdin, and their own process group.
/// Non-capturing children share the caller's streams and process group, so
/// interactive prompts keep working.
fn command_for(invocation: &Invocation) -> tokio::process::Command {
    let mut command = tokio::process::Command::new(invocation.program());
    command.args(invocation.args()).kill_on_drop(true);

    if invocation.capture_output() {
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        #[cfg(unix)]
        command.process_group(0);
    } else {
        command
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
    }

    command
}

/// Kill whatever the child may have forked (capturing children only)
fn kill_descendants(pid: Option<u32>, invocation: &Invocation) {
    if !invocation.capture_output() {
        return;
    }
    if let Some(pid) = pid {
        if let Err(e) = process_control::kill_process_group(pid) {
            warn!(pid = %pid, error = %e, "Failed to kill process group");
        }
    }
}

// ----------------------------------------------------------------------------
// Output buffers
// ----------------------------------------------------------------------------

fn append(buffer: &SharedBuffer, bytes: &[u8]) {
    buffer
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .extend_from_slice(bytes);
}

fn take(buffer: &SharedBuffer) -> Vec<u8> {
    std::mem::take(
        &mut *buffer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()),
    )
}

/// Pipe reader on a tokio task
///
/// Bytes land in a shared buffer as they arrive, so a drain that is cut
/// short still returns everything read so far.
struct PipeDrain {
    buffer: SharedBuffer,
    task: JoinHandle<()>,
}

impl PipeDrain {
    fn spawn<R: AsyncRead + Unpin + Send + 'static>(pipe: Option<R>) -> Option<Self> {
        let mut pipe = pipe?;
        let buffer = SharedBuffer::default();
        let sink = Arc::clone(&buffer);

        let task = tokio::spawn(async move {
            let mut chunk = vec![0u8; PIPE_READ_CHUNK];
            loop {
                match pipe.read(&mut chunk).await {
                    Ok(0) => break,
                    Ok(n) => append(&sink, &chunk[..n]),
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(_) => break,
                }
            }
        });

        Some(Self { buffer, task })
    }

    /// Wait up to `within` for EOF, then take whatever has arrived
    async fn finish(mut self, within: Duration) -> Vec<u8> {
        if tokio::time::timeout(within, &mut self.task).await.is_err() {
            debug!(within_ms = %within.as_millis(), "Pipe still open, drain cut short");
            self.task.abort();
        }
        take(&self.buffer)
    }
}

async fn finish_drain(drain: Option<PipeDrain>, within: Duration) -> Vec<u8> {
    match drain {
        Some(d) => d.finish(within).await,
        None => Vec::new(),
    }
}

// ----------------------------------------------------------------------------
// Strategies
// ----------------------------------------------------------------------------

#[async_trait]
impl CommandRunner for SubprocessRunner {
    fn run_blocking(&self, invocation: &Invocation) -> Result<Completion, CommandError> {
        // A thread already inside a runtime cannot block_on another one
        if tokio::runtime::Handle::try_current().is_err() {
            return self.supervise_on_private_runtime(invocation);
        }

        thread::scope(|scope| {
            scope
                .spawn(|| self.supervise_on_private_runtime(invocation))
                .join()
                .unwrap_or_else(|_| {
                    Err(CommandError::Unexpected(
                        "Supervisor thread panicked".to_string(),
                    ))
                })
        })
    }

    async fn run_async(&self, invocation: &Invocation) -> Result<Completion, CommandError> {
        self.supervise(invocation).await
    }
}
