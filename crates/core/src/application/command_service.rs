// Command execution service
// One pipeline (prepare -> run -> normalize -> report), two ways of waiting
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use super::normalize::normalize;
use crate::domain::{CommandError, CommandResult, Completion, Invocation};
use crate::port::{CommandRunner, LifecycleLogger};

/// How the caller waits for the child
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scheduling {
    Blocking,
    Cooperative,
}

impl Scheduling {
    fn label(self) -> &'static str {
        match self {
            Scheduling::Blocking => "Command",
            Scheduling::Cooperative => "Async command",
        }
    }
}

/// Runs command lines and never fails: every error is folded into the result
///
/// Stateless between calls; each invocation owns its child process, pipes and
/// buffers. There is no concurrency cap; callers that need one can wrap
/// `run_async` in a `tokio::sync::Semaphore`.
pub struct CommandService {
    runner: Arc<dyn CommandRunner>,
    logger: Arc<dyn LifecycleLogger>,
}

impl CommandService {
    /// Create a new command service
    ///
    /// # Arguments
    /// * `runner` - Launches and supervises child processes
    /// * `logger` - Receives one "executing" and one outcome notice per call
    ///
    /// # Example
    /// ```ignore
    /// let service = CommandService::new(
    ///     Arc::new(SubprocessRunner::new()),
    ///     Arc::new(TracingLifecycleLogger),
    /// );
    /// let result = service.run("uname -r", DEFAULT_TIMEOUT, true);
    /// ```
    pub fn new(runner: Arc<dyn CommandRunner>, logger: Arc<dyn LifecycleLogger>) -> Self {
        Self { runner, logger }
    }

    /// Run a command line, blocking the current thread
    ///
    /// Blocks for at most `timeout` past launch (plus a bounded output drain).
    pub fn run(&self, command: &str, timeout: Duration, capture_output: bool) -> CommandResult {
        self.execute_blocking(command, timeout, capture_output).1
    }

    /// Like `run`, but keeps runner failures as typed errors
    ///
    /// `Ok` only when the process ran to exit, whatever its exit code.
    pub fn try_run(
        &self,
        command: &str,
        timeout: Duration,
        capture_output: bool,
    ) -> Result<CommandResult, CommandError> {
        let (outcome, result) = self.execute_blocking(command, timeout, capture_output);
        outcome.map(|_| result)
    }

    /// Run a command line without blocking the executor
    ///
    /// Suspends while waiting for exit, and while draining pipes after a kill.
    pub async fn run_async(
        &self,
        command: &str,
        timeout: Duration,
        capture_output: bool,
    ) -> CommandResult {
        self.execute_async(command, timeout, capture_output).await.1
    }

    /// Async counterpart of `try_run`
    pub async fn try_run_async(
        &self,
        command: &str,
        timeout: Duration,
        capture_output: bool,
    ) -> Result<CommandResult, CommandError> {
        let (outcome, result) = self.execute_async(command, timeout, capture_output).await;
        outcome.map(|_| result)
    }

    fn execute_blocking(
        &self,
        command: &str,
        timeout: Duration,
        capture_output: bool,
    ) -> (Result<Completion, CommandError>, CommandResult) {
        let scheduling = Scheduling::Blocking;
        let started = Instant::now();

        let outcome = self
            .prepare(command, timeout, capture_output, scheduling)
            .and_then(|invocation| self.runner.run_blocking(&invocation));

        let result = self.conclude(command, &outcome, started.elapsed(), scheduling);
        (outcome, result)
    }

    async fn execute_async(
        &self,
        command: &str,
        timeout: Duration,
        capture_output: bool,
    ) -> (Result<Completion, CommandError>, CommandResult) {
        let scheduling = Scheduling::Cooperative;
        let started = Instant::now();

        let outcome = match self.prepare(command, timeout, capture_output, scheduling) {
            Ok(invocation) => self.runner.run_async(&invocation).await,
            Err(e) => Err(e),
        };

        let result = self.conclude(command, &outcome, started.elapsed(), scheduling);
        (outcome, result)
    }

    /// Announce the call, then tokenize; nothing is launched on failure
    fn prepare(
        &self,
        command: &str,
        timeout: Duration,
        capture_output: bool,
        scheduling: Scheduling,
    ) -> Result<Invocation, CommandError> {
        self.logger
            .info(&format!("Executing {}: {}", scheduling.label().to_lowercase(), command));

        let invocation = Invocation::parse(command, timeout, capture_output)?;

        debug!(
            argv = ?invocation.program_and_args(),
            timeout_ms = %invocation.timeout().as_millis(),
            capture_output = %capture_output,
            "Invocation prepared"
        );

        Ok(invocation)
    }

    /// Normalize the outcome and emit the closing lifecycle notice
    fn conclude(
        &self,
        command: &str,
        outcome: &Result<Completion, CommandError>,
        elapsed: Duration,
        scheduling: Scheduling,
    ) -> CommandResult {
        let result = normalize(outcome, elapsed);
        let label = scheduling.label();

        match outcome {
            Ok(_) => self
                .logger
                .info(&format!("{} executed successfully: {}", label, result)),
            Err(CommandError::Timeout { .. }) => self
                .logger
                .error(&format!("{} timeout: {}", label, command)),
            Err(e) => self
                .logger
                .error(&format!("{} execution failed: {}", label, e)),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FailureKind;
    use crate::port::command_runner::mocks::{MockBehavior, MockCommandRunner};
    use crate::port::lifecycle_logger::mocks::RecordingLogger;
    use crate::port::LogLevel;

    const TIMEOUT: Duration = Duration::from_secs(30);

    fn service(runner: Arc<MockCommandRunner>) -> (CommandService, RecordingLogger) {
        let logger = RecordingLogger::new();
        (CommandService::new(runner, Arc::new(logger.clone())), logger)
    }

    #[test]
    fn test_run_success() {
        let runner = Arc::new(MockCommandRunner::new_exit(0, "hello\n", ""));
        let (service, logger) = service(runner.clone());

        let result = service.run("echo hello", TIMEOUT, true);

        assert_eq!(result.stdout(), "hello");
        assert_eq!(result.stderr(), "");
        assert_eq!(result.return_code(), 0);
        assert!(result.success());
        assert_eq!(runner.calls(), vec![vec!["echo".to_string(), "hello".to_string()]]);

        let entries = logger.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], (LogLevel::Info, "Executing command: echo hello".to_string()));
        assert_eq!(entries[1].0, LogLevel::Info);
        assert!(entries[1].1.starts_with("Command executed successfully"));
    }

    #[test]
    fn test_empty_command_never_launches() {
        let runner = Arc::new(MockCommandRunner::new_exit(0, "", ""));
        let (service, logger) = service(runner.clone());

        let result = service.run("", TIMEOUT, true);

        assert_eq!(runner.call_count(), 0);
        assert_eq!(result.return_code(), -1);
        assert_eq!(result.failure(), Some(FailureKind::Malformed));
        assert!(result.stderr().starts_with("Malformed command"));
        assert_eq!(logger.levels(), vec![LogLevel::Info, LogLevel::Error]);
    }

    #[test]
    fn test_try_run_surfaces_typed_errors() {
        let runner = Arc::new(MockCommandRunner::new(MockBehavior::Timeout(String::new())));
        let (service, _logger) = service(runner);

        let err = service.try_run("sleep 5", Duration::from_secs(1), true).unwrap_err();
        assert!(matches!(err, CommandError::Timeout { .. }));

        let err = service.try_run("echo 'open", TIMEOUT, true).unwrap_err();
        assert!(matches!(err, CommandError::MalformedCommand(_)));
    }

    #[test]
    fn test_timeout_is_folded() {
        let runner = Arc::new(MockCommandRunner::new(MockBehavior::Timeout("tick".into())));
        let (service, logger) = service(runner);

        let result = service.run("sleep 5", Duration::from_secs(1), true);

        assert_eq!(result.return_code(), -1);
        assert_eq!(result.stderr(), "Command timeout");
        assert_eq!(result.stdout(), "tick");
        assert_eq!(
            logger.entries()[1],
            (LogLevel::Error, "Command timeout: sleep 5".to_string())
        );
    }

    #[test]
    fn test_launch_failure_is_folded() {
        let runner = Arc::new(MockCommandRunner::new(MockBehavior::LaunchFail(
            "No such file or directory".into(),
        )));
        let (service, _logger) = service(runner);

        let result = service.run("nonexistent-binary-xyz --flag", TIMEOUT, true);

        assert_eq!(result.return_code(), -1);
        assert_eq!(result.stdout(), "");
        assert_eq!(
            result.stderr(),
            "nonexistent-binary-xyz: No such file or directory"
        );
        assert_eq!(result.failure(), Some(FailureKind::Launch));
    }

    #[test]
    fn test_failure_does_not_leak_into_next_call() {
        let runner = Arc::new(MockCommandRunner::new(MockBehavior::Unexpected("boom".into())));
        let (service, _logger) = service(runner.clone());

        let failed = service.run("false", TIMEOUT, true);
        runner.set_behavior(MockBehavior::Exit {
            code: Some(0),
            stdout: "ok".into(),
            stderr: String::new(),
        });
        let ok = service.run("true", TIMEOUT, true);

        assert!(failed.is_failure());
        assert!(ok.success());
        assert_eq!(ok.stdout(), "ok");
    }

    #[test]
    fn test_process_returning_minus_one_is_not_a_runner_failure() {
        let runner = Arc::new(MockCommandRunner::new_exit(-1, "", "own failure"));
        let (service, _logger) = service(runner);

        let result = service.try_run("tool", TIMEOUT, true).unwrap();
        assert_eq!(result.return_code(), -1);
        assert_eq!(result.failure(), None);
    }

    #[tokio::test]
    async fn test_run_async_logs_with_async_label() {
        let runner = Arc::new(MockCommandRunner::new_exit(0, "x", ""));
        let (service, logger) = service(runner);

        let result = service.run_async("ls -la", TIMEOUT, true).await;

        assert_eq!(result.stdout(), "x");
        let entries = logger.entries();
        assert_eq!(entries[0].1, "Executing async command: ls -la");
        assert!(entries[1].1.starts_with("Async command executed successfully"));
    }

    #[test]
    fn test_sync_and_async_agree() {
        let runner = Arc::new(MockCommandRunner::new_exit(2, " out ", " err "));
        let (service, _logger) = service(runner);

        let sync = service.run("tool a b", TIMEOUT, true);
        let concurrent = tokio_test::block_on(service.run_async("tool a b", TIMEOUT, true));

        assert_eq!(sync.stdout(), concurrent.stdout());
        assert_eq!(sync.stderr(), concurrent.stderr());
        assert_eq!(sync.return_code(), concurrent.return_code());
        assert_eq!(sync.failure(), concurrent.failure());
    }
}
