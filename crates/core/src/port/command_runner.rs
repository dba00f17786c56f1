// Command Runner Port
// Abstraction over launching a child and supervising it against a deadline

use crate::domain::{CommandError, Completion, Invocation};
use async_trait::async_trait;

/// Launches an invocation and waits for it under its timeout
///
/// Both methods share one contract and differ only in how they wait:
/// `run_blocking` parks the calling thread, `run_async` suspends the task.
///
/// Implementations must guarantee that when they return, the child has
/// exited or been killed and reaped. On timeout the child is killed first
/// and only then is its remaining output drained.
///
/// Implementations:
/// - SubprocessRunner: spawns a real OS process
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run to completion, blocking the current thread
    ///
    /// # Errors
    /// - CommandError::LaunchFailure if the executable cannot be started
    /// - CommandError::Timeout if the deadline elapsed (child killed)
    /// - CommandError::Unexpected for any other wait/pipe failure
    fn run_blocking(&self, invocation: &Invocation) -> Result<Completion, CommandError>;

    /// Run to completion, yielding to other tasks while waiting
    ///
    /// Same errors as `run_blocking`.
    async fn run_async(&self, invocation: &Invocation) -> Result<Completion, CommandError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock runner behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Exit with code and output
        Exit {
            code: Option<i32>,
            stdout: String,
            stderr: String,
        },
        /// Fail to launch with the given OS message
        LaunchFail(String),
        /// Time out after producing some stdout
        Timeout(String),
        /// Fail while waiting
        Unexpected(String),
    }

    /// Mock Command Runner for testing
    pub struct MockCommandRunner {
        behavior: Arc<Mutex<MockBehavior>>,
        calls: Arc<Mutex<Vec<Vec<String>>>>,
    }

    impl MockCommandRunner {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn new_exit(code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
            Self::new(MockBehavior::Exit {
                code: Some(code),
                stdout: stdout.into(),
                stderr: stderr.into(),
            })
        }

        pub fn set_behavior(&self, behavior: MockBehavior) {
            *self.behavior.lock().unwrap() = behavior;
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        /// Argument vectors seen so far
        pub fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }

        fn respond(&self, invocation: &Invocation) -> Result<Completion, CommandError> {
            self.calls
                .lock()
                .unwrap()
                .push(invocation.program_and_args().to_vec());

            let behavior = self.behavior.lock().unwrap().clone();

            match behavior {
                MockBehavior::Exit {
                    code,
                    stdout,
                    stderr,
                } => Ok(Completion {
                    exit_code: code,
                    stdout: stdout.into_bytes(),
                    stderr: stderr.into_bytes(),
                }),
                MockBehavior::LaunchFail(msg) => Err(CommandError::launch(
                    invocation.program(),
                    std::io::Error::new(std::io::ErrorKind::NotFound, msg),
                )),
                MockBehavior::Timeout(partial) => Err(CommandError::Timeout {
                    timeout: invocation.timeout(),
                    partial_stdout: partial.into_bytes(),
                }),
                MockBehavior::Unexpected(msg) => Err(CommandError::Unexpected(msg)),
            }
        }
    }

    #[async_trait]
    impl CommandRunner for MockCommandRunner {
        fn run_blocking(&self, invocation: &Invocation) -> Result<Completion, CommandError> {
            self.respond(invocation)
        }

        async fn run_async(&self, invocation: &Invocation) -> Result<Completion, CommandError> {
            self.respond(invocation)
        }
    }
}
