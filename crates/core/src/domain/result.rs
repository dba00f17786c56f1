// Command Result Domain Model

use serde::{Deserialize, Serialize};

use super::error::FailureKind;

/// Raw outcome of a child that ran to exit
///
/// Produced by a `CommandRunner`; bytes are exactly what the pipes carried.
#[derive(Debug, Clone, Default)]
pub struct Completion {
    /// None when the child was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Normalized response for one invocation
///
/// Immutable once built. `return_code == -1` is ambiguous on its own: a
/// process may legitimately exit with it. `failure` tells the two apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    stdout: String,
    stderr: String,
    return_code: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    failure: Option<FailureKind>,
    #[serde(default)]
    duration_ms: u64,
}

impl CommandResult {
    pub(crate) fn new(
        stdout: String,
        stderr: String,
        return_code: i32,
        failure: Option<FailureKind>,
        duration_ms: u64,
    ) -> Self {
        Self {
            stdout,
            stderr,
            return_code,
            failure,
            duration_ms,
        }
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    pub fn return_code(&self) -> i32 {
        self.return_code
    }

    /// Runner-level failure, if the runner (not the process) produced the result
    pub fn failure(&self) -> Option<FailureKind> {
        self.failure
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Process ran to completion and exited with 0
    pub fn success(&self) -> bool {
        self.failure.is_none() && self.return_code == 0
    }

    pub fn is_timeout(&self) -> bool {
        self.failure == Some(FailureKind::Timeout)
    }

    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

impl std::fmt::Display for CommandResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{stdout: {:?}, stderr: {:?}, return_code: {}}}",
            self.stdout, self.stderr, self.return_code
        )
    }
}
