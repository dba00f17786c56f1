// Command Error Types

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::application::constants::TIMEOUT_MARKER;

/// Why a command did not complete
///
/// Every variant is folded into a `CommandResult` with `return_code == -1`
/// at the service boundary.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Tokenization failed (empty input, unterminated quoting) or the
    /// invocation parameters were invalid. Raised before any launch.
    #[error("Malformed command: {0}")]
    MalformedCommand(String),

    /// The executable could not be found or started
    #[error("{program}: {source}")]
    LaunchFailure {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The deadline elapsed; the child was killed and reaped
    #[error("{}", TIMEOUT_MARKER)]
    Timeout {
        timeout: Duration,
        /// Stdout drained after the kill
        partial_stdout: Vec<u8>,
    },

    /// Any other fault while waiting on or talking to the child
    #[error("{0}")]
    Unexpected(String),
}

impl CommandError {
    pub fn launch(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::LaunchFailure {
            program: program.into(),
            source,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            CommandError::MalformedCommand(_) => FailureKind::Malformed,
            CommandError::LaunchFailure { .. } => FailureKind::Launch,
            CommandError::Timeout { .. } => FailureKind::Timeout,
            CommandError::Unexpected(_) => FailureKind::Unexpected,
        }
    }
}

/// Runner-level failure recorded on a `CommandResult`
///
/// Present only when the `-1` return code was produced by the runner rather
/// than by the process itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Malformed,
    Launch,
    Timeout,
    Unexpected,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Malformed => write!(f, "malformed"),
            FailureKind::Launch => write!(f, "launch"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Unexpected => write!(f, "unexpected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_displays_marker() {
        let err = CommandError::Timeout {
            timeout: Duration::from_secs(1),
            partial_stdout: b"partial".to_vec(),
        };
        assert_eq!(err.to_string(), "Command timeout");
        assert_eq!(err.kind(), FailureKind::Timeout);
    }

    #[test]
    fn test_launch_failure_names_program() {
        let err = CommandError::launch(
            "nonexistent-binary-xyz",
            std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
        );
        assert_eq!(
            err.to_string(),
            "nonexistent-binary-xyz: No such file or directory"
        );
        assert_eq!(err.kind(), FailureKind::Launch);
    }
}
