// Command Invocation Domain Model

use std::time::Duration;

use super::error::CommandError;
use super::tokenizer::tokenize;
use crate::application::constants::DEFAULT_TIMEOUT;

/// Normalized request for one command execution
///
/// Constructed per call and consumed once. `program_and_args` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program_and_args: Vec<String>,
    timeout: Duration,
    capture_output: bool,
}

impl Invocation {
    /// Tokenize a command line into an invocation
    ///
    /// # Errors
    /// - `CommandError::MalformedCommand` if the line is empty, badly quoted,
    ///   or the timeout is zero
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use hostkit_core::domain::Invocation;
    ///
    /// let inv = Invocation::parse("echo 'hello world'", Duration::from_secs(5), true).unwrap();
    /// assert_eq!(inv.program(), "echo");
    /// assert_eq!(inv.args(), ["hello world".to_string()]);
    /// ```
    pub fn parse(
        command: &str,
        timeout: Duration,
        capture_output: bool,
    ) -> Result<Self, CommandError> {
        Self::from_argv(tokenize(command)?, timeout, capture_output)
    }

    /// Build an invocation from an already-split argument vector
    pub fn from_argv(
        program_and_args: Vec<String>,
        timeout: Duration,
        capture_output: bool,
    ) -> Result<Self, CommandError> {
        if program_and_args.is_empty() {
            return Err(CommandError::MalformedCommand(
                "empty command".to_string(),
            ));
        }
        if timeout.is_zero() {
            return Err(CommandError::MalformedCommand(
                "timeout must be positive".to_string(),
            ));
        }

        Ok(Self {
            program_and_args,
            timeout,
            capture_output,
        })
    }

    /// Invocation with the default 30s timeout and captured output
    pub fn with_defaults(command: &str) -> Result<Self, CommandError> {
        Self::parse(command, DEFAULT_TIMEOUT, true)
    }

    pub fn program(&self) -> &str {
        &self.program_and_args[0]
    }

    pub fn args(&self) -> &[String] {
        &self.program_and_args[1..]
    }

    pub fn program_and_args(&self) -> &[String] {
        &self.program_and_args
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn capture_output(&self) -> bool {
        self.capture_output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_program_and_args() {
        let inv = Invocation::parse("ls -la /tmp", Duration::from_secs(3), false).unwrap();
        assert_eq!(inv.program(), "ls");
        assert_eq!(inv.args(), ["-la".to_string(), "/tmp".to_string()]);
        assert_eq!(inv.timeout(), Duration::from_secs(3));
        assert!(!inv.capture_output());
    }

    #[test]
    fn test_defaults() {
        let inv = Invocation::with_defaults("uname -r").unwrap();
        assert_eq!(inv.timeout(), Duration::from_secs(30));
        assert!(inv.capture_output());
    }

    #[test]
    fn test_rejects_empty_argv() {
        let result = Invocation::from_argv(vec![], Duration::from_secs(1), true);
        assert!(matches!(result, Err(CommandError::MalformedCommand(_))));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let result = Invocation::parse("true", Duration::ZERO, true);
        assert!(matches!(result, Err(CommandError::MalformedCommand(_))));
    }
}
