// Result normalizer
// Folds every terminal state of an invocation into one CommandResult shape

use std::time::Duration;

use super::constants::{FAILURE_RETURN_CODE, TIMEOUT_MARKER};
use crate::domain::{CommandError, CommandResult, Completion, FailureKind};

/// Map a runner outcome to a `CommandResult`
///
/// - completed: real exit code (or -1 if killed by a signal), trimmed output
/// - timeout: -1, partial stdout drained after the kill, `"Command timeout"`
/// - anything else: -1, empty stdout, the error description
pub fn normalize(outcome: &Result<Completion, CommandError>, elapsed: Duration) -> CommandResult {
    let duration_ms = elapsed.as_millis() as u64;

    match outcome {
        Ok(completion) => CommandResult::new(
            decode_trimmed(&completion.stdout),
            decode_trimmed(&completion.stderr),
            completion.exit_code.unwrap_or(FAILURE_RETURN_CODE),
            None,
            duration_ms,
        ),
        Err(CommandError::Timeout { partial_stdout, .. }) => CommandResult::new(
            decode_trimmed(partial_stdout),
            TIMEOUT_MARKER.to_string(),
            FAILURE_RETURN_CODE,
            Some(FailureKind::Timeout),
            duration_ms,
        ),
        Err(err) => CommandResult::new(
            String::new(),
            err.to_string(),
            FAILURE_RETURN_CODE,
            Some(err.kind()),
            duration_ms,
        ),
    }
}

/// Lossy UTF-8 decode, leading/trailing whitespace removed
fn decode_trimmed(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim().to_string()
}
