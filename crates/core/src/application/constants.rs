// Shared constants (no magic values)
use std::time::Duration;

/// Default wall-clock limit for one invocation (30s)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Return code reserved for runner-level failures
pub const FAILURE_RETURN_CODE: i32 = -1;

/// Exact stderr text of a timed-out invocation
pub const TIMEOUT_MARKER: &str = "Command timeout";

/// Upper bound on draining pipes after the child is gone (2s)
/// A grandchild that inherited the pipe must not hold the caller forever.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Default polling interval for the metrics monitor (5s)
pub const DEFAULT_MONITOR_INTERVAL: Duration = Duration::from_secs(5);

/// Default mount point inspected by the metrics monitor
pub const DEFAULT_MOUNT_POINT: &str = "/";

/// Log file size that triggers rotation (5 MiB)
pub const LOG_ROTATE_BYTES: u64 = 5 * 1024 * 1024;

/// Rotated log files kept next to the active one
pub const LOG_BACKUP_COUNT: u32 = 3;
