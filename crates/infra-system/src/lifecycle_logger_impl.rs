// Lifecycle logger backed by tracing
use tracing::{debug, error, info, warn};

use hostkit_core::port::{LifecycleLogger, LogLevel};

/// Forwards lifecycle notices to `tracing` under the `hostkit::lifecycle` target
///
/// `tracing` has no critical level; critical notices are emitted as errors
/// tagged `critical = true`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLifecycleLogger;

impl LifecycleLogger for TracingLifecycleLogger {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => debug!(target: "hostkit::lifecycle", "{}", message),
            LogLevel::Info => info!(target: "hostkit::lifecycle", "{}", message),
            LogLevel::Warning => warn!(target: "hostkit::lifecycle", "{}", message),
            LogLevel::Error => error!(target: "hostkit::lifecycle", "{}", message),
            LogLevel::Critical => {
                error!(target: "hostkit::lifecycle", critical = true, "{}", message)
            }
        }
    }
}
