// Lifecycle Logger Port
// Write-only sink for command lifecycle notices; never consulted for control flow

use serde::{Deserialize, Serialize};

/// Severity of a lifecycle notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARNING"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Leveled text sink injected into the command service
///
/// Implementations:
/// - TracingLifecycleLogger: forwards to `tracing` events
pub trait LifecycleLogger: Send + Sync {
    /// Record one message
    fn log(&self, level: LogLevel, message: &str);

    fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    fn warning(&self, message: &str) {
        self.log(LogLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    fn critical(&self, message: &str) {
        self.log(LogLevel::Critical, message);
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records every notice for later assertions
    #[derive(Clone, Default)]
    pub struct RecordingLogger {
        entries: Arc<Mutex<Vec<(LogLevel, String)>>>,
    }

    impl RecordingLogger {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn entries(&self) -> Vec<(LogLevel, String)> {
            self.entries.lock().unwrap().clone()
        }

        pub fn levels(&self) -> Vec<LogLevel> {
            self.entries().into_iter().map(|(level, _)| level).collect()
        }
    }

    impl LifecycleLogger for RecordingLogger {
        fn log(&self, level: LogLevel, message: &str) {
            self.entries
                .lock()
                .unwrap()
                .push((level, message.to_string()));
        }
    }
}
