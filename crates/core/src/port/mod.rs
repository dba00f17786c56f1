// Port Layer - Interfaces for external dependencies

pub mod command_runner;
pub mod file_store;
pub mod lifecycle_logger;
pub mod system_probe;

// Re-exports
pub use command_runner::CommandRunner;
pub use file_store::FileStore;
pub use lifecycle_logger::{LifecycleLogger, LogLevel};
pub use system_probe::{MetricsSnapshot, NetworkIo, SystemProbe};
