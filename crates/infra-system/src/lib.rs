// Hostkit Infrastructure - System Adapters
// Implements: CommandRunner, SystemProbe, FileStore, LifecycleLogger

pub mod file_store_impl;
pub mod lifecycle_logger_impl;
pub mod process_control;
pub mod subprocess_runner;
pub mod system_probe_impl;

pub use file_store_impl::LocalFileStore;
pub use lifecycle_logger_impl::TracingLifecycleLogger;
pub use subprocess_runner::SubprocessRunner;
pub use system_probe_impl::SystemProbeImpl;
