// System probe implementation
// reason: sysinfo for cross-platform system monitoring
use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use sysinfo::{Networks, System, MINIMUM_CPU_UPDATE_INTERVAL};
use tracing::debug;

use hostkit_core::error::{AppError, Result};
use hostkit_core::port::system_probe::{NetworkIo, SystemProbe};

/// Default CPU sampling window (1s)
const DEFAULT_CPU_SAMPLE_WINDOW: Duration = Duration::from_secs(1);

/// System probe implementation using sysinfo
///
/// CPU usage is the delta between two refreshes taken `cpu_sample_window`
/// apart; the other readings are a single refresh.
pub struct SystemProbeImpl {
    system: Arc<Mutex<System>>,
    cpu_sample_window: Duration,
}

impl SystemProbeImpl {
    /// Create a new system probe
    ///
    /// # Example
    /// ```ignore
    /// let probe = SystemProbeImpl::new();
    /// ```
    pub fn new() -> Self {
        Self {
            system: Arc::new(Mutex::new(System::new())),
            cpu_sample_window: DEFAULT_CPU_SAMPLE_WINDOW,
        }
    }

    /// Shorten or lengthen the CPU sampling window
    ///
    /// Clamped to sysinfo's minimum update interval.
    pub fn with_cpu_sample_window(mut self, window: Duration) -> Self {
        self.cpu_sample_window = window.max(MINIMUM_CPU_UPDATE_INTERVAL);
        self
    }

    fn system(&self) -> MutexGuard<'_, System> {
        self.system
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for SystemProbeImpl {
    fn default() -> Self {
        Self::new()
    }
}

/// `(used, total)` bytes of the filesystem holding `path`
///
/// `total` counts only space available to unprivileged users, so the
/// percentage matches what `df` reports.
#[cfg(unix)]
#[allow(clippy::unnecessary_cast)]
fn filesystem_usage(path: &str) -> Result<(u64, u64)> {
    use nix::errno::Errno;
    use nix::sys::statvfs::statvfs;

    let stat = statvfs(Path::new(path)).map_err(|errno| match errno {
        Errno::ENOENT | Errno::ENOTDIR => {
            AppError::NotFound(format!("No filesystem at {}", path))
        }
        other => AppError::Io(std::io::Error::from(other)),
    })?;

    let fragment = stat.fragment_size() as u64;
    let used = (stat.blocks() as u64).saturating_sub(stat.blocks_free() as u64) * fragment;
    let available = stat.blocks_available() as u64 * fragment;
    Ok((used, used + available))
}

/// Longest listed mount point that contains `path`
#[cfg(not(unix))]
fn filesystem_usage(path: &str) -> Result<(u64, u64)> {
    use sysinfo::Disks;

    let disks = Disks::new_with_refreshed_list();
    let target = Path::new(path);

    let disk = disks
        .iter()
        .filter(|disk| target.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().components().count())
        .ok_or_else(|| AppError::NotFound(format!("No filesystem at {}", path)))?;

    let total = disk.total_space();
    Ok((total.saturating_sub(disk.available_space()), total))
}

fn percent(used: u64, total: u64) -> f32 {
    if total == 0 {
        return 0.0;
    }
    (used as f64 / total as f64 * 100.0) as f32
}

#[async_trait]
impl SystemProbe for SystemProbeImpl {
    async fn cpu_usage_percent(&self) -> f32 {
        self.system().refresh_cpu();

        // Guard is released before sleeping
        tokio::time::sleep(self.cpu_sample_window).await;

        let mut sys = self.system();
        sys.refresh_cpu();
        let cpu = sys.global_cpu_info().cpu_usage();

        debug!(cpu = %cpu, window_ms = %self.cpu_sample_window.as_millis(), "CPU usage sampled");
        cpu
    }

    async fn memory_usage_percent(&self) -> f32 {
        let mut sys = self.system();
        sys.refresh_memory();

        let used = sys.used_memory();
        let total = sys.total_memory();

        debug!(
            mem_used_mb = %(used / 1024 / 1024),
            mem_total_mb = %(total / 1024 / 1024),
            "Memory usage sampled"
        );
        percent(used, total)
    }

    async fn disk_usage_percent(&self, mount_point: &str) -> Result<f32> {
        let (used, total) = filesystem_usage(mount_point)?;

        debug!(
            mount_point = %mount_point,
            disk_used_gb = %(used / 1024 / 1024 / 1024),
            disk_total_gb = %(total / 1024 / 1024 / 1024),
            "Disk usage sampled"
        );
        Ok(percent(used, total))
    }

    async fn network_io(&self) -> NetworkIo {
        let networks = Networks::new_with_refreshed_list();

        let io = networks
            .iter()
            .fold(NetworkIo::default(), |mut acc, (_name, data)| {
                acc.bytes_sent += data.total_transmitted();
                acc.bytes_recv += data.total_received();
                acc.packets_sent += data.total_packets_transmitted();
                acc.packets_recv += data.total_packets_received();
                acc.errout += data.total_errors_on_transmitted();
                acc.errin += data.total_errors_on_received();
                acc
            });

        debug!(
            bytes_sent = %io.bytes_sent,
            bytes_recv = %io.bytes_recv,
            "Network counters sampled"
        );
        io
    }
}
