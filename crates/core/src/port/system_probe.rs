// System resource monitoring port
// reason: async-trait, CPU sampling has to wait between two refreshes
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Cumulative network counters summed over all interfaces
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkIo {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub packets_sent: u64,
    pub packets_recv: u64,
    pub errin: u64,
    pub errout: u64,
}

/// Point-in-time reading of host resources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub sampled_at: DateTime<Utc>,
    pub cpu_usage_percent: f32,
    pub memory_usage_percent: f32,
    pub mount_point: String,
    pub disk_usage_percent: f32,
    pub network: NetworkIo,
}

/// System probe port for resource monitoring
///
/// Independent of the command subsystem; polled by the `monitor` command.
#[async_trait]
pub trait SystemProbe: Send + Sync {
    /// Global CPU usage (0.0 - 100.0) measured over a short sampling window
    async fn cpu_usage_percent(&self) -> f32;

    /// Used memory as a percentage of total
    async fn memory_usage_percent(&self) -> f32;

    /// Used space on the disk mounted at `mount_point`
    ///
    /// # Errors
    /// - AppError::NotFound if no disk is mounted there
    async fn disk_usage_percent(&self, mount_point: &str) -> Result<f32>;

    /// Network counters since boot
    async fn network_io(&self) -> NetworkIo;

    /// Collect every reading at once
    ///
    /// # Example
    /// ```text
    /// let snapshot = probe.snapshot("/").await?;
    /// if snapshot.disk_usage_percent > 90.0 {
    ///     println!("Low disk space on /");
    /// }
    /// ```
    async fn snapshot(&self, mount_point: &str) -> Result<MetricsSnapshot> {
        let cpu_usage_percent = self.cpu_usage_percent().await;
        let memory_usage_percent = self.memory_usage_percent().await;
        let disk_usage_percent = self.disk_usage_percent(mount_point).await?;
        let network = self.network_io().await;

        Ok(MetricsSnapshot {
            sampled_at: Utc::now(),
            cpu_usage_percent,
            memory_usage_percent,
            mount_point: mount_point.to_string(),
            disk_usage_percent,
            network,
        })
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;

    /// Mock SystemProbe for testing
    pub struct MockSystemProbe {
        cpu_usage_percent: f32,
        disks: Vec<(String, f32)>,
    }

    impl MockSystemProbe {
        pub fn new(cpu_usage_percent: f32) -> Self {
            Self {
                cpu_usage_percent,
                disks: vec![("/".to_string(), 42.0)],
            }
        }
    }

    #[async_trait]
    impl SystemProbe for MockSystemProbe {
        async fn cpu_usage_percent(&self) -> f32 {
            self.cpu_usage_percent
        }

        async fn memory_usage_percent(&self) -> f32 {
            50.0
        }

        async fn disk_usage_percent(&self, mount_point: &str) -> Result<f32> {
            self.disks
                .iter()
                .find(|(mount, _)| mount == mount_point)
                .map(|(_, percent)| *percent)
                .ok_or_else(|| AppError::NotFound(format!("mount point {}", mount_point)))
        }

        async fn network_io(&self) -> NetworkIo {
            NetworkIo {
                bytes_sent: 1024,
                bytes_recv: 2048,
                packets_sent: 8,
                packets_recv: 16,
                errin: 0,
                errout: 0,
            }
        }
    }
}
