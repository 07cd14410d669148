//! Node-local volume probes
//!
//! [`VolumeProbe`] bundles the two node-side lookups the collector needs for
//! every mounted volume: mapping a filesystem UUID to its block device and
//! reading the project quota of the volume on that device.

pub mod device;
pub mod xfs;

pub use device::UdevDeviceResolver;
pub use xfs::XfsQuotaProber;

use crate::error::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Usage reported by a quota query, in bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Quota {
    pub hard_limit: u64,
    pub soft_limit: u64,
    pub current_space: u64,
}

#[async_trait]
pub trait VolumeProbe: Send + Sync {
    /// Map a filesystem UUID to a device path
    fn resolve_device(&self, fs_uuid: &str) -> Result<String>;

    /// Read the quota of `volume_id` on `device`
    async fn probe_quota(
        &self,
        device: &str,
        volume_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Quota>;
}

/// Production probe: udev device links plus XFS project quotas
pub struct NodeProbe {
    devices: UdevDeviceResolver,
    quotas: XfsQuotaProber,
}

impl NodeProbe {
    pub fn new(devices: UdevDeviceResolver, quotas: XfsQuotaProber) -> Self {
        Self { devices, quotas }
    }
}

#[async_trait]
impl VolumeProbe for NodeProbe {
    fn resolve_device(&self, fs_uuid: &str) -> Result<String> {
        self.devices.resolve(fs_uuid)
    }

    async fn probe_quota(
        &self,
        device: &str,
        volume_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Quota> {
        self.quotas.get_quota(device, volume_id, cancel).await
    }
}
