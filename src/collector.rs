//! Volume Stats Collector
//!
//! Implements the scrape-driven collection cycle:
//!
//! 1. List the volumes bound to this node
//! 2. Skip volumes that are not mounted into a container
//! 3. Resolve each mounted volume's block device from its filesystem UUID
//! 4. Probe the volume's quota on that device
//! 5. Emit `bytes_used` / `bytes_total` gauges for the volume
//!
//! # Error Handling
//!
//! Failures are never propagated to the registry; a degraded scrape simply
//! has fewer samples.
//!
//! - A failed list request, or a stream item carrying a delivery error,
//!   aborts the whole cycle (logged at debug level). Samples produced before
//!   the faulty item are kept.
//! - A device that cannot be resolved skips the volume, is logged as an
//!   error and is recorded as a warning event on the volume so an operator
//!   can reload the udev rules.
//! - A failed quota probe skips the volume and is logged as an error only.
//!
//! Volumes are processed strictly in delivery order, one at a time. Each
//! cycle owns a cancellation token that is cancelled when the cycle ends on
//! any path, which stops the lister's background paging.

use crate::error::Result;
use crate::k8s::{EventRecorder, Volume, VolumeLister};
use crate::metrics::{encode_volume_stats, stats_desc, VolumeStats};
use crate::probe::VolumeProbe;
use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use std::sync::Arc;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// Reason attached to device resolution warning events
pub const DEVICE_NOT_FOUND_REASON: &str = "NodeStageVolume";

const UDEV_RELOAD_HINT: &str =
    "either device is removed or run command `sudo udevadm control --reload-rules && sudo udevadm trigger` on the host to reload";

/// How a collection cycle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The volume stream was fully consumed
    Done,
    /// Listing failed or the stream reported a delivery error
    Aborted,
}

/// Stats produced by one collection cycle, in volume delivery order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub stats: Vec<VolumeStats>,
    pub outcome: CycleOutcome,
}

/// Prometheus collector reporting usage of the volumes on one node
pub struct VolumeStatsCollector {
    node_id: String,
    desc: Desc,
    lister: Arc<dyn VolumeLister>,
    probe: Arc<dyn VolumeProbe>,
    recorder: Arc<dyn EventRecorder>,
}

impl VolumeStatsCollector {
    pub fn new(
        node_id: impl Into<String>,
        lister: Arc<dyn VolumeLister>,
        probe: Arc<dyn VolumeProbe>,
        recorder: Arc<dyn EventRecorder>,
    ) -> Result<Self> {
        Ok(Self {
            node_id: node_id.into(),
            desc: stats_desc()?,
            lister,
            probe,
            recorder,
        })
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Run one collection cycle
    pub async fn collect_volume_stats(&self) -> CycleReport {
        let cancel = CancellationToken::new();
        let _cancel_on_exit = cancel.clone().drop_guard();

        let mut stats = Vec::new();

        let mut volumes = match self.lister.list_volumes(&self.node_id, cancel.clone()).await {
            Ok(volumes) => volumes,
            Err(e) => {
                debug!(node = %self.node_id, error = %e, "unable to get volume list");
                return CycleReport {
                    stats,
                    outcome: CycleOutcome::Aborted,
                };
            }
        };

        while let Some(result) = volumes.recv().await {
            let volume = match result {
                Ok(volume) => volume,
                Err(e) => {
                    debug!(node = %self.node_id, error = %e, "volume stream failed, aborting collection");
                    return CycleReport {
                        stats,
                        outcome: CycleOutcome::Aborted,
                    };
                }
            };

            if !volume.is_mounted() {
                continue;
            }

            if let Some(volume_stats) = self.publish_volume_stats(&volume, &cancel).await {
                stats.push(volume_stats);
            }
        }

        CycleReport {
            stats,
            outcome: CycleOutcome::Done,
        }
    }

    async fn publish_volume_stats(
        &self,
        volume: &Volume,
        cancel: &CancellationToken,
    ) -> Option<VolumeStats> {
        let fs_uuid = &volume.status.fs_uuid;

        let device = match self.probe.resolve_device(fs_uuid) {
            Ok(device) => device,
            Err(e) => {
                error!(
                    fsuuid = %fs_uuid,
                    error = %e,
                    "unable to find device by FSUUID; {}",
                    UDEV_RELOAD_HINT
                );
                self.recorder.record_warning(
                    volume,
                    DEVICE_NOT_FOUND_REASON,
                    format!(
                        "unable to find device by FSUUID {}; {}",
                        fs_uuid, UDEV_RELOAD_HINT
                    ),
                );
                return None;
            }
        };

        let quota = match self.probe.probe_quota(&device, &volume.name, cancel).await {
            Ok(quota) => quota,
            Err(e) => {
                error!(volume = %volume.name, error = %e, "unable to get quota information");
                return None;
            }
        };

        Some(VolumeStats {
            tenant: volume.tenant().to_string(),
            volume_id: volume.name.clone(),
            node: volume.status.node_name.clone(),
            bytes_used: quota.current_space,
            // Recorded capacity, not the probed hard limit
            bytes_total: volume.capacity(),
        })
    }
}

impl Collector for VolumeStatsCollector {
    fn desc(&self) -> Vec<&Desc> {
        vec![&self.desc]
    }

    /// Runs a full cycle on the ambient Tokio runtime.
    ///
    /// Must be called from a multi-threaded runtime worker or from a thread
    /// of its blocking pool. Anywhere else nothing is collected.
    fn collect(&self) -> Vec<MetricFamily> {
        let Ok(handle) = Handle::try_current() else {
            warn!("Volume stats requested outside of a Tokio runtime, skipping collection");
            return Vec::new();
        };

        // block_in_place panics on a current-thread runtime
        if handle.runtime_flavor() == RuntimeFlavor::CurrentThread {
            warn!("Volume stats requested on a current-thread Tokio runtime, skipping collection");
            return Vec::new();
        }

        let report =
            tokio::task::block_in_place(|| handle.block_on(self.collect_volume_stats()));

        match encode_volume_stats(&report.stats) {
            Ok(families) => families,
            Err(e) => {
                error!(error = %e, "unable to encode volume stats");
                Vec::new()
            }
        }
    }
}
