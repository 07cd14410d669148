//! In-memory collaborators shared by the collector tests

#![allow(dead_code)]

use async_trait::async_trait;
use directpv_node_exporter::collector::VolumeStatsCollector;
use directpv_node_exporter::consts::TENANT_LABEL;
use directpv_node_exporter::error::{ExporterError, Result};
use directpv_node_exporter::k8s::{EventRecorder, Volume, VolumeLister, VolumeStatus, VolumeStream};
use directpv_node_exporter::metrics::VolumeStats;
use directpv_node_exporter::probe::{Quota, VolumeProbe};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub const NODE: &str = "node-1";

pub enum Item {
    Volume(Volume),
    Fault(&'static str),
}

#[derive(Default)]
pub struct FakeLister {
    pub items: Vec<Item>,
    pub unreachable: bool,
    pub requested_nodes: Mutex<Vec<String>>,
    pub tokens: Mutex<Vec<CancellationToken>>,
}

impl FakeLister {
    pub fn with_volumes(volumes: Vec<Volume>) -> Self {
        Self {
            items: volumes.into_iter().map(Item::Volume).collect(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl VolumeLister for FakeLister {
    async fn list_volumes(&self, node_id: &str, cancel: CancellationToken) -> Result<VolumeStream> {
        self.requested_nodes.lock().unwrap().push(node_id.to_string());
        self.tokens.lock().unwrap().push(cancel);

        if self.unreachable {
            return Err(ExporterError::VolumeList(
                "control plane unreachable".to_string(),
            ));
        }

        let (tx, rx) = mpsc::channel(self.items.len().max(1));
        for item in &self.items {
            let result = match item {
                Item::Volume(volume) => Ok(volume.clone()),
                Item::Fault(reason) => Err(ExporterError::VolumeList(reason.to_string())),
            };
            tx.try_send(result).unwrap();
        }
        Ok(rx)
    }
}

#[derive(Default)]
pub struct FakeProbe {
    pub devices: HashMap<String, String>,
    pub quotas: HashMap<(String, String), Quota>,
    pub resolved: Mutex<Vec<String>>,
    pub probed: Mutex<Vec<(String, String)>>,
}

impl FakeProbe {
    pub fn device(mut self, fs_uuid: &str, device: &str) -> Self {
        self.devices.insert(fs_uuid.to_string(), device.to_string());
        self
    }

    pub fn quota(mut self, device: &str, volume: &str, current: u64, total: u64) -> Self {
        self.quotas.insert(
            (device.to_string(), volume.to_string()),
            Quota {
                hard_limit: total,
                soft_limit: total,
                current_space: current,
            },
        );
        self
    }
}

#[async_trait]
impl VolumeProbe for FakeProbe {
    fn resolve_device(&self, fs_uuid: &str) -> Result<String> {
        self.resolved.lock().unwrap().push(fs_uuid.to_string());
        self.devices
            .get(fs_uuid)
            .cloned()
            .ok_or_else(|| ExporterError::DeviceNotFound(fs_uuid.to_string()))
    }

    async fn probe_quota(
        &self,
        device: &str,
        volume_id: &str,
        _cancel: &CancellationToken,
    ) -> Result<Quota> {
        let key = (device.to_string(), volume_id.to_string());
        self.probed.lock().unwrap().push(key.clone());
        self.quotas
            .get(&key)
            .copied()
            .ok_or_else(|| ExporterError::Quota(format!("no quota for {}", volume_id)))
    }
}

#[derive(Default)]
pub struct FakeRecorder {
    pub events: Mutex<Vec<(String, String, String)>>,
}

impl EventRecorder for FakeRecorder {
    fn record_warning(&self, volume: &Volume, reason: &str, message: String) {
        self.events
            .lock()
            .unwrap()
            .push((volume.name.clone(), reason.to_string(), message));
    }
}

pub fn mounted(name: &str, fs_uuid: &str, capacity: u64) -> Volume {
    Volume {
        name: name.to_string(),
        uid: Some(format!("uid-{}", name)),
        labels: Default::default(),
        status: VolumeStatus {
            fs_uuid: fs_uuid.to_string(),
            node_name: NODE.to_string(),
            total_capacity: capacity as i64,
            container_path: format!("/var/lib/kubelet/pods/{}/mount", name),
        },
    }
}

pub fn unmounted(name: &str, fs_uuid: &str) -> Volume {
    let mut volume = mounted(name, fs_uuid, 10);
    volume.status.container_path.clear();
    volume
}

pub fn with_tenant(mut volume: Volume, tenant: &str) -> Volume {
    volume
        .labels
        .insert(TENANT_LABEL.to_string(), tenant.to_string());
    volume
}

pub struct Harness {
    pub lister: Arc<FakeLister>,
    pub probe: Arc<FakeProbe>,
    pub recorder: Arc<FakeRecorder>,
    pub collector: VolumeStatsCollector,
}

pub fn harness(lister: FakeLister, probe: FakeProbe) -> Harness {
    let lister = Arc::new(lister);
    let probe = Arc::new(probe);
    let recorder = Arc::new(FakeRecorder::default());
    let collector =
        VolumeStatsCollector::new(NODE, lister.clone(), probe.clone(), recorder.clone())
            .expect("Failed to create collector");

    Harness {
        lister,
        probe,
        recorder,
        collector,
    }
}

pub fn volume_ids(stats: &[VolumeStats]) -> Vec<&str> {
    stats.iter().map(|s| s.volume_id.as_str()).collect()
}
