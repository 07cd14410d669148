//! DirectPV Volume Type Definitions
//!
//! Rust representation of the `DirectPVVolume` custom resource as seen by the
//! exporter. Only the fields needed for usage reporting are modelled; unknown
//! fields in the API response are ignored.
//!
//! # Design Notes
//!
//! - **Serde Defaults**: every status field is `#[serde(default)]` because
//!   volumes that are still being provisioned carry a partial status.
//! - **Capacity**: `totalCapacity` is an `int64` in the CRD. It is decoded
//!   signed so a bogus negative value only zeroes one volume's total instead
//!   of failing the decode and aborting the listing.
//! - **Read Only**: the exporter never writes volumes back, so there is no
//!   `Serialize` round trip to keep stable.

use crate::consts::TENANT_LABEL;
use crate::error::{ExporterError, Result};
use kube::core::DynamicObject;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A volume owned by a node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    pub name: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub status: VolumeStatus,
}

/// Status block of a volume
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeStatus {
    #[serde(default, rename = "fsuuid")]
    pub fs_uuid: String,
    #[serde(default)]
    pub node_name: String,
    /// Signed to match the CRD's `int64`; see [`Volume::capacity`]
    #[serde(default)]
    pub total_capacity: i64,
    /// Mount path inside the consuming container; empty until published
    #[serde(default)]
    pub container_path: String,
}

impl Volume {
    /// Whether the volume is currently mounted into a container
    pub fn is_mounted(&self) -> bool {
        !self.status.container_path.is_empty()
    }

    /// Recorded capacity in bytes, negative values clamped to zero
    pub fn capacity(&self) -> u64 {
        u64::try_from(self.status.total_capacity).unwrap_or(0)
    }

    /// Tenant label value, empty when the volume is not tagged
    pub fn tenant(&self) -> &str {
        self.labels
            .get(TENANT_LABEL)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Convert a dynamically typed API object into a volume
    pub fn from_dynamic(object: DynamicObject) -> Result<Self> {
        let name = object.metadata.name.ok_or_else(|| {
            ExporterError::VolumeList("volume object without metadata.name".to_string())
        })?;

        let status = match object.data.get("status") {
            Some(value) if !value.is_null() => serde_json::from_value(value.clone())?,
            _ => VolumeStatus::default(),
        };

        Ok(Self {
            name,
            uid: object.metadata.uid,
            labels: object.metadata.labels.unwrap_or_default(),
            status,
        })
    }
}
