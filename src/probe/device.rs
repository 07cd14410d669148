//! Filesystem UUID to block device resolution
//!
//! udev maintains `/dev/disk/by-uuid/<fsuuid>` symlinks for every formatted
//! block device. A missing link means the device was removed or the udev
//! rules have not been reloaded since the filesystem was created.

use crate::error::{ExporterError, Result};
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct UdevDeviceResolver {
    by_uuid_dir: PathBuf,
}

impl UdevDeviceResolver {
    pub fn new(by_uuid_dir: impl Into<PathBuf>) -> Self {
        Self {
            by_uuid_dir: by_uuid_dir.into(),
        }
    }

    /// Resolve `fs_uuid` to the canonical device path, e.g. `/dev/sdb`
    pub fn resolve(&self, fs_uuid: &str) -> Result<String> {
        if fs_uuid.is_empty() || fs_uuid.contains('/') {
            return Err(ExporterError::DeviceNotFound(fs_uuid.to_string()));
        }

        let link = self.by_uuid_dir.join(fs_uuid);
        let device = std::fs::canonicalize(&link).map_err(|e| {
            debug!(link = %link.display(), error = %e, "Device link lookup failed");
            ExporterError::DeviceNotFound(fs_uuid.to_string())
        })?;

        Ok(device.to_string_lossy().into_owned())
    }
}

impl Default for UdevDeviceResolver {
    fn default() -> Self {
        Self::new("/dev/disk/by-uuid")
    }
}
