//! XFS Project Quota Prober
//!
//! Every DirectPV volume is an XFS project whose id is derived from the
//! volume name. Usage is read with `quotactl(2)` using the XFS specific
//! `Q_XGETQUOTA` command against the block device backing the filesystem.
//!
//! # Units
//!
//! The kernel reports limits and counts in 512 byte basic blocks; [`Quota`]
//! values are converted to bytes.
//!
//! # Blocking
//!
//! `quotactl` is a blocking syscall, so it runs on the Tokio blocking pool.
//! The caller's cancellation token is honoured while waiting for the result.

use crate::error::{ExporterError, Result};
use crate::probe::Quota;
use tokio_util::sync::CancellationToken;

const BASIC_BLOCK_SIZE: u64 = 512;

const PRJQUOTA: i32 = 2;
const SUBCMDSHIFT: i32 = 8;
const SUBCMDMASK: i32 = 0x00ff;

/// `XQM_CMD(3)`
pub const Q_XGETQUOTA: i32 = (('X' as i32) << 8) + 3;

const FNV32_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV32_PRIME: u32 = 0x0100_0193;

/// Encode a quota sub-command for a quota type, as `QCMD()` does
pub const fn qcmd(cmd: i32, quota_type: i32) -> i32 {
    (cmd << SUBCMDSHIFT) | (quota_type & SUBCMDMASK)
}

/// XFS project id of a volume: the 32-bit FNV-1a hash of its name
pub fn project_id(volume_id: &str) -> u32 {
    volume_id.bytes().fold(FNV32_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(FNV32_PRIME)
    })
}

/// `struct fs_disk_quota` from `<linux/dqblk_xfs.h>`
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
#[allow(dead_code)] // Mirrors the kernel layout; only block counts are read
struct FsDiskQuota {
    version: i8,
    flags: i8,
    field_mask: u16,
    id: u32,
    blk_hard_limit: u64,
    blk_soft_limit: u64,
    ino_hard_limit: u64,
    ino_soft_limit: u64,
    bcount: u64,
    icount: u64,
    itimer: i32,
    btimer: i32,
    iwarns: u16,
    bwarns: u16,
    itimer_hi: i8,
    btimer_hi: i8,
    rtbtimer_hi: i8,
    padding2: i8,
    rtb_hard_limit: u64,
    rtb_soft_limit: u64,
    rtbcount: u64,
    rtbtimer: i32,
    rtbwarns: u16,
    padding3: i16,
    padding4: [i8; 8],
}

impl From<FsDiskQuota> for Quota {
    fn from(quota: FsDiskQuota) -> Self {
        Self {
            hard_limit: quota.blk_hard_limit.saturating_mul(BASIC_BLOCK_SIZE),
            soft_limit: quota.blk_soft_limit.saturating_mul(BASIC_BLOCK_SIZE),
            current_space: quota.bcount.saturating_mul(BASIC_BLOCK_SIZE),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct XfsQuotaProber;

impl XfsQuotaProber {
    pub fn new() -> Self {
        Self
    }

    /// Read the project quota of `volume_id` on `device`
    pub async fn get_quota(
        &self,
        device: &str,
        volume_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Quota> {
        if cancel.is_cancelled() {
            return Err(ExporterError::Cancelled);
        }

        let device = device.to_string();
        let id = project_id(volume_id);
        let task = tokio::task::spawn_blocking(move || get_project_quota(&device, id));

        tokio::select! {
            _ = cancel.cancelled() => Err(ExporterError::Cancelled),
            joined = task => joined.map_err(|e| ExporterError::Quota(format!("quota probe task failed: {}", e)))?,
        }
    }
}

#[cfg(target_os = "linux")]
fn get_project_quota(device: &str, project_id: u32) -> Result<Quota> {
    use std::ffi::CString;
    use std::mem::MaybeUninit;

    let c_device = CString::new(device)
        .map_err(|_| ExporterError::Quota(format!("invalid device path {:?}", device)))?;
    let mut quota = MaybeUninit::<FsDiskQuota>::zeroed();

    let result = unsafe {
        libc::quotactl(
            qcmd(Q_XGETQUOTA, PRJQUOTA),
            c_device.as_ptr(),
            project_id as libc::c_int,
            quota.as_mut_ptr() as *mut libc::c_char,
        )
    };

    if result != 0 {
        let err = std::io::Error::last_os_error();
        return Err(ExporterError::Quota(format!(
            "quotactl on {} for project {} failed: {}",
            device, project_id, err
        )));
    }

    let quota = unsafe { quota.assume_init() };
    Ok(Quota::from(quota))
}

#[cfg(not(target_os = "linux"))]
fn get_project_quota(_device: &str, _project_id: u32) -> Result<Quota> {
    Err(ExporterError::Unsupported(
        "XFS project quotas are only available on Linux".to_string(),
    ))
}
