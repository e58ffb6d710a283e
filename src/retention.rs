use crate::config::device;
use std::{
    path::Path,
    time::{Duration, SystemTime},
};

/// Successful runs older than this are deleted from the device's backup
/// folder.
pub const RETENTION_WINDOW: Duration = Duration::from_secs(90 * 24 * 60 * 60);

/// Deletes run folders of `device` whose modification time is strictly older
/// than `now` minus the retention window. A folder exactly at the cutoff is
/// retained. Errors are logged and swallowed; a pruning problem must not
/// downgrade an otherwise successful backup.
pub fn prune(backup_root: &Path, device: &device::Name, now: SystemTime) {
    let device_root = backup_root.join(&device.0);
    if !device_root.is_dir() {
        return;
    }
    if let Err(error) = prune_device_root(&device_root, now) {
        tracing::warn!(device = %device, %error, "retention pruning failed");
    }
}

fn prune_device_root(device_root: &Path, now: SystemTime) -> std::io::Result<()> {
    let cutoff = match now.checked_sub(RETENTION_WINDOW) {
        Some(cutoff) => cutoff,
        None => return Ok(()),
    };
    for entry in std::fs::read_dir(device_root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        if modified < cutoff {
            tracing::info!(path = %entry.path().display(), "deleting expired run folder");
            std::fs::remove_dir_all(entry.path())?;
        }
    }
    Ok(())
}
