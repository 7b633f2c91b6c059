//! Detection and removal of state left by a previous run.
//!
//! Removal order: stop the archiver, release mounts, then delete the backing
//! files and the snapshot tree. The first two steps are best effort; failing
//! to delete is an error because provisioning would otherwise skip the stale
//! files.

use std::path::PathBuf;

use backingfiles_shared::errors::{BackingfilesError, BackingfilesResult};
use backingfiles_shared::layout::{BackingLayout, Drive, MountLayout};

use crate::host::HostSystem;

/// Previous-run artifacts found in the backing files directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistingState {
    /// Drives whose backing file exists.
    pub drives: Vec<Drive>,
    /// Snapshot directory, if it exists.
    pub snapshots_dir: Option<PathBuf>,
}

impl ExistingState {
    pub fn is_empty(&self) -> bool {
        self.drives.is_empty() && self.snapshots_dir.is_none()
    }
}

/// What a cleanup pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub processes_stopped: usize,
    pub unmounted: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
}

pub fn detect_existing_state(layout: &BackingLayout) -> ExistingState {
    let drives = Drive::ALL
        .into_iter()
        .filter(|d| layout.disk_path(*d).exists())
        .collect();
    let snapshots_dir = Some(layout.snapshots_dir()).filter(|p| p.exists());

    ExistingState {
        drives,
        snapshots_dir,
    }
}

/// Remove previous backing files and snapshots.
///
/// # Arguments
/// * `archive_process` - Process stopped before anything is unmounted
/// * `extra_mountpoints` - Released together with the drives' mountpoints
pub fn remove_existing_state(
    layout: &BackingLayout,
    mounts: &MountLayout,
    host: &dyn HostSystem,
    archive_process: &str,
    extra_mountpoints: &[PathBuf],
) -> BackingfilesResult<CleanupReport> {
    let mut report = CleanupReport::default();

    match host.stop_process(archive_process) {
        Ok(count) => report.processes_stopped = count,
        Err(e) => tracing::warn!("Failed to stop {}: {}", archive_process, e),
    }

    let known: Vec<PathBuf> = mounts
        .all()
        .into_iter()
        .chain(extra_mountpoints.iter().cloned())
        .collect();

    match host.mounted_targets() {
        Ok(mounted) => {
            for target in known.iter().filter(|t| mounted.contains(t)) {
                match host.unmount(target) {
                    Ok(()) => report.unmounted.push(target.clone()),
                    Err(e) => tracing::warn!("Failed to unmount {}: {}", target.display(), e),
                }
            }
        }
        Err(e) => tracing::warn!("Failed to list mounts, not unmounting: {}", e),
    }

    for drive in Drive::ALL {
        let path = layout.disk_path(drive);
        if path.exists() {
            std::fs::remove_file(&path).map_err(|e| {
                BackingfilesError::Storage(format!("Failed to remove {}: {}", path.display(), e))
            })?;
            tracing::info!("Deleted {}", path.display());
            report.removed.push(path);
        }
    }

    let snapshots = layout.snapshots_dir();
    if snapshots.exists() {
        std::fs::remove_dir_all(&snapshots).map_err(|e| {
            BackingfilesError::Storage(format!(
                "Failed to remove {}: {}",
                snapshots.display(),
                e
            ))
        })?;
        tracing::info!("Deleted {}", snapshots.display());
        report.removed.push(snapshots);
    }

    Ok(report)
}
