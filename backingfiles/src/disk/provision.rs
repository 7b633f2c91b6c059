//! Single drive provisioning: allocate, partition, format.

use std::fmt;
use std::path::Path;

use backingfiles_shared::errors::{BackingfilesError, BackingfilesResult};
use backingfiles_shared::layout::{Drive, MountLayout};

use super::tools::{DiskTools, FilesystemKind};

/// What happened to a drive during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriveStatus {
    /// Backing file created and formatted.
    Provisioned { size_kb: u64 },
    /// Backing file was already present; nothing was touched.
    AlreadyExists,
    /// Drive not provisioned.
    Skipped { reason: String },
}

impl fmt::Display for DriveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriveStatus::Provisioned { size_kb } => write!(f, "provisioned {}K", size_kb),
            DriveStatus::AlreadyExists => f.write_str("already exists"),
            DriveStatus::Skipped { reason } => write!(f, "skipped ({})", reason),
        }
    }
}

/// Provision one backing file at `path`.
///
/// An existing file at `path` is taken as already provisioned, whatever its
/// content: a run that failed after allocation leaves a file that later runs
/// will skip.
///
/// On success the file holds one partition spanning the whole file, formatted
/// with `kind` and labelled with the drive's label, and the drive's mountpoint
/// directory exists (it is not mounted).
pub fn provision_drive(
    tools: &dyn DiskTools,
    drive: Drive,
    size_kb: u64,
    path: &Path,
    kind: FilesystemKind,
    mounts: &MountLayout,
) -> BackingfilesResult<DriveStatus> {
    if path.exists() {
        tracing::info!(
            drive = %drive,
            "{} already exists, skipping",
            path.display()
        );
        return Ok(DriveStatus::AlreadyExists);
    }

    tracing::info!(drive = %drive, "Allocating {}K for {}...", size_kb, path.display());
    tools.allocate(path, size_kb)?;
    tools.write_partition_table(path, kind)?;

    let offset = tools.partition_geometry(path)?.offset_bytes()?;
    tracing::debug!(drive = %drive, offset, "Located first partition");

    let device = tools.attach_loop(path, offset)?;
    tracing::info!(
        drive = %drive,
        "Creating {} filesystem with label '{}'",
        kind,
        drive.label()
    );

    let formatted = tools.make_filesystem(&device, kind, drive.label());
    let detached = tools.detach_loop(&device);
    formatted?;
    detached?;

    let mountpoint = mounts.mountpoint(drive);
    if !mountpoint.exists() {
        std::fs::create_dir_all(&mountpoint).map_err(|e| {
            BackingfilesError::Storage(format!(
                "Failed to create mountpoint {}: {}",
                mountpoint.display(),
                e
            ))
        })?;
    }

    Ok(DriveStatus::Provisioned { size_kb })
}
