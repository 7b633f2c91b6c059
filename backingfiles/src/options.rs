//! Configuration for provisioning runs.

use std::path::PathBuf;

use backingfiles_shared::constants::{host, paths};
use backingfiles_shared::layout::{BackingLayout, MountLayout};
use serde::Deserialize;

use crate::size::SizeSpec;

// ============================================================================
// Request
// ============================================================================

/// What to provision: one size request per drive, where, and which filesystem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProvisionRequest {
    pub cam: SizeSpec,
    pub music: SizeSpec,
    pub boombox: SizeSpec,

    /// Directory holding the backing files; its filesystem is measured for free space.
    pub backingfiles_dir: PathBuf,

    /// Prefer ExFAT over FAT32 (may be downgraded if unavailable).
    pub use_exfat: bool,
}

// ============================================================================
// Settings
// ============================================================================

/// Host-specific settings, usually loaded from a JSON file.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ProvisionSettings {
    /// Parent of the per-drive mountpoint directories.
    #[serde(default = "default_mount_root")]
    pub mount_root: PathBuf,

    /// Snapshot directory name inside the backing files directory.
    #[serde(default = "default_snapshots_dir")]
    pub snapshots_dir: String,

    /// Background archiver stopped before drives are recreated.
    #[serde(default = "default_archive_process")]
    pub archive_process: String,

    /// Package installed when `mkfs.exfat` is missing.
    #[serde(default = "default_exfat_package")]
    pub exfat_package: String,

    /// Mountpoints to release before recreating drives, besides the drives' own.
    #[serde(default)]
    pub extra_mountpoints: Vec<PathBuf>,
}

fn default_mount_root() -> PathBuf {
    PathBuf::from(paths::MOUNT_ROOT)
}

fn default_snapshots_dir() -> String {
    paths::SNAPSHOTS_DIR.to_string()
}

fn default_archive_process() -> String {
    host::ARCHIVE_PROCESS.to_string()
}

fn default_exfat_package() -> String {
    host::EXFAT_PACKAGE.to_string()
}

impl Default for ProvisionSettings {
    fn default() -> Self {
        Self {
            mount_root: default_mount_root(),
            snapshots_dir: default_snapshots_dir(),
            archive_process: default_archive_process(),
            exfat_package: default_exfat_package(),
            extra_mountpoints: Vec::new(),
        }
    }
}

impl ProvisionSettings {
    pub fn mount_layout(&self) -> MountLayout {
        MountLayout::new(&self.mount_root)
    }

    pub fn backing_layout(&self, backingfiles_dir: &std::path::Path) -> BackingLayout {
        BackingLayout::new(backingfiles_dir).with_snapshots_dir(&self.snapshots_dir)
    }
}
