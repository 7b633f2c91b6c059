//! Filesystem layout definitions for backing files and mountpoints.
//!
//! This module provides the fixed drive set and the layout structs built on it:
//! - `Drive`: the three provisioned volumes, in provisioning order
//! - `BackingLayout`: disk image files inside the backing files directory
//! - `MountLayout`: per-drive mountpoint directories
//!
//! Lives in backingfiles-shared so both the library and the CLI use these definitions.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::constants::paths;

// ============================================================================
// DRIVES
// ============================================================================

/// A provisioned volume.
///
/// Ordering follows provisioning priority: cam first, boombox last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Drive {
    Cam,
    Music,
    Boombox,
}

impl Drive {
    /// All drives in provisioning order.
    pub const ALL: [Drive; 3] = [Drive::Cam, Drive::Music, Drive::Boombox];

    /// Logical name, also the mountpoint directory name.
    pub fn name(&self) -> &'static str {
        match self {
            Drive::Cam => "cam",
            Drive::Music => "music",
            Drive::Boombox => "boombox",
        }
    }

    /// Filesystem volume label.
    pub fn label(&self) -> &'static str {
        match self {
            Drive::Cam => "CAM",
            Drive::Music => "MUSIC",
            Drive::Boombox => "BOOMBOX",
        }
    }

    /// Disk image file name: `<name>_disk.bin`
    pub fn file_name(&self) -> String {
        format!("{}_disk.bin", self.name())
    }
}

impl fmt::Display for Drive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// BACKING LAYOUT (disk images)
// ============================================================================

/// Layout of the backing files directory.
///
/// ```text
/// {root}/
/// ├── cam_disk.bin
/// ├── music_disk.bin
/// ├── boombox_disk.bin
/// └── snapshots/         # archive snapshots of the cam drive
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackingLayout {
    root: PathBuf,
    snapshots_dir_name: String,
}

impl BackingLayout {
    /// Create a layout rooted at `root`, stripping any trailing slash.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: strip_trailing_slash(root.as_ref()),
            snapshots_dir_name: paths::SNAPSHOTS_DIR.to_string(),
        }
    }

    /// Override the snapshot directory name.
    pub fn with_snapshots_dir(mut self, name: impl Into<String>) -> Self {
        self.snapshots_dir_name = name.into();
        self
    }

    /// Backing files directory (the measured mountpoint).
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Disk image path: {root}/{name}_disk.bin
    pub fn disk_path(&self, drive: Drive) -> PathBuf {
        self.root.join(drive.file_name())
    }

    /// Snapshot directory: {root}/snapshots
    pub fn snapshots_dir(&self) -> PathBuf {
        self.root.join(&self.snapshots_dir_name)
    }
}

// ============================================================================
// MOUNT LAYOUT (mountpoint directories)
// ============================================================================

/// Per-drive mountpoint directories: `{root}/cam`, `{root}/music`, `{root}/boombox`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MountLayout {
    root: PathBuf,
}

impl MountLayout {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: strip_trailing_slash(root.as_ref()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn mountpoint(&self, drive: Drive) -> PathBuf {
        self.root.join(drive.name())
    }

    /// Mountpoints of all drives, in provisioning order.
    pub fn all(&self) -> Vec<PathBuf> {
        Drive::ALL.iter().map(|d| self.mountpoint(*d)).collect()
    }
}

impl Default for MountLayout {
    fn default() -> Self {
        Self::new(paths::MOUNT_ROOT)
    }
}

/// Strip trailing slashes, keeping `/` itself intact.
fn strip_trailing_slash(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    let trimmed = raw.trim_end_matches('/');
    if trimmed.is_empty() && raw.starts_with('/') {
        PathBuf::from("/")
    } else if trimmed.len() == raw.len() {
        path.to_path_buf()
    } else {
        PathBuf::from(trimmed)
    }
}
