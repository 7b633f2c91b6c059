//! [`DiskTools`] backed by the host's disk utilities.
//!
//! - free space: `statvfs(2)` (same figure as `df --output=avail`)
//! - allocation: `fallocate(2)`, so blocks are reserved up front
//! - partitioning: `sfdisk`
//! - loop devices: `losetup`
//! - filesystems: `mkfs.vfat -F 32` / `mkfs.exfat`

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use backingfiles_shared::errors::{BackingfilesError, BackingfilesResult};
use nix::fcntl::{FallocateFlags, fallocate};
use nix::libc::off_t;
use nix::sys::statvfs::statvfs;

use super::geometry::{LISTING_COLUMNS, parse_partition_listing};
use super::tools::{DiskTools, FilesystemKind, PartitionGeometry};
use crate::util::{path_arg, run_binary};

/// Real disk tooling. Requires root for loop devices.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemDiskTools;

impl SystemDiskTools {
    pub fn new() -> Self {
        Self
    }
}

impl DiskTools for SystemDiskTools {
    fn free_kb(&self, path: &Path) -> BackingfilesResult<u64> {
        let stat = statvfs(path).map_err(|e| {
            BackingfilesError::Storage(format!(
                "Failed to query free space of {}: {}",
                path.display(),
                e
            ))
        })?;

        #[allow(clippy::unnecessary_cast)]
        let free_bytes = (stat.blocks_available() as u64).saturating_mul(stat.fragment_size() as u64);
        Ok(free_bytes / 1024)
    }

    fn allocate(&self, path: &Path, size_kb: u64) -> BackingfilesResult<()> {
        let len = size_kb
            .checked_mul(1024)
            .and_then(|bytes| off_t::try_from(bytes).ok())
            .ok_or_else(|| {
                BackingfilesError::InvalidArgument(format!("Allocation too large: {}K", size_kb))
            })?;

        let file = OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(path)
            .map_err(|e| {
                BackingfilesError::Storage(format!(
                    "Failed to create backing file {}: {}",
                    path.display(),
                    e
                ))
            })?;

        fallocate(&file, FallocateFlags::empty(), 0, len).map_err(|e| {
            BackingfilesError::Storage(format!(
                "Failed to allocate {}K for {}: {}",
                size_kb,
                path.display(),
                e
            ))
        })?;

        Ok(())
    }

    fn write_partition_table(&self, path: &Path, kind: FilesystemKind) -> BackingfilesResult<()> {
        let script = format!("type={}\n", kind.partition_type());
        run_binary("sfdisk", &["--quiet", path_arg(path)?], Some(&script))?;
        Ok(())
    }

    fn partition_geometry(&self, path: &Path) -> BackingfilesResult<PartitionGeometry> {
        let listing = run_binary(
            "sfdisk",
            &["-l", "-q", "--bytes", "-o", LISTING_COLUMNS, path_arg(path)?],
            None,
        )?;
        parse_partition_listing(&listing)
    }

    fn attach_loop(&self, path: &Path, offset: u64) -> BackingfilesResult<PathBuf> {
        let offset = offset.to_string();
        let device = run_binary(
            "losetup",
            &["-o", offset.as_str(), "-f", "--show", path_arg(path)?],
            None,
        )?;

        let device = device.trim();
        if device.is_empty() {
            return Err(BackingfilesError::Tool(format!(
                "losetup returned no device for {}",
                path.display()
            )));
        }
        Ok(PathBuf::from(device))
    }

    fn make_filesystem(
        &self,
        device: &Path,
        kind: FilesystemKind,
        label: &str,
    ) -> BackingfilesResult<()> {
        let device = path_arg(device)?;
        match kind {
            FilesystemKind::Fat32 => {
                run_binary("mkfs.vfat", &[device, "-F", "32", "-n", label], None)?;
            }
            FilesystemKind::Exfat => {
                run_binary("mkfs.exfat", &[device, "-L", label], None)?;
            }
        }
        Ok(())
    }

    fn detach_loop(&self, device: &Path) -> BackingfilesResult<()> {
        run_binary("losetup", &["-d", path_arg(device)?], None)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_free_kb_of_temp_dir() {
        let temp_dir = TempDir::new().unwrap();
        let tools = SystemDiskTools::new();
        assert!(tools.free_kb(temp_dir.path()).is_ok());
    }

    #[test]
    fn test_free_kb_of_missing_path_fails() {
        let tools = SystemDiskTools::new();
        let err = tools
            .free_kb(Path::new("/nonexistent/backingfiles"))
            .unwrap_err();
        assert!(matches!(err, BackingfilesError::Storage(_)));
    }

    #[test]
    fn test_allocate_reserves_requested_length() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("boombox_disk.bin");

        let tools = SystemDiskTools::new();
        tools.allocate(&path, 16).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 16 * 1024);
    }

    #[test]
    fn test_allocate_refuses_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cam_disk.bin");
        std::fs::write(&path, b"existing").unwrap();

        let tools = SystemDiskTools::new();
        assert!(tools.allocate(&path, 4).is_err());
        assert_eq!(std::fs::read(&path).unwrap(), b"existing");
    }

    #[test]
    fn test_allocate_rejects_overflowing_size() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("music_disk.bin");

        let tools = SystemDiskTools::new();
        let err = tools.allocate(&path, u64::MAX).unwrap_err();
        assert!(matches!(err, BackingfilesError::InvalidArgument(_)));
        assert!(!path.exists());
    }
}
