//! Disk tool capability interface.
//!
//! The provisioner only talks to the disk through [`DiskTools`], so the
//! sequence can be driven against a recording fake in tests and against the
//! real `sfdisk`/`losetup`/`mkfs.*` tools in production.

use std::fmt;
use std::path::{Path, PathBuf};

use backingfiles_shared::constants::partition_types;
use backingfiles_shared::errors::{BackingfilesError, BackingfilesResult};

/// Filesystem installed in a backing file's partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilesystemKind {
    Fat32,
    Exfat,
}

impl FilesystemKind {
    pub fn from_exfat_flag(use_exfat: bool) -> Self {
        if use_exfat {
            FilesystemKind::Exfat
        } else {
            FilesystemKind::Fat32
        }
    }

    /// MBR partition type code announced to downstream tools.
    pub fn partition_type(&self) -> &'static str {
        match self {
            FilesystemKind::Fat32 => partition_types::FAT32,
            FilesystemKind::Exfat => partition_types::EXFAT,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilesystemKind::Fat32 => "fat32",
            FilesystemKind::Exfat => "exfat",
        }
    }
}

impl fmt::Display for FilesystemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geometry of the single partition in a backing file, as reported by `sfdisk`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionGeometry {
    /// Partition size in bytes.
    pub total_bytes: u64,
    /// Partition size in sectors.
    pub total_sectors: u64,
    /// First sector of the partition.
    pub start_sector: u64,
}

impl PartitionGeometry {
    /// Sector size derived from the reported byte and sector counts.
    pub fn sector_size(&self) -> BackingfilesResult<u64> {
        if self.total_sectors == 0 {
            return Err(BackingfilesError::Storage(
                "partition reports zero sectors".to_string(),
            ));
        }
        Ok(self.total_bytes / self.total_sectors)
    }

    /// Byte offset of the partition inside the backing file.
    pub fn offset_bytes(&self) -> BackingfilesResult<u64> {
        let sector_size = self.sector_size()?;
        self.start_sector.checked_mul(sector_size).ok_or_else(|| {
            BackingfilesError::Storage(format!(
                "partition offset overflows: start sector {} x {} bytes",
                self.start_sector, sector_size
            ))
        })
    }
}

/// Operations the provisioner needs from the host's disk tooling.
///
/// Each call blocks until the underlying operation finishes.
pub trait DiskTools {
    /// Free kilobytes on the filesystem holding `path`.
    fn free_kb(&self, path: &Path) -> BackingfilesResult<u64>;

    /// Create `path` with exactly `size_kb` kilobytes allocated.
    fn allocate(&self, path: &Path, size_kb: u64) -> BackingfilesResult<()>;

    /// Write a partition table with one partition spanning the whole file.
    fn write_partition_table(&self, path: &Path, kind: FilesystemKind) -> BackingfilesResult<()>;

    /// Read back the geometry of the file's single partition.
    fn partition_geometry(&self, path: &Path) -> BackingfilesResult<PartitionGeometry>;

    /// Attach a loop device at `offset` bytes into `path`; returns the device path.
    fn attach_loop(&self, path: &Path, offset: u64) -> BackingfilesResult<PathBuf>;

    /// Create a filesystem labelled `label` on `device`.
    fn make_filesystem(
        &self,
        device: &Path,
        kind: FilesystemKind,
        label: &str,
    ) -> BackingfilesResult<()>;

    /// Detach a loop device obtained from [`DiskTools::attach_loop`].
    fn detach_loop(&self, device: &Path) -> BackingfilesResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_type_codes() {
        assert_eq!(FilesystemKind::Fat32.partition_type(), "c");
        assert_eq!(FilesystemKind::Exfat.partition_type(), "7");
    }

    #[test]
    fn test_from_exfat_flag() {
        assert_eq!(FilesystemKind::from_exfat_flag(true), FilesystemKind::Exfat);
        assert_eq!(FilesystemKind::from_exfat_flag(false), FilesystemKind::Fat32);
    }

    #[test]
    fn test_offset_from_geometry() {
        let geometry = PartitionGeometry {
            total_bytes: 1_047_552 * 512,
            total_sectors: 1_047_552,
            start_sector: 2048,
        };
        assert_eq!(geometry.sector_size().unwrap(), 512);
        assert_eq!(geometry.offset_bytes().unwrap(), 1_048_576);
    }

    #[test]
    fn test_offset_with_4k_sectors() {
        let geometry = PartitionGeometry {
            total_bytes: 4096 * 1000,
            total_sectors: 1000,
            start_sector: 256,
        };
        assert_eq!(geometry.offset_bytes().unwrap(), 256 * 4096);
    }

    #[test]
    fn test_zero_sectors_is_an_error() {
        let geometry = PartitionGeometry {
            total_bytes: 0,
            total_sectors: 0,
            start_sector: 2048,
        };
        assert!(geometry.offset_bytes().is_err());
    }
}
