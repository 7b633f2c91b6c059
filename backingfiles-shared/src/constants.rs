//! Shared constants between the provisioning library and the CLI
//!
//! Centralized location for fixed sizes, partition codes and default paths.

/// Space accounting, all values in kilobytes.
pub mod space {
    /// Reserved for filesystem bookkeeping on the backing device (10 MB).
    pub const SAFETY_MARGIN_KB: u64 = 10 * 1024;

    /// Below this much available space, later drives are not provisioned.
    pub const MIN_REMAINING_KB: u64 = 1024;

    /// Binary multiple used by size units.
    pub const UNIT_BASE: u64 = 1024;
}

/// MBR partition type codes written by `sfdisk`.
pub mod partition_types {
    /// W95 FAT32 (LBA)
    pub const FAT32: &str = "c";

    /// HPFS/NTFS/exFAT
    pub const EXFAT: &str = "7";
}

/// Default locations on the host.
pub mod paths {
    /// Parent of the per-drive mountpoint directories.
    pub const MOUNT_ROOT: &str = "/mnt";

    /// Archive snapshot directory, relative to the backing files directory.
    pub const SNAPSHOTS_DIR: &str = "snapshots";

    /// Settings file read when no path is given.
    pub const CONFIG_FILE: &str = "/etc/backingfiles/config.json";

    /// Kernel list of registered filesystems.
    pub const PROC_FILESYSTEMS: &str = "/proc/filesystems";

    /// Kernel mount table.
    pub const PROC_MOUNTS: &str = "/proc/mounts";
}

/// Host defaults that settings may override.
pub mod host {
    /// Background archiver stopped before drives are recreated.
    pub const ARCHIVE_PROCESS: &str = "archiveloop";

    /// Package providing `mkfs.exfat`.
    pub const EXFAT_PACKAGE: &str = "exfatprogs";
}

pub mod envs {
    pub const BACKINGFILES_CONFIG: &str = "BACKINGFILES_CONFIG";
}
