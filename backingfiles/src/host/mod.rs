//! Host environment checks and side effects outside the backing files.
//!
//! [`HostSystem`] groups the operations that touch the wider system: ExFAT
//! availability, package installation, the background archiver and mounts.
//! All of them are best effort from the orchestrator's point of view.

mod mounts;
mod system;

use std::path::{Path, PathBuf};

use backingfiles_shared::errors::BackingfilesResult;

use crate::disk::FilesystemKind;

pub use mounts::parse_mount_targets;
pub use system::SystemHost;

/// Host capabilities used around provisioning.
pub trait HostSystem {
    /// Whether the running kernel can mount ExFAT.
    fn kernel_supports_exfat(&self) -> bool;

    /// Whether `mkfs.exfat` is installed.
    fn exfat_tools_installed(&self) -> bool;

    /// Install a system package.
    fn install_package(&self, package: &str) -> BackingfilesResult<()>;

    /// Ask every process named `name` to terminate; returns how many were signalled.
    fn stop_process(&self, name: &str) -> BackingfilesResult<usize>;

    /// Currently mounted targets.
    fn mounted_targets(&self) -> BackingfilesResult<Vec<PathBuf>>;

    /// Unmount `target`, releasing any loop device behind it.
    fn unmount(&self, target: &Path) -> BackingfilesResult<()>;
}

/// Decide the filesystem actually used for the drives.
///
/// ExFAT is downgraded to FAT32 when the kernel lacks support or when the
/// formatting tool is missing and cannot be installed. Downgrades are logged,
/// never errors.
pub fn resolve_filesystem(
    requested_exfat: bool,
    host: &dyn HostSystem,
    exfat_package: &str,
) -> FilesystemKind {
    if !requested_exfat {
        return FilesystemKind::Fat32;
    }

    if !host.kernel_supports_exfat() {
        tracing::warn!("kernel does not support ExFAT, using FAT32 instead");
        return FilesystemKind::Fat32;
    }

    if !host.exfat_tools_installed() {
        tracing::info!("Installing {} for ExFAT support", exfat_package);
        if let Err(e) = host.install_package(exfat_package) {
            tracing::warn!(
                "Failed to install {} ({}), using FAT32 instead",
                exfat_package,
                e
            );
            return FilesystemKind::Fat32;
        }
        if !host.exfat_tools_installed() {
            tracing::warn!(
                "mkfs.exfat still missing after installing {}, using FAT32 instead",
                exfat_package
            );
            return FilesystemKind::Fat32;
        }
    }

    tracing::info!("using ExFAT");
    FilesystemKind::Exfat
}
