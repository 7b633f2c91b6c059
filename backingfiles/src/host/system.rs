//! [`HostSystem`] for a live Linux host.

use std::path::{Path, PathBuf};

use backingfiles_shared::constants::paths::{PROC_FILESYSTEMS, PROC_MOUNTS};
use backingfiles_shared::errors::{BackingfilesError, BackingfilesResult};
use sysinfo::{Signal, System};

use super::HostSystem;
use super::mounts::parse_mount_targets;
use crate::util::{find_binary, path_arg, run_binary, tool_succeeds};

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHost;

impl SystemHost {
    pub fn new() -> Self {
        Self
    }
}

/// Whether a `/proc/filesystems` listing includes exfat.
fn lists_exfat(filesystems: &str) -> bool {
    filesystems
        .lines()
        .filter_map(|line| line.split_whitespace().last())
        .any(|fs| fs == "exfat")
}

impl HostSystem for SystemHost {
    fn kernel_supports_exfat(&self) -> bool {
        // Registered already, or available as a loadable module
        let registered = std::fs::read_to_string(PROC_FILESYSTEMS)
            .map(|contents| lists_exfat(&contents))
            .unwrap_or(false);

        registered
            || find_binary("modprobe")
                .map(|modprobe| tool_succeeds(&modprobe, &["-n", "-q", "exfat"]))
                .unwrap_or(false)
    }

    fn exfat_tools_installed(&self) -> bool {
        find_binary("mkfs.exfat").is_ok()
    }

    fn install_package(&self, package: &str) -> BackingfilesResult<()> {
        run_binary("apt-get", &["install", "-y", package], None)?;
        Ok(())
    }

    fn stop_process(&self, name: &str) -> BackingfilesResult<usize> {
        let mut sys = System::new();
        sys.refresh_processes();

        let mut stopped = 0;
        for process in sys.processes_by_exact_name(name) {
            match process.kill_with(Signal::Term) {
                Some(true) => {
                    tracing::debug!(pid = process.pid().as_u32(), "Sent SIGTERM to {}", name);
                    stopped += 1;
                }
                _ => {
                    return Err(BackingfilesError::Internal(format!(
                        "Failed to signal {} (pid {})",
                        name,
                        process.pid()
                    )));
                }
            }
        }

        Ok(stopped)
    }

    fn mounted_targets(&self) -> BackingfilesResult<Vec<PathBuf>> {
        let table = std::fs::read_to_string(PROC_MOUNTS).map_err(|e| {
            BackingfilesError::Storage(format!("Failed to read {}: {}", PROC_MOUNTS, e))
        })?;
        Ok(parse_mount_targets(&table))
    }

    fn unmount(&self, target: &Path) -> BackingfilesResult<()> {
        run_binary("umount", &["-d", path_arg(target)?], None)?;
        Ok(())
    }
}
