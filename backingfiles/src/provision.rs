//! Provisioning run: cleanup, filesystem choice, then cam → music → boombox.
//!
//! Free space is re-measured before every drive, since each allocation
//! consumes it. Earlier drives always win: a later drive only gets what is
//! left, and nothing at all once less than [`MIN_REMAINING_KB`] remains.

use std::path::Path;

use backingfiles_shared::constants::space::MIN_REMAINING_KB;
use backingfiles_shared::errors::BackingfilesResult;
use backingfiles_shared::layout::{BackingLayout, Drive, MountLayout};

use crate::cleanup::{CleanupReport, ExistingState, detect_existing_state, remove_existing_state};
use crate::confirm::Confirm;
use crate::disk::{DiskTools, DriveStatus, FilesystemKind, provision_drive};
use crate::host::{HostSystem, resolve_filesystem};
use crate::options::{ProvisionRequest, ProvisionSettings};
use crate::size::{SizeSpec, available_kb, resolve_size};

/// How to treat backing files and snapshots left by a previous run.
pub enum ExistingStatePolicy {
    /// Ask before deleting; a "no" cancels the run without touching anything.
    Prompt(Box<dyn Confirm>),
    /// Delete without asking.
    Recreate,
    /// Warn and keep; existing backing files are then skipped.
    Keep,
}

impl std::fmt::Debug for ExistingStatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExistingStatePolicy::Prompt(_) => f.write_str("Prompt"),
            ExistingStatePolicy::Recreate => f.write_str("Recreate"),
            ExistingStatePolicy::Keep => f.write_str("Keep"),
        }
    }
}

/// Result of one drive in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveOutcome {
    pub drive: Drive,
    pub requested: SizeSpec,
    pub status: DriveStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    /// Filesystem used after ExFAT resolution.
    pub filesystem: FilesystemKind,
    /// One entry per drive, in provisioning order.
    pub drives: Vec<DriveOutcome>,
    /// Present when previous state was removed.
    pub cleanup: Option<CleanupReport>,
}

impl ProvisionReport {
    pub fn drive(&self, drive: Drive) -> Option<&DriveOutcome> {
        self.drives.iter().find(|o| o.drive == drive)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    Completed(ProvisionReport),
    /// Recreation was declined; nothing changed on disk.
    Cancelled,
}

enum ExistingStateAction {
    Cleaned(CleanupReport),
    Kept,
    Cancelled,
}

enum SizePlan {
    Size(u64),
    Skip(String),
}

/// Sequences a provisioning run over injected disk and host capabilities.
pub struct Provisioner<'a> {
    disk: &'a dyn DiskTools,
    host: &'a dyn HostSystem,
    settings: ProvisionSettings,
    policy: ExistingStatePolicy,
}

impl<'a> Provisioner<'a> {
    /// Create a provisioner that keeps existing state unless told otherwise.
    pub fn new(
        disk: &'a dyn DiskTools,
        host: &'a dyn HostSystem,
        settings: ProvisionSettings,
    ) -> Self {
        Self {
            disk,
            host,
            settings,
            policy: ExistingStatePolicy::Keep,
        }
    }

    pub fn with_existing_state_policy(mut self, policy: ExistingStatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn settings(&self) -> &ProvisionSettings {
        &self.settings
    }

    pub fn run(&self, request: &ProvisionRequest) -> BackingfilesResult<ProvisionOutcome> {
        let layout = self.settings.backing_layout(&request.backingfiles_dir);
        let mounts = self.settings.mount_layout();

        let existing = detect_existing_state(&layout);
        let cleanup = if existing.is_empty() {
            None
        } else {
            match self.handle_existing_state(&existing, &layout, &mounts)? {
                ExistingStateAction::Cleaned(report) => Some(report),
                ExistingStateAction::Kept => None,
                ExistingStateAction::Cancelled => {
                    tracing::info!("aborting");
                    return Ok(ProvisionOutcome::Cancelled);
                }
            }
        };

        let filesystem = resolve_filesystem(
            request.use_exfat,
            self.host,
            &self.settings.exfat_package,
        );

        let mut drives = Vec::with_capacity(Drive::ALL.len());
        for drive in Drive::ALL {
            let requested = requested_size(request, drive);
            let plan = self.plan_size(drive, &requested, request, layout.root())?;

            let status = match plan {
                SizePlan::Size(0) => skip(drive, "resolved size is 0".to_string()),
                SizePlan::Size(size_kb) => provision_drive(
                    self.disk,
                    drive,
                    size_kb,
                    &layout.disk_path(drive),
                    filesystem,
                    &mounts,
                )?,
                SizePlan::Skip(reason) => skip(drive, reason),
            };

            drives.push(DriveOutcome {
                drive,
                requested,
                status,
            });
        }

        tracing::info!("done");
        Ok(ProvisionOutcome::Completed(ProvisionReport {
            filesystem,
            drives,
            cleanup,
        }))
    }

    fn handle_existing_state(
        &self,
        existing: &ExistingState,
        layout: &BackingLayout,
        mounts: &MountLayout,
    ) -> BackingfilesResult<ExistingStateAction> {
        let names: Vec<&str> = existing.drives.iter().map(|d| d.name()).collect();
        tracing::warn!(
            drives = ?names,
            snapshots = existing.snapshots_dir.is_some(),
            "Found backing files or snapshots from a previous run"
        );

        let recreate = match &self.policy {
            ExistingStatePolicy::Keep => {
                tracing::warn!("Keeping existing drives; they will not be recreated");
                false
            }
            ExistingStatePolicy::Recreate => true,
            ExistingStatePolicy::Prompt(confirm) => {
                if !confirm.confirm("Delete snapshots and recreate recording and music drives?")? {
                    return Ok(ExistingStateAction::Cancelled);
                }
                true
            }
        };

        if !recreate {
            return Ok(ExistingStateAction::Kept);
        }

        let report = remove_existing_state(
            layout,
            mounts,
            self.host,
            &self.settings.archive_process,
            &self.settings.extra_mountpoints,
        )?;
        Ok(ExistingStateAction::Cleaned(report))
    }

    fn plan_size(
        &self,
        drive: Drive,
        requested: &SizeSpec,
        request: &ProvisionRequest,
        root: &Path,
    ) -> BackingfilesResult<SizePlan> {
        let free_kb = self.disk.free_kb(root)?;

        if drive == Drive::Cam {
            return Ok(SizePlan::Size(resolve_size(requested, free_kb)));
        }

        if drive == Drive::Music && request.cam.is_whole_device() {
            return Ok(SizePlan::Skip(
                "cam drive was given the whole device".to_string(),
            ));
        }

        let available = available_kb(free_kb);
        if available < MIN_REMAINING_KB {
            return Ok(SizePlan::Skip(format!(
                "only {}K available, need at least {}K",
                available, MIN_REMAINING_KB
            )));
        }

        Ok(SizePlan::Size(resolve_size(requested, free_kb)))
    }
}

fn requested_size(request: &ProvisionRequest, drive: Drive) -> SizeSpec {
    match drive {
        Drive::Cam => request.cam,
        Drive::Music => request.music,
        Drive::Boombox => request.boombox,
    }
}

fn skip(drive: Drive, reason: String) -> DriveStatus {
    tracing::info!(drive = %drive, "Not creating {} drive: {}", drive, reason);
    DriveStatus::Skipped { reason }
}
