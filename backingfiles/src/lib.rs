//! Backing file provisioning for USB mass-storage gadgets.
//!
//! Creates fixed-size disk image files (`cam`, `music`, `boombox`), writes a
//! single partition into each and formats it FAT32 or ExFAT. Sizes come from
//! absolute or percentage requests resolved against the free space of the
//! backing device.
//!
//! ```no_run
//! use backingfiles::{
//!     ExistingStatePolicy, ProvisionRequest, ProvisionSettings, Provisioner, SystemDiskTools,
//!     SystemHost,
//! };
//!
//! let disk = SystemDiskTools::new();
//! let host = SystemHost::new();
//! let request = ProvisionRequest {
//!     cam: "40%".parse()?,
//!     music: "4G".parse()?,
//!     boombox: "100M".parse()?,
//!     backingfiles_dir: "/backingfiles".into(),
//!     use_exfat: true,
//! };
//!
//! Provisioner::new(&disk, &host, ProvisionSettings::default())
//!     .with_existing_state_policy(ExistingStatePolicy::Keep)
//!     .run(&request)?;
//! # Ok::<(), backingfiles::BackingfilesError>(())
//! ```

pub mod cleanup;
pub mod confirm;
pub mod disk;
pub mod host;
pub mod options;
pub mod provision;
pub mod size;
pub mod util;

pub use backingfiles_shared::constants;
pub use backingfiles_shared::errors::{BackingfilesError, BackingfilesResult};
pub use backingfiles_shared::layout::{BackingLayout, Drive, MountLayout};

pub use cleanup::{CleanupReport, ExistingState};
pub use confirm::{Confirm, TerminalConfirm};
pub use disk::{
    DiskTools, DriveStatus, FilesystemKind, PartitionGeometry, SystemDiskTools, provision_drive,
};
pub use host::{HostSystem, SystemHost, resolve_filesystem};
pub use options::{ProvisionRequest, ProvisionSettings};
pub use provision::{
    DriveOutcome, ExistingStatePolicy, ProvisionOutcome, ProvisionReport, Provisioner,
};
pub use size::{SizeSpec, SizeUnit, resolve_size};
