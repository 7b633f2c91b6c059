//! Backing file creation.
//!
//! This module provides disk image provisioning:
//! - `DiskTools` - Capability interface over the host's disk utilities
//! - `SystemDiskTools` - `DiskTools` backed by sfdisk/losetup/mkfs
//! - `provision_drive` - Allocate, partition and format one backing file
//! - `parse_partition_listing` - Read partition geometry from sfdisk output

pub mod geometry;
mod provision;
mod system;
mod tools;

pub use geometry::parse_partition_listing;
pub use provision::{DriveStatus, provision_drive};
pub use system::SystemDiskTools;
pub use tools::{DiskTools, FilesystemKind, PartitionGeometry};
