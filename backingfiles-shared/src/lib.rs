//! Backingfiles Core - Shared code for the provisioning library and CLI
//!
//! This crate contains the error type, drive constants and path layouts
//! used by both the provisioning library (backingfiles) and its front end.

pub mod constants;
pub mod errors;
pub mod layout;

pub use errors::{BackingfilesError, BackingfilesResult};
pub use layout::{BackingLayout, Drive, MountLayout};
