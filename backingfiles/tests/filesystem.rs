//! Integration tests for ExFAT availability and the FAT32 fallback.

use backingfiles::{FilesystemKind, resolve_filesystem};
use backingfiles_test_utils::{FakeHost, HostCall};

const PACKAGE: &str = "exfatprogs";

#[test]
fn fat32_requested_checks_nothing() {
    let host = FakeHost::new().without_kernel_exfat().without_exfat_tools();
    assert_eq!(resolve_filesystem(false, &host, PACKAGE), FilesystemKind::Fat32);
    assert!(host.calls().is_empty());
}

#[test]
fn exfat_when_fully_supported() {
    let host = FakeHost::new();
    assert_eq!(resolve_filesystem(true, &host, PACKAGE), FilesystemKind::Exfat);
    assert!(host.calls().is_empty());
}

#[test]
fn no_kernel_support_downgrades_without_install() {
    let host = FakeHost::new().without_kernel_exfat().without_exfat_tools();
    assert_eq!(resolve_filesystem(true, &host, PACKAGE), FilesystemKind::Fat32);
    assert!(host.calls().is_empty());
}

#[test]
fn missing_tools_are_installed() {
    let host = FakeHost::new().without_exfat_tools();
    assert_eq!(resolve_filesystem(true, &host, PACKAGE), FilesystemKind::Exfat);
    assert_eq!(host.calls(), vec![HostCall::InstallPackage(PACKAGE.into())]);
}

#[test]
fn failed_install_downgrades() {
    let host = FakeHost::new().without_exfat_tools().failing_install();
    assert_eq!(resolve_filesystem(true, &host, PACKAGE), FilesystemKind::Fat32);
    assert_eq!(host.calls(), vec![HostCall::InstallPackage(PACKAGE.into())]);
}

#[test]
fn configured_package_name_is_used() {
    let host = FakeHost::new().without_exfat_tools();
    resolve_filesystem(true, &host, "exfat-utils");
    assert_eq!(host.calls(), vec![HostCall::InstallPackage("exfat-utils".into())]);
}
