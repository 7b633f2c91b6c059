//! Integration tests for single drive provisioning.

use backingfiles::{
    Drive, DriveStatus, FilesystemKind, MountLayout, provision_drive,
};
use backingfiles_test_utils::{DiskCall, FakeDiskTools, TestBed};

#[test]
fn tool_sequence_for_fat32_drive() {
    let bed = TestBed::new();
    let disk = FakeDiskTools::new(1_000_000);
    let path = bed.disk_path("cam_disk.bin");
    let mounts = MountLayout::new(&bed.mount_root);

    let status = provision_drive(&disk, Drive::Cam, 4096, &path, FilesystemKind::Fat32, &mounts)
        .unwrap();

    assert_eq!(status, DriveStatus::Provisioned { size_kb: 4096 });
    assert_eq!(
        disk.calls(),
        vec![
            DiskCall::Allocate {
                path: path.clone(),
                size_kb: 4096
            },
            DiskCall::WritePartitionTable {
                path: path.clone(),
                kind: FilesystemKind::Fat32
            },
            DiskCall::PartitionGeometry(path.clone()),
            DiskCall::AttachLoop {
                path: path.clone(),
                offset: 2048 * 512
            },
            DiskCall::MakeFilesystem {
                device: "/dev/loop0".into(),
                kind: FilesystemKind::Fat32,
                label: "CAM".into()
            },
            DiskCall::DetachLoop("/dev/loop0".into()),
        ]
    );
    assert!(bed.mount_root.join("cam").is_dir());
}

#[test]
fn exfat_drive_uses_exfat_partition_type() {
    let bed = TestBed::new();
    let disk = FakeDiskTools::new(1_000_000);
    let path = bed.disk_path("boombox_disk.bin");
    let mounts = MountLayout::new(&bed.mount_root);

    provision_drive(&disk, Drive::Boombox, 2048, &path, FilesystemKind::Exfat, &mounts).unwrap();

    let calls = disk.calls();
    assert!(calls.contains(&DiskCall::WritePartitionTable {
        path: path.clone(),
        kind: FilesystemKind::Exfat
    }));
    assert!(calls.iter().any(|c| matches!(
        c,
        DiskCall::MakeFilesystem { kind: FilesystemKind::Exfat, label, .. } if label == "BOOMBOX"
    )));
    assert_eq!(FilesystemKind::Exfat.partition_type(), "7");
    assert_eq!(FilesystemKind::Fat32.partition_type(), "c");
}

#[test]
fn existing_file_is_not_touched() {
    let bed = TestBed::new();
    let disk = FakeDiskTools::new(1_000_000);
    let path = bed.disk_path("music_disk.bin");
    std::fs::write(&path, b"keep me").unwrap();

    let status = provision_drive(
        &disk,
        Drive::Music,
        4096,
        &path,
        FilesystemKind::Fat32,
        &MountLayout::new(&bed.mount_root),
    )
    .unwrap();

    assert_eq!(status, DriveStatus::AlreadyExists);
    assert!(disk.calls().is_empty());
    assert_eq!(std::fs::read(&path).unwrap(), b"keep me");
}

#[test]
fn format_failure_detaches_and_leaves_file() {
    let bed = TestBed::new();
    let disk = FakeDiskTools::new(1_000_000).failing_mkfs();
    let path = bed.disk_path("cam_disk.bin");

    let result = provision_drive(
        &disk,
        Drive::Cam,
        4096,
        &path,
        FilesystemKind::Fat32,
        &MountLayout::new(&bed.mount_root),
    );

    assert!(result.is_err());
    assert_eq!(
        disk.calls().last(),
        Some(&DiskCall::DetachLoop("/dev/loop0".into()))
    );
    assert!(path.exists());
    assert!(!bed.mount_root.join("cam").exists());
}

#[test]
fn existing_mountpoint_is_reused() {
    let bed = TestBed::new();
    let disk = FakeDiskTools::new(1_000_000);
    std::fs::create_dir_all(bed.mount_root.join("music")).unwrap();
    std::fs::write(bed.mount_root.join("music/.keep"), b"").unwrap();

    provision_drive(
        &disk,
        Drive::Music,
        4096,
        &bed.disk_path("music_disk.bin"),
        FilesystemKind::Fat32,
        &MountLayout::new(&bed.mount_root),
    )
    .unwrap();

    assert!(bed.mount_root.join("music/.keep").exists());
}
