//! Test doubles for backingfiles.
//!
//! - `FakeDiskTools`: records every disk call and simulates free space
//! - `FakeHost`: scripted ExFAT support, package installs, processes and mounts
//! - `ScriptedConfirm`: fixed answer, counts prompts
//! - `TestBed`: temp backing files directory and mount root

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use backingfiles::{
    BackingfilesError, BackingfilesResult, Confirm, DiskTools, FilesystemKind, HostSystem,
    PartitionGeometry, ProvisionRequest, ProvisionSettings, SizeSpec,
};
use parking_lot::Mutex;
use tempfile::TempDir;

/// Content written to every file the fake allocates.
pub const FAKE_IMAGE_CONTENT: &[u8] = b"fake backing file";

// ============================================================================
// DISK
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiskCall {
    FreeKb(PathBuf),
    Allocate { path: PathBuf, size_kb: u64 },
    WritePartitionTable { path: PathBuf, kind: FilesystemKind },
    PartitionGeometry(PathBuf),
    AttachLoop { path: PathBuf, offset: u64 },
    MakeFilesystem { device: PathBuf, kind: FilesystemKind, label: String },
    DetachLoop(PathBuf),
}

struct FakeDiskState {
    free_kb: u64,
    calls: Vec<DiskCall>,
    next_loop: u32,
    fail_make_filesystem: bool,
}

/// In-memory [`DiskTools`]: allocation creates a small marker file and
/// subtracts the allocated size from the simulated free space.
pub struct FakeDiskTools {
    state: Mutex<FakeDiskState>,
    geometry: PartitionGeometry,
}

impl FakeDiskTools {
    pub fn new(free_kb: u64) -> Self {
        Self {
            state: Mutex::new(FakeDiskState {
                free_kb,
                calls: Vec::new(),
                next_loop: 0,
                fail_make_filesystem: false,
            }),
            geometry: PartitionGeometry {
                total_bytes: 2_095_104 * 512,
                total_sectors: 2_095_104,
                start_sector: 2048,
            },
        }
    }

    /// Make every `make_filesystem` call fail.
    pub fn failing_mkfs(self) -> Self {
        self.state.lock().fail_make_filesystem = true;
        self
    }

    pub fn free_kb_now(&self) -> u64 {
        self.state.lock().free_kb
    }

    pub fn calls(&self) -> Vec<DiskCall> {
        self.state.lock().calls.clone()
    }

    /// Sizes passed to `allocate`, in call order.
    pub fn allocations(&self) -> Vec<(PathBuf, u64)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                DiskCall::Allocate { path, size_kb } => Some((path, size_kb)),
                _ => None,
            })
            .collect()
    }

    /// Calls other than free space queries.
    pub fn mutating_calls(&self) -> Vec<DiskCall> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, DiskCall::FreeKb(_)))
            .collect()
    }

    fn record(&self, call: DiskCall) {
        self.state.lock().calls.push(call);
    }
}

impl DiskTools for FakeDiskTools {
    fn free_kb(&self, path: &Path) -> BackingfilesResult<u64> {
        let mut state = self.state.lock();
        state.calls.push(DiskCall::FreeKb(path.to_path_buf()));
        Ok(state.free_kb)
    }

    fn allocate(&self, path: &Path, size_kb: u64) -> BackingfilesResult<()> {
        std::fs::write(path, FAKE_IMAGE_CONTENT)?;
        let mut state = self.state.lock();
        state.free_kb = state.free_kb.saturating_sub(size_kb);
        state.calls.push(DiskCall::Allocate {
            path: path.to_path_buf(),
            size_kb,
        });
        Ok(())
    }

    fn write_partition_table(&self, path: &Path, kind: FilesystemKind) -> BackingfilesResult<()> {
        self.record(DiskCall::WritePartitionTable {
            path: path.to_path_buf(),
            kind,
        });
        Ok(())
    }

    fn partition_geometry(&self, path: &Path) -> BackingfilesResult<PartitionGeometry> {
        self.record(DiskCall::PartitionGeometry(path.to_path_buf()));
        Ok(self.geometry)
    }

    fn attach_loop(&self, path: &Path, offset: u64) -> BackingfilesResult<PathBuf> {
        let mut state = self.state.lock();
        let device = PathBuf::from(format!("/dev/loop{}", state.next_loop));
        state.next_loop += 1;
        state.calls.push(DiskCall::AttachLoop {
            path: path.to_path_buf(),
            offset,
        });
        Ok(device)
    }

    fn make_filesystem(
        &self,
        device: &Path,
        kind: FilesystemKind,
        label: &str,
    ) -> BackingfilesResult<()> {
        let fail = {
            let mut state = self.state.lock();
            state.calls.push(DiskCall::MakeFilesystem {
                device: device.to_path_buf(),
                kind,
                label: label.to_string(),
            });
            state.fail_make_filesystem
        };

        if fail {
            return Err(BackingfilesError::Tool(format!(
                "mkfs failed on {}",
                device.display()
            )));
        }
        Ok(())
    }

    fn detach_loop(&self, device: &Path) -> BackingfilesResult<()> {
        self.record(DiskCall::DetachLoop(device.to_path_buf()));
        Ok(())
    }
}

// ============================================================================
// HOST
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    InstallPackage(String),
    StopProcess(String),
    Unmount(PathBuf),
}

/// Scripted [`HostSystem`].
pub struct FakeHost {
    pub kernel_exfat: bool,
    pub install_succeeds: bool,
    pub stop_fails: bool,
    tools_installed: Mutex<bool>,
    mounted: Mutex<Vec<PathBuf>>,
    calls: Mutex<Vec<HostCall>>,
}

impl FakeHost {
    /// Host with full ExFAT support and nothing mounted.
    pub fn new() -> Self {
        Self {
            kernel_exfat: true,
            install_succeeds: true,
            stop_fails: false,
            tools_installed: Mutex::new(true),
            mounted: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn without_kernel_exfat(mut self) -> Self {
        self.kernel_exfat = false;
        self
    }

    pub fn without_exfat_tools(self) -> Self {
        *self.tools_installed.lock() = false;
        self
    }

    pub fn failing_install(mut self) -> Self {
        self.install_succeeds = false;
        self
    }

    pub fn failing_stop(mut self) -> Self {
        self.stop_fails = true;
        self
    }

    pub fn with_mounted(self, target: impl Into<PathBuf>) -> Self {
        self.mounted.lock().push(target.into());
        self
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().clone()
    }
}

impl Default for FakeHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostSystem for FakeHost {
    fn kernel_supports_exfat(&self) -> bool {
        self.kernel_exfat
    }

    fn exfat_tools_installed(&self) -> bool {
        *self.tools_installed.lock()
    }

    fn install_package(&self, package: &str) -> BackingfilesResult<()> {
        self.calls
            .lock()
            .push(HostCall::InstallPackage(package.to_string()));
        if !self.install_succeeds {
            return Err(BackingfilesError::Tool(format!(
                "apt-get failed to install {}",
                package
            )));
        }
        *self.tools_installed.lock() = true;
        Ok(())
    }

    fn stop_process(&self, name: &str) -> BackingfilesResult<usize> {
        self.calls
            .lock()
            .push(HostCall::StopProcess(name.to_string()));
        if self.stop_fails {
            return Err(BackingfilesError::Internal(format!("cannot signal {}", name)));
        }
        Ok(1)
    }

    fn mounted_targets(&self) -> BackingfilesResult<Vec<PathBuf>> {
        Ok(self.mounted.lock().clone())
    }

    fn unmount(&self, target: &Path) -> BackingfilesResult<()> {
        self.calls
            .lock()
            .push(HostCall::Unmount(target.to_path_buf()));
        self.mounted.lock().retain(|m| m != target);
        Ok(())
    }
}

// ============================================================================
// CONFIRMATION
// ============================================================================

/// [`Confirm`] with a fixed answer; clones share the prompt counter.
#[derive(Clone)]
pub struct ScriptedConfirm {
    answer: bool,
    prompts: Arc<AtomicUsize>,
}

impl ScriptedConfirm {
    pub fn yes() -> Self {
        Self::answering(true)
    }

    pub fn no() -> Self {
        Self::answering(false)
    }

    fn answering(answer: bool) -> Self {
        Self {
            answer,
            prompts: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&self, _prompt: &str) -> BackingfilesResult<bool> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer)
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

/// Temporary backing files directory and mount root, cleaned up on drop.
pub struct TestBed {
    pub backingfiles_dir: PathBuf,
    pub mount_root: PathBuf,
    _temp_dir: TempDir,
}

impl TestBed {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let backingfiles_dir = temp_dir.path().join("backingfiles");
        let mount_root = temp_dir.path().join("mnt");
        std::fs::create_dir_all(&backingfiles_dir).expect("Failed to create backingfiles dir");
        std::fs::create_dir_all(&mount_root).expect("Failed to create mount root");

        Self {
            backingfiles_dir,
            mount_root,
            _temp_dir: temp_dir,
        }
    }

    pub fn settings(&self) -> ProvisionSettings {
        ProvisionSettings {
            mount_root: self.mount_root.clone(),
            ..ProvisionSettings::default()
        }
    }

    /// Request for the given sizes; panics on unparsable sizes.
    pub fn request(&self, cam: &str, music: &str, boombox: &str, use_exfat: bool) -> ProvisionRequest {
        ProvisionRequest {
            cam: parse(cam),
            music: parse(music),
            boombox: parse(boombox),
            backingfiles_dir: self.backingfiles_dir.clone(),
            use_exfat,
        }
    }

    pub fn disk_path(&self, file_name: &str) -> PathBuf {
        self.backingfiles_dir.join(file_name)
    }
}

impl Default for TestBed {
    fn default() -> Self {
        Self::new()
    }
}

fn parse(size: &str) -> SizeSpec {
    size.parse()
        .unwrap_or_else(|e| panic!("invalid size {:?} in test: {}", size, e))
}
