#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

pub struct TestContext {
    pub cmd: Command,
    pub backingfiles_dir: PathBuf,
    pub mount_root: PathBuf,
    pub config: PathBuf,
    _temp_dir: TempDir,
}

impl TestContext {
    /// Another command sharing the same directories.
    pub fn new_cmd(&self) -> Command {
        command(&self.config, &self.mount_root)
    }

    pub fn write_config(&self, json: &str) {
        std::fs::write(&self.config, json).expect("Failed to write config");
    }
}

fn command(config: &Path, mount_root: &Path) -> Command {
    let bin_path = env!("CARGO_BIN_EXE_backingfiles");
    let mut cmd = Command::new(bin_path);
    // You can override this with .timeout(Duration::from_secs(N))
    cmd.timeout(Duration::from_secs(30));
    cmd.env_remove("BACKINGFILES_CONFIG");
    cmd.env_remove("RUST_LOG");
    cmd.arg("--config").arg(config);
    cmd.arg("--mount-root").arg(mount_root);
    cmd
}

/// Fresh backing files directory, mount root and (absent) config file.
pub fn backingfiles() -> TestContext {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let backingfiles_dir = temp_dir.path().join("backingfiles");
    let mount_root = temp_dir.path().join("mnt");
    let config = temp_dir.path().join("config.json");
    std::fs::create_dir_all(&backingfiles_dir).expect("Failed to create backingfiles dir");

    TestContext {
        cmd: command(&config, &mount_root),
        backingfiles_dir,
        mount_root,
        config,
        _temp_dir: temp_dir,
    }
}
