//! CLI definition and argument parsing for backingfiles-cli.

use std::io::IsTerminal;
use std::path::PathBuf;

use backingfiles::constants::{envs, paths};
use backingfiles::{ExistingStatePolicy, ProvisionSettings, TerminalConfirm};
use clap::{Args, Parser};

use crate::commands::provision::ProvisionArgs;

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "backingfiles",
    author,
    version,
    about = "Create the cam, music and boombox backing files"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalFlags,

    #[command(flatten)]
    pub args: ProvisionArgs,
}

// ============================================================================
// GLOBAL FLAGS
// ============================================================================

#[derive(Args, Debug, Clone)]
pub struct GlobalFlags {
    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Delete existing backing files and snapshots without asking
    #[arg(short, long)]
    pub yes: bool,

    /// Settings file
    #[arg(long, env = envs::BACKINGFILES_CONFIG, default_value = paths::CONFIG_FILE)]
    pub config: PathBuf,

    /// Parent directory of the drive mountpoints (overrides the settings file)
    #[arg(long, value_name = "DIR")]
    pub mount_root: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl GlobalFlags {
    /// Settings from the config file with command line overrides applied.
    pub fn settings(&self) -> ProvisionSettings {
        let mut settings = crate::config::load_config(&self.config);
        if let Some(mount_root) = &self.mount_root {
            settings.mount_root = mount_root.clone();
        }
        settings
    }

    /// `--yes` recreates; an interactive stdin is asked; anything else keeps.
    pub fn existing_state_policy(&self) -> ExistingStatePolicy {
        if self.yes {
            ExistingStatePolicy::Recreate
        } else if std::io::stdin().is_terminal() {
            ExistingStatePolicy::Prompt(Box::new(TerminalConfirm))
        } else {
            ExistingStatePolicy::Keep
        }
    }
}
