use std::path::PathBuf;

use backingfiles::{
    BackingfilesError, ProvisionOutcome, ProvisionRequest, Provisioner, SizeSpec,
    SystemDiskTools, SystemHost,
};
use clap::{ArgAction, Args};

#[derive(Args, Debug)]
pub struct ProvisionArgs {
    /// Recording drive size: <N>K, <N>M, <N>G (optional trailing B), <N>% or 0
    #[arg(value_name = "CAM_SIZE", value_parser = parse_size)]
    pub cam_size: SizeSpec,

    /// Music drive size
    #[arg(value_name = "MUSIC_SIZE", value_parser = parse_size)]
    pub music_size: SizeSpec,

    /// Boombox drive size
    #[arg(value_name = "BOOMBOX_SIZE", value_parser = parse_size)]
    pub boombox_size: SizeSpec,

    /// Directory that holds the backing files
    #[arg(value_name = "BACKINGFILES_MOUNTPOINT")]
    pub backingfiles_dir: PathBuf,

    /// Format drives as ExFAT instead of FAT32 (true/false)
    #[arg(value_name = "USE_EXFAT", action = ArgAction::Set, value_parser = clap::value_parser!(bool))]
    pub use_exfat: bool,
}

fn parse_size(value: &str) -> Result<SizeSpec, String> {
    value
        .parse()
        .map_err(|e: BackingfilesError| e.to_string())
}

pub fn execute(args: ProvisionArgs, global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    let request = ProvisionRequest {
        cam: args.cam_size,
        music: args.music_size,
        boombox: args.boombox_size,
        backingfiles_dir: args.backingfiles_dir,
        use_exfat: args.use_exfat,
    };

    let disk = SystemDiskTools::new();
    let host = SystemHost::new();
    let outcome = Provisioner::new(&disk, &host, global.settings())
        .with_existing_state_policy(global.existing_state_policy())
        .run(&request)?;

    let report = match outcome {
        ProvisionOutcome::Completed(report) => report,
        ProvisionOutcome::Cancelled => {
            println!("cancelled, nothing changed");
            return Ok(());
        }
    };

    for outcome in &report.drives {
        println!("{}: {}", outcome.drive, outcome.status);
    }
    Ok(())
}
