mod cli;
mod commands;
mod config;

use std::process;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // Initialize tracing based on --debug flag
    let level = if cli.global.debug { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(level));

    let guard = match backingfiles::util::init_tracing(env_filter, cli.global.log_file.as_deref())
    {
        Ok(guard) => guard,
        Err(error) => {
            eprintln!("Error: {}", error);
            process::exit(1);
        }
    };

    let result = commands::provision::execute(cli.args, &cli.global);

    // Flush the file appender before exiting
    drop(guard);

    if let Err(error) = result {
        eprintln!("Error: {}", error);
        process::exit(1);
    }
}
