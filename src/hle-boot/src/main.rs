mod cli;
mod commands;

use crate::cli::CliOptions;
use clap::Parser;
use sceio::IoSystem;

/// Entry point of the hle-boot executable.
///
///     hle-boot [-v...] [--config FILE] [--memstick DIR] [--flash DIR] <command>
///
/// Starts the I/O subsystem with the devices mounted the way a booted title
/// sees them, runs one command through the guest-facing calls, then shuts
/// the subsystem down again.
fn main() -> anyhow::Result<()> {
    let cli = CliOptions::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    let mut sys = IoSystem::start(cli.io_config()?);

    let mut stdout = std::io::stdout().lock();
    let result = commands::run(&cli.command, &mut sys, &mut stdout);

    // release every handle even when the command failed
    sys.shutdown();

    result
}
