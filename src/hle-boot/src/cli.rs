use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use sceio::IoConfig;
use sysdefs::constants::SavedataMode;

#[derive(Debug, Parser, Clone)]
#[command(name = "hle-boot")]
pub struct CliOptions {
    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// TOML file with the I/O configuration
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Host directory backing the memory stick (overrides the config file)
    #[arg(long, value_name = "DIR")]
    pub memstick: Option<PathBuf>,

    /// Host directory backing flash0:/flash1: (overrides the config file)
    #[arg(long, value_name = "DIR")]
    pub flash: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// List a guest directory, e.g. `ms0:/PSP/SAVEDATA`
    Ls { path: String },

    /// Show the stat record of a guest path
    Stat { path: String },

    /// Scan candidate save slots the way the savedata dialog does
    Slots {
        /// Game identifier, e.g. ULUS10000
        #[arg(long)]
        game: String,

        /// Data file inside each slot
        #[arg(long, default_value = "DATA.BIN")]
        file: String,

        #[arg(long, value_enum, default_value_t = SlotMode::ListSave)]
        mode: SlotMode,

        /// Candidate slot names
        #[arg(required = true, num_args = 1..)]
        names: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SlotMode {
    ListSave,
    ListLoad,
    ListDelete,
}

impl From<SlotMode> for SavedataMode {
    fn from(mode: SlotMode) -> Self {
        match mode {
            SlotMode::ListSave => SavedataMode::ListSave,
            SlotMode::ListLoad => SavedataMode::ListLoad,
            SlotMode::ListDelete => SavedataMode::ListDelete,
        }
    }
}

impl CliOptions {
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }

    /// The config file (or defaults) with the command-line overrides applied.
    pub fn io_config(&self) -> anyhow::Result<IoConfig> {
        let mut config = match &self.config {
            Some(path) => IoConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => IoConfig::default(),
        };
        if let Some(dir) = &self.memstick {
            config.memstick_dir = dir.clone();
        }
        if let Some(dir) = &self.flash {
            config.flash_dir = dir.clone();
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_and_overrides() {
        let cli = CliOptions::parse_from(["hle-boot", "-vv", "--memstick", "/tmp/ms", "ls", "ms0:/"]);
        assert_eq!(cli.log_level(), log::LevelFilter::Debug);
        let config = cli.io_config().unwrap();
        assert_eq!(config.memstick_dir, PathBuf::from("/tmp/ms"));
        assert_eq!(config.flash_dir, IoConfig::default().flash_dir);
        assert!(matches!(cli.command, Command::Ls { ref path } if path == "ms0:/"));
    }

    #[test]
    fn slots_arguments() {
        let cli = CliOptions::parse_from([
            "hle-boot", "slots", "--game", "ULUS10000", "--mode", "list-load", "A", "B",
        ]);
        match cli.command {
            Command::Slots { game, file, mode, names } => {
                assert_eq!(game, "ULUS10000");
                assert_eq!(file, "DATA.BIN");
                assert_eq!(SavedataMode::from(mode), SavedataMode::ListLoad);
                assert_eq!(names, vec!["A", "B"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let cli = CliOptions::parse_from(["hle-boot", "--config", "/nonexistent/hle-io.toml", "ls", "ms0:/"]);
        assert!(cli.io_config().is_err());
    }
}
