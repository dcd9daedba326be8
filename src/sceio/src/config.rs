//! Configuration for the I/O subsystem.
//!
//! Values come from an optional TOML file (usually `hle-io.toml`) and may
//! then be overridden by the front end.  Anything the file leaves out falls
//! back to the defaults below.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoConfig {
    /// Host directory backing `ms0:`, `fatms0:` and `fatms:`.
    pub memstick_dir: PathBuf,
    /// Host directory backing `flash0:` and `flash1:`.
    pub flash_dir: PathBuf,
    /// Collect text sent to the emulator debug channel instead of only
    /// logging it.
    pub print_emu_log: bool,
}

impl Default for IoConfig {
    fn default() -> Self {
        IoConfig {
            memstick_dir: PathBuf::from("memstick"),
            flash_dir: PathBuf::from("flash"),
            print_emu_log: false,
        }
    }
}

/// The file as written by a user: every key optional.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    memstick_dir: Option<PathBuf>,
    flash_dir: Option<PathBuf>,
    print_emu_log: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Read(#[source] std::io::Error),
    #[error("invalid config file: {0}")]
    Parse(#[source] toml::de::Error),
}

impl IoConfig {
    /// Parse a TOML document, filling unset keys from `Default`.
    pub fn from_toml_str(text: &str) -> Result<IoConfig, ConfigError> {
        let file: ConfigFile = toml::from_str(text).map_err(ConfigError::Parse)?;
        let defaults = IoConfig::default();
        Ok(IoConfig {
            memstick_dir: file.memstick_dir.unwrap_or(defaults.memstick_dir),
            flash_dir: file.flash_dir.unwrap_or(defaults.flash_dir),
            print_emu_log: file.print_emu_log.unwrap_or(defaults.print_emu_log),
        })
    }

    pub fn from_file(path: &Path) -> Result<IoConfig, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        Self::from_toml_str(&text)
    }
}
