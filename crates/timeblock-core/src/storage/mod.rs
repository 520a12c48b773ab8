mod config;

pub use config::{Config, SchedulerSection, TimeblocksSection};

use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Returns the config directory.
///
/// `TIMEBLOCK_CONFIG_DIR` wins when set. Otherwise `~/.config/timeblock[-dev]/`,
/// where `TIMEBLOCK_ENV=dev` selects the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("TIMEBLOCK_CONFIG_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("TIMEBLOCK_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("timeblock-dev")
            } else {
                base_dir.join("timeblock")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DirUnavailable(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
