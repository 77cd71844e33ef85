mod config;

pub use config::{Config, DefaultsConfig, ExportConfig, LoggingConfig};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/kiosk-overseer[-dev]/` based on OVERSEER_ENV.
///
/// Set OVERSEER_ENV=dev to use the development directory, or
/// OVERSEER_CONFIG_DIR to use an arbitrary one.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("OVERSEER_CONFIG_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("OVERSEER_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("kiosk-overseer-dev")
            } else {
                base_dir.join("kiosk-overseer")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DirectoryUnavailable(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
