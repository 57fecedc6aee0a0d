//! Configuration and data directory paths
//!
//! Uses XDG directories via `dirs` crate with fallbacks.
//!
//! Platform-specific locations:
//! - Linux: `~/.config/gh-pr-tray/`, `~/.cache/gh-pr-tray/`
//! - macOS: `~/Library/Application Support/gh-pr-tray/`, `~/Library/Caches/gh-pr-tray/`
//! - Windows: `%APPDATA%\gh-pr-tray\`, `%LOCALAPPDATA%\gh-pr-tray\`

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Fixed application identifier; also keys the stored credentials
pub const APP_NAME: &str = "gh-pr-tray";

const CREDENTIALS_FILE: &str = "credentials.json";

/// Get the application config directory
/// Returns ~/.config/gh-pr-tray/ on Linux, ~/Library/Application Support/gh-pr-tray/ on macOS
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine config directory")?;
    let dir = base.join(APP_NAME);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Get the application cache directory
/// Returns ~/.cache/gh-pr-tray/ on Linux, ~/Library/Caches/gh-pr-tray/ on macOS
pub fn cache_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir().context("Could not determine cache directory")?;
    let dir = base.join(APP_NAME);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Get path to the stored OAuth credentials
pub fn credentials_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CREDENTIALS_FILE))
}

/// Get path to app config file
pub fn app_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}
