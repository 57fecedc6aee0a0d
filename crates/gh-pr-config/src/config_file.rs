use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = ".gh-pr-tray.toml";

/// Load config file content
///
/// Searches for the config in:
/// 1. An explicitly given path (no fallback if it cannot be read)
/// 2. Current working directory as .gh-pr-tray.toml
/// 3. Home directory as .gh-pr-tray.toml
/// 4. The platform config directory as config.toml
///
/// Returns the file content if found, None otherwise.
pub fn load_config_file(explicit: Option<&Path>) -> Option<String> {
    if let Some(path) = explicit {
        return match std::fs::read_to_string(path) {
            Ok(content) => {
                log::debug!("Loaded config from {}", path.display());
                Some(content)
            }
            Err(e) => {
                log::warn!("Failed to read config file {}: {}", path.display(), e);
                None
            }
        };
    }

    // Try current directory first
    if let Ok(content) = std::fs::read_to_string(CONFIG_FILE) {
        log::debug!("Loaded config from {}", CONFIG_FILE);
        return Some(content);
    }

    let candidates = [
        get_home_config_path(),
        crate::paths::app_config_path().ok(),
    ];
    for path in candidates.into_iter().flatten() {
        if let Ok(content) = std::fs::read_to_string(&path) {
            log::debug!("Loaded config from {}", path.display());
            return Some(content);
        }
    }

    None
}

/// Get the path to the config file in the home directory
fn get_home_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_FILE))
}
