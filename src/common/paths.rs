//! Platform-appropriate configuration paths

use std::path::PathBuf;

/// Application name used for configuration directories
const APP_NAME: &str = "caseflow";

/// Get the configuration directory path
///
/// Uses the directories crate for platform-appropriate locations:
/// - Linux: `~/.config/caseflow/`
/// - macOS: `~/Library/Application Support/caseflow/`
/// - Windows: `%APPDATA%\caseflow\`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}
