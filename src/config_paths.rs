//! Where chordmap keeps its settings, keymap and logs
//!
//! `CHORDMAP_CONFIG_DIR` overrides the location. Otherwise the platform
//! config root is used: `$XDG_CONFIG_HOME` or `~/.config` on Unix and macOS,
//! `%APPDATA%` on Windows.

use std::{env, fs, path::PathBuf};

const APP_DIR: &str = "chordmap";
const DIR_OVERRIDE_VAR: &str = "CHORDMAP_CONFIG_DIR";

#[cfg(target_os = "windows")]
fn platform_root() -> Option<PathBuf> {
    env::var_os("APPDATA").map(PathBuf::from)
}

#[cfg(not(target_os = "windows"))]
fn platform_root() -> Option<PathBuf> {
    env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
}

pub fn config_dir() -> Option<PathBuf> {
    match env::var_os(DIR_OVERRIDE_VAR) {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => platform_root().map(|root| root.join(APP_DIR)),
    }
}

/// Registry settings (`RegistryConfig`)
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.yaml"))
}

/// User keymap read by `chordmap check` and `chordmap simulate`
pub fn keymap_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("keymap.yaml"))
}

pub fn logs_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("logs"))
}

/// Create the logs dir (and the config dir above it) if needed
pub fn ensure_logs_dir() -> Result<PathBuf, String> {
    let logs = logs_dir().ok_or_else(|| "No config directory available".to_string())?;
    fs::create_dir_all(&logs)
        .map_err(|e| format!("Failed to create directory {}: {}", logs.display(), e))?;
    Ok(logs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_dir_roots_every_path() {
        let dir = tempfile::tempdir().unwrap();
        env::set_var(DIR_OVERRIDE_VAR, dir.path());

        assert_eq!(config_dir().as_deref(), Some(dir.path()));
        assert_eq!(keymap_file(), Some(dir.path().join("keymap.yaml")));
        let logs = ensure_logs_dir().unwrap();
        assert_eq!(logs, dir.path().join("logs"));
        assert!(logs.is_dir());

        env::remove_var(DIR_OVERRIDE_VAR);
    }
}
