//! Registry configuration persistence
//!
//! Stores user preferences in `~/.config/chordmap/config.yaml`

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::keymap::Platform;

/// How long a partially matched sequence waits for its next chord
pub const DEFAULT_SEQUENCE_TIMEOUT_MS: u64 = 1000;

/// Registry configuration that persists across sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Milliseconds before a pending chord sequence is abandoned and replayed
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Override the detected platform (`mac`, `windows`, `linux`)
    #[serde(default)]
    pub platform: Option<Platform>,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_SEQUENCE_TIMEOUT_MS
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            platform: None,
        }
    }
}

impl RegistryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn platform(&self) -> Platform {
        self.platform.unwrap_or_default()
    }

    /// Load config from the user config directory, or defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load config from `path`, falling back to defaults on any error
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }
}
