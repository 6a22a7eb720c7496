//! Command-line argument parsing for the chordmap tool
//!
//! Supports:
//! - Normalizing and formatting keystrokes for a platform
//! - Checking a keymap file
//! - Simulating keystrokes against a keymap at a scope path

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use chordmap::keymap::Platform;

/// Inspect and exercise chord keymaps
#[derive(Parser, Debug)]
#[command(name = "chordmap", version, about = "Inspect and exercise chord keymaps")]
pub struct CliArgs {
    /// Platform to resolve Accel/Cmd for (mac, windows, linux)
    #[arg(long, global = true, value_parser = parse_platform)]
    pub platform: Option<Platform>,

    /// Registry config file (defaults to ~/.config/chordmap/config.yaml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Print the canonical form of each keystroke
    Normalize {
        #[arg(value_name = "KEYSTROKE", required = true)]
        keystrokes: Vec<String>,
    },

    /// Print the display form of a chord sequence
    Format {
        #[arg(value_name = "KEYSTROKE", required = true)]
        keystrokes: Vec<String>,
    },

    /// Validate a keymap file and list its bindings
    Check {
        /// Keymap file (defaults to ~/.config/chordmap/keymap.yaml)
        #[arg(value_name = "PATH")]
        keymap: Option<PathBuf>,
    },

    /// Feed keystrokes through a registry and report what fires
    Simulate {
        /// Keymap file (defaults to ~/.config/chordmap/keymap.yaml)
        #[arg(long, value_name = "PATH")]
        keymap: Option<PathBuf>,

        /// Focused target's scope chain, innermost first, e.g. `input#q.field`
        #[arg(long = "scope", value_name = "NODE")]
        scopes: Vec<String>,

        /// Treat this command as disabled
        #[arg(long = "disable", value_name = "COMMAND")]
        disabled: Vec<String>,

        /// Milliseconds between simulated keydowns
        #[arg(long, value_name = "MS", default_value_t = 0)]
        gap_ms: u64,

        #[arg(value_name = "KEYSTROKE", required = true)]
        keystrokes: Vec<String>,
    },
}

fn parse_platform(s: &str) -> Result<Platform, String> {
    match s.to_ascii_lowercase().as_str() {
        "mac" | "macos" => Ok(Platform::Mac),
        "windows" | "win" => Ok(Platform::Windows),
        "linux" => Ok(Platform::Linux),
        other => Err(format!("unknown platform '{}'", other)),
    }
}
