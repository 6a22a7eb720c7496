use anyhow::{bail, Context, Result};
use clap::Parser;
use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};

use chordmap::config::RegistryConfig;
use chordmap::keymap::{
    format_keystrokes_for, load_keymap_file, normalize_keystroke_for, CommandError, CommandHost,
    CommandRegistry, KeyAction, KeyBindingOptions, KeyboardLayout, KeycodeLayout, KeydownEvent,
    Platform, ScopeChain, ScopePath,
};

mod cli;

use cli::{CliArgs, CliCommand};

/// Host for `simulate`: every command in the keymap exists and prints when run
struct PrintingHost {
    commands: HashSet<String>,
    disabled: HashSet<String>,
    replays: RefCell<Vec<String>>,
}

impl CommandHost for PrintingHost {
    fn has_command(&self, id: &str) -> bool {
        self.commands.contains(id)
    }

    fn is_enabled(&self, id: &str, _args: &serde_json::Value) -> bool {
        self.has_command(id) && !self.disabled.contains(id)
    }

    fn execute(&self, id: &str, args: &serde_json::Value) -> Result<(), CommandError> {
        println!("  run {} {}", id, args);
        Ok(())
    }

    fn replay_keydown_event(&self, event: &KeydownEvent) {
        self.replays.borrow_mut().push(format!("{:?}", event.id()));
    }
}

fn keymap_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => chordmap::config_paths::keymap_file().context("No config directory available"),
    }
}

fn load_bindings(path: &Path) -> Result<Vec<KeyBindingOptions>> {
    load_keymap_file(path).with_context(|| format!("Failed to load keymap {}", path.display()))
}

fn run_check(config: &RegistryConfig, keymap: &Path) -> Result<()> {
    let bindings = load_bindings(keymap)?;
    let host = Rc::new(PrintingHost {
        commands: bindings.iter().map(|b| b.command.clone()).collect(),
        disabled: HashSet::new(),
        replays: RefCell::new(Vec::new()),
    });
    let registry = CommandRegistry::with_config(host, Box::new(KeycodeLayout::en_us()), config);
    registry.load_keymap(&bindings)?;

    for binding in registry.key_bindings() {
        println!(
            "{:<24} {:<20} {}",
            binding.display_string(config.platform()),
            binding.selector.as_str(),
            binding.command
        );
    }
    println!("{} bindings OK", registry.key_bindings().len());
    Ok(())
}

fn run_simulate(
    config: &RegistryConfig,
    keymap: &Path,
    scopes: &[String],
    disabled: Vec<String>,
    gap: Duration,
    keystrokes: &[String],
) -> Result<()> {
    let platform = config.platform();
    let bindings = load_bindings(keymap)?;
    let host = Rc::new(PrintingHost {
        commands: bindings.iter().map(|b| b.command.clone()).collect(),
        disabled: disabled.into_iter().collect(),
        replays: RefCell::new(Vec::new()),
    });
    let layout = KeycodeLayout::en_us();
    let mut registry =
        CommandRegistry::with_config(host.clone(), Box::new(layout.clone()), config);
    registry.load_keymap(&bindings)?;

    let scopes = if scopes.is_empty() {
        vec!["body".to_string()]
    } else {
        scopes.to_vec()
    };
    let target: Rc<dyn ScopeChain> = Rc::new(ScopePath::from_innermost(&scopes)?);

    let start = Instant::now();
    let mut now = start;
    for (i, keystroke) in keystrokes.iter().enumerate() {
        if i > 0 {
            now += gap;
        }
        for id in registry.poll_timeout(now) {
            println!("  timeout: replayed {:?}", id);
        }

        let Some(event) = layout.keydown_event(keystroke, target.clone(), platform) else {
            bail!("Key in '{}' is not on layout {}", keystroke, layout.name());
        };
        let outcome = registry.process_keydown_event_at(&event, now)?;
        for id in &outcome.replayed {
            println!("  abandoned: replayed {:?}", id);
        }

        let what = match &outcome.action {
            KeyAction::Ignored => "ignored".to_string(),
            KeyAction::NoMatch => "no match".to_string(),
            KeyAction::AwaitMore => format!(
                "pending [{}]",
                format_keystrokes_for(registry.pending_keystrokes(), platform)
            ),
            KeyAction::Executed(b) => format!("executed {}", b.command),
            KeyAction::Skipped(b) => format!("skipped {}", b.command),
            KeyAction::Held(held) => format!("held {}", held.command()),
        };
        let prevented = if outcome.default_prevented {
            " (default prevented)"
        } else {
            ""
        };
        println!("{:<16} {}{}", keystroke, what, prevented);
    }

    if let Some(deadline) = registry.next_deadline() {
        for id in registry.poll_timeout(deadline.max(now)) {
            println!("  timeout: replayed {:?}", id);
        }
    }
    println!("{} events replayed", host.replays.borrow().len());
    Ok(())
}

fn main() -> Result<()> {
    chordmap::tracing::init();

    let args = CliArgs::parse();

    let mut config = match &args.config {
        Some(path) => RegistryConfig::load_from(path),
        None => RegistryConfig::load(),
    };
    if args.platform.is_some() {
        config.platform = args.platform;
    }
    let platform: Platform = config.platform();

    match args.command {
        CliCommand::Normalize { keystrokes } => {
            for keystroke in &keystrokes {
                println!("{}", normalize_keystroke_for(keystroke, platform)?);
            }
        }
        CliCommand::Format { keystrokes } => {
            println!("{}", format_keystrokes_for(&keystrokes, platform));
        }
        CliCommand::Check { keymap } => {
            run_check(&config, &keymap_path(keymap)?)?;
        }
        CliCommand::Simulate {
            keymap,
            scopes,
            disabled,
            gap_ms,
            keystrokes,
        } => {
            run_simulate(
                &config,
                &keymap_path(keymap)?,
                &scopes,
                disabled,
                Duration::from_millis(gap_ms),
                &keystrokes,
            )?;
        }
    }

    Ok(())
}
