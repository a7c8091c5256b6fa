//! Command-line interface for scriptdock.
//!
//! Drives the plugin context without a host editor: panels are printed to the
//! console and update prompts are answered on stdin.

use crate::actions::{Action, Trigger};
use crate::headless::{ConsolePanelHost, ConsolePrompt};
use crate::plugin::{Plugin, today};
use crate::process::RunRequest;
use crate::project::ScriptProject;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scriptdock_config::{Config, ConfigHandle, UpdateConfig};
use scriptdock_keybindings::WinitKeyHook;
use scriptdock_update::{AppVersion, HttpVersionSource, SystemLauncher, UpdateChecker};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// scriptdock - build, run and debug scripts from your editor
#[derive(Parser)]
#[command(name = "scriptdock")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Log level for the session log (overrides config and RUST_LOG)
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevelArg>,
}

/// Log level argument for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevelArg {
    /// Convert to `log::LevelFilter`
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevelArg::Off => log::LevelFilter::Off,
            LogLevelArg::Error => log::LevelFilter::Error,
            LogLevelArg::Warn => log::LevelFilter::Warn,
            LogLevelArg::Info => log::LevelFilter::Info,
            LogLevelArg::Debug => log::LevelFilter::Debug,
            LogLevelArg::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a script and stream its output
    Run {
        script: PathBuf,

        /// Start the script in its own console instead
        #[arg(long, conflicts_with = "debug")]
        external: bool,

        /// Start the script under the debugger
        #[arg(long)]
        debug: bool,

        /// Give up waiting after this many seconds
        #[arg(long, value_name = "SECONDS", default_value_t = 600)]
        timeout: u64,
    },
    /// Validate a script without running it
    Build { script: PathBuf },
    /// Look for a newer release
    CheckUpdates {
        /// Check even if a check already ran today or checks are disabled
        #[arg(short, long)]
        force: bool,
    },
    /// Print the config file location
    ConfigPath,
    /// List the effective keyboard shortcuts
    Keys,
}

/// Load the config named on the command line, or the default one.
pub fn load_config(path: Option<&PathBuf>) -> Result<ConfigHandle> {
    let path = path.cloned().unwrap_or_else(Config::config_path);
    ConfigHandle::load_from(&path).with_context(|| format!("Failed to load {}", path.display()))
}

fn build_plugin(config: ConfigHandle) -> Plugin<WinitKeyHook> {
    let runner = config.snapshot().runner;
    Plugin::new(
        config,
        WinitKeyHook::new(),
        Box::new(ConsolePanelHost::new()),
        Box::new(ScriptProject::new(runner)),
    )
}

/// Execute the parsed command. Returns the process exit code.
pub fn run(cli: Cli, config: ConfigHandle) -> Result<i32> {
    match cli.command {
        Commands::Run {
            script,
            external,
            debug,
            timeout,
        } => run_script(config, script, external, debug, Duration::from_secs(timeout)),
        Commands::Build { script } => {
            let mut plugin = build_plugin(config);
            plugin.on_current_file_changed(Some(script));
            match plugin.execute(Action::Build, Trigger::Menu) {
                Some(RunRequest::Built) => {
                    println!("Build succeeded");
                    Ok(0)
                }
                Some(RunRequest::Failed(reason)) => {
                    eprintln!("Build failed: {}", reason);
                    Ok(1)
                }
                _ => Ok(1),
            }
        }
        Commands::CheckUpdates { force } => check_updates(config, force),
        Commands::ConfigPath => {
            let path = config.path().map(PathBuf::from).unwrap_or_else(Config::config_path);
            println!("{}", path.display());
            Ok(0)
        }
        Commands::Keys => {
            let plugin = build_plugin(config);
            for (chord, action) in plugin.dispatcher().listing() {
                println!("{:<16} {:<24} {}", chord, action.name(), action.title());
            }
            Ok(0)
        }
    }
}

fn run_script(
    config: ConfigHandle,
    script: PathBuf,
    external: bool,
    debug: bool,
    timeout: Duration,
) -> Result<i32> {
    let mut plugin = build_plugin(config);
    plugin.command_menu_init()?;
    plugin.on_current_file_changed(Some(script));

    let action = if external {
        Action::RunExternal
    } else if debug {
        Action::Debug
    } else {
        Action::Run
    };
    match plugin.execute(action, Trigger::Menu) {
        Some(RunRequest::Started { pid }) => {
            log::info!("Waiting for script {}", pid);
            if external {
                return Ok(0);
            }
            if !plugin.wait_idle(timeout) {
                eprintln!("Script {} still running after {:?}, stopping it", pid, timeout);
                plugin.stop_script();
                plugin.wait_idle(Duration::from_secs(5));
                return Ok(1);
            }
            Ok(0)
        }
        Some(RunRequest::Failed(reason)) => {
            eprintln!("{}", reason);
            Ok(1)
        }
        other => {
            eprintln!("Script not started: {:?}", other);
            Ok(1)
        }
    }
}

/// Update checker wired to the release endpoints and delay in `updates`.
fn update_checker(updates: &UpdateConfig) -> Result<UpdateChecker> {
    Ok(UpdateChecker::new(
        AppVersion::parse(crate::VERSION)?,
        Arc::new(HttpVersionSource::new(updates.version_url.clone())),
        Arc::new(ConsolePrompt),
        Arc::new(SystemLauncher),
    )
    .with_update_config(updates))
}

fn check_updates(config: ConfigHandle, force: bool) -> Result<i32> {
    let checker = update_checker(&config.snapshot().updates)?;

    let mut plugin = build_plugin(config).with_update_checker(checker);
    if force {
        plugin.check_for_updates_now(today());
    } else if let Some(decision) = plugin.on_ready(today()) {
        println!("Startup check: {:?}", decision);
    }

    match plugin.take_update_worker() {
        Some(worker) => match worker.join() {
            Ok(outcome) => {
                println!("{:?}", outcome);
                Ok(0)
            }
            Err(_) => {
                eprintln!("Update check thread panicked");
                Ok(1)
            }
        },
        None => Ok(0),
    }
}
