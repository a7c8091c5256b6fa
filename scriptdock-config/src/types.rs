//! Value types embedded in [`Config`](crate::Config).

use serde::{Deserialize, Serialize};

// ============================================================================
// Keybinding Types
// ============================================================================

/// A keybinding configuration entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    /// Key combination string, e.g., "Ctrl+F5"
    pub key: String,
    /// Action name, e.g., "run_external"
    pub action: String,
}

impl KeyBinding {
    pub fn new(key: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            action: action.into(),
        }
    }
}

// ============================================================================
// Logging
// ============================================================================

/// Log level for debug logging to file.
///
/// Controls the verbosity of log output written to the debug log file.
/// Environment variable `RUST_LOG` and the `--log-level` CLI flag take precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// No logging (log file not created)
    #[default]
    Off,
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Most verbose
    Trace,
}

impl LogLevel {
    /// Display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            LogLevel::Off => "Off",
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Convert to `log::LevelFilter`
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

// ============================================================================
// Script runner
// ============================================================================

/// How scripts are launched by the default project implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Interpreter executable used to run a script (the script path is appended
    /// after `args`)
    #[serde(default = "crate::defaults::interpreter")]
    pub interpreter: String,

    /// Extra arguments placed before the script path
    #[serde(default)]
    pub args: Vec<String>,

    /// Arguments inserted in debug mode, before `args`
    #[serde(default = "crate::defaults::debug_args")]
    pub debug_args: Vec<String>,

    /// Launcher wrapping "run as external process", e.g. `["cmd", "/c", "start"]`.
    /// Empty means the interpreter is started directly without piped output.
    #[serde(default = "crate::defaults::external_launcher")]
    pub external_launcher: Vec<String>,

    /// File extensions (lowercase, without the dot) treated as runnable scripts
    #[serde(default = "crate::defaults::script_extensions")]
    pub script_extensions: Vec<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            interpreter: crate::defaults::interpreter(),
            args: Vec::new(),
            debug_args: crate::defaults::debug_args(),
            external_launcher: crate::defaults::external_launcher(),
            script_extensions: crate::defaults::script_extensions(),
        }
    }
}

impl RunnerConfig {
    /// Whether `extension` (with or without a leading dot) names a script file.
    pub fn is_script_extension(&self, extension: &str) -> bool {
        let ext = extension.trim_start_matches('.');
        self.script_extensions
            .iter()
            .any(|known| known.eq_ignore_ascii_case(ext))
    }
}

// ============================================================================
// Update endpoints
// ============================================================================

/// Where update metadata and installers are fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateConfig {
    /// HTTPS URL of the JSON release manifest
    #[serde(default = "crate::defaults::version_url")]
    pub version_url: String,

    /// Page opened when the installer cannot be downloaded
    #[serde(default = "crate::defaults::home_url")]
    pub home_url: String,

    /// Delay before the background check contacts the network, letting the
    /// host finish its own startup
    #[serde(default = "crate::defaults::startup_delay_ms")]
    pub startup_delay_ms: u64,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            version_url: crate::defaults::version_url(),
            home_url: crate::defaults::home_url(),
            startup_delay_ms: crate::defaults::startup_delay_ms(),
        }
    }
}
