//! The persisted plugin configuration.

use crate::types::{KeyBinding, LogLevel, RunnerConfig, UpdateConfig};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Format of `last_updates_check_date`.
pub const CHECK_DATE_FORMAT: &str = "%Y-%m-%d";

/// Plugin configuration, read at startup and written at shutdown and after
/// every update-check decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    // ========================================================================
    // Panels
    // ========================================================================
    /// Show the project panel when the host becomes ready
    #[serde(default)]
    pub show_project_panel: bool,

    /// Show the output panel when the host becomes ready
    #[serde(default)]
    pub show_output_panel: bool,

    /// Show the code-map panel when the host becomes ready
    #[serde(default)]
    pub show_code_map_panel: bool,

    // ========================================================================
    // Updates
    // ========================================================================
    /// Look for a newer release once per day on startup
    #[serde(default = "crate::defaults::bool_true")]
    pub check_updates_on_startup: bool,

    /// Calendar date (YYYY-MM-DD) of the last update check (auto-managed)
    #[serde(default)]
    pub last_updates_check_date: String,

    /// Release endpoints
    #[serde(default)]
    pub updates: UpdateConfig,

    // ========================================================================
    // Input
    // ========================================================================
    /// Internal shortcuts, merged over the built-in defaults by action name
    #[serde(default = "crate::defaults::keybindings")]
    pub keybindings: Vec<KeyBinding>,

    // ========================================================================
    // Script execution
    // ========================================================================
    #[serde(default)]
    pub runner: RunnerConfig,

    // ========================================================================
    // Diagnostics
    // ========================================================================
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            show_project_panel: false,
            show_output_panel: false,
            show_code_map_panel: false,
            check_updates_on_startup: true,
            last_updates_check_date: String::new(),
            updates: UpdateConfig::default(),
            keybindings: crate::defaults::keybindings(),
            runner: RunnerConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an update check already happened on `today`.
    pub fn checked_for_updates_on(&self, today: NaiveDate) -> bool {
        self.last_updates_check_date == format_check_date(today)
    }

    /// Record `today` as the last update-check date.
    pub fn mark_update_check(&mut self, today: NaiveDate) {
        self.last_updates_check_date = format_check_date(today);
    }

    /// Add the default keybindings the user's list leaves free.
    ///
    /// A default is skipped when the user already maps its action or its
    /// chord. Added defaults go in front of the user's entries, so a user
    /// entry still wins when the registry is built in order.
    pub fn merge_default_keybindings(&mut self) {
        let taken: HashSet<String> = self
            .keybindings
            .iter()
            .map(|b| normalize_key(&b.key))
            .collect();

        let missing: Vec<KeyBinding> = crate::defaults::keybindings()
            .into_iter()
            .filter(|default| {
                if self.keybindings.iter().any(|b| b.action == default.action) {
                    return false;
                }
                if taken.contains(&normalize_key(&default.key)) {
                    log::info!(
                        "Default keybinding {} -> {} skipped, chord is user-bound",
                        default.key,
                        default.action
                    );
                    return false;
                }
                log::info!(
                    "Adding default keybinding {} -> {}",
                    default.key,
                    default.action
                );
                true
            })
            .collect();

        self.keybindings.splice(0..0, missing);
    }
}

/// Canonical text of a chord string: lowercase, modifier aliases folded,
/// modifiers sorted ahead of the key.
fn normalize_key(key: &str) -> String {
    let mut parts: Vec<String> = key
        .split('+')
        .map(|part| match part.trim().to_lowercase().as_str() {
            "control" => "ctrl".to_string(),
            "option" => "alt".to_string(),
            other => other.to_string(),
        })
        .collect();
    let Some(last) = parts.pop() else {
        return String::new();
    };
    parts.sort();
    parts.push(last);
    parts.join("+")
}

/// Render a date the way it is stored in `last_updates_check_date`.
pub fn format_check_date(date: NaiveDate) -> String {
    date.format(CHECK_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_date_roundtrip() {
        let mut config = Config::default();
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(!config.checked_for_updates_on(day));

        config.mark_update_check(day);
        assert_eq!(config.last_updates_check_date, "2024-01-01");
        assert!(config.checked_for_updates_on(day));
        assert!(!config.checked_for_updates_on(day.succ_opt().unwrap()));
    }

    #[test]
    fn test_merge_default_keybindings_keeps_user_chord() {
        let mut config = Config {
            keybindings: vec![KeyBinding::new("Ctrl+R", "run")],
            ..Config::default()
        };
        config.merge_default_keybindings();

        let run: Vec<_> = config
            .keybindings
            .iter()
            .filter(|b| b.action == "run")
            .collect();
        assert_eq!(run.len(), 1);
        assert_eq!(run[0].key, "Ctrl+R");
        assert!(config.keybindings.iter().any(|b| b.action == "build"));
    }

    #[test]
    fn test_merge_default_keybindings_skips_user_chord() {
        let mut config = Config {
            keybindings: vec![KeyBinding::new("f5", "debug")],
            ..Config::default()
        };
        config.merge_default_keybindings();

        assert!(!config.keybindings.iter().any(|b| b.action == "run"));
        assert_eq!(
            config.keybindings.last(),
            Some(&KeyBinding::new("f5", "debug"))
        );
        assert!(config.keybindings.iter().any(|b| b.action == "run_external"));
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("Shift + Control+F5"), "ctrl+shift+f5");
        assert_eq!(normalize_key("ctrl+shift+F5"), "ctrl+shift+f5");
        assert_eq!(normalize_key("F7"), "f7");
    }
}
