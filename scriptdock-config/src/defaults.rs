//! Default value functions for configuration.
//!
//! Used as `#[serde(default = "crate::defaults::...")]` attributes on `Config`
//! fields so that partially written YAML files still load.

use crate::types::KeyBinding;

pub fn bool_true() -> bool {
    true
}

/// Internal shortcuts the plugin intercepts before the host editor sees them.
pub fn keybindings() -> Vec<KeyBinding> {
    vec![
        KeyBinding::new("F7", "build"),
        KeyBinding::new("Ctrl+F7", "load_current_document"),
        KeyBinding::new("F5", "run"),
        KeyBinding::new("Ctrl+F5", "run_external"),
        KeyBinding::new("F4", "next_file_location"),
        KeyBinding::new("Ctrl+F4", "previous_file_location"),
    ]
}

pub fn interpreter() -> String {
    "cscs".to_string()
}

pub fn debug_args() -> Vec<String> {
    vec!["-dbg".to_string()]
}

pub fn external_launcher() -> Vec<String> {
    #[cfg(target_os = "windows")]
    {
        vec![
            "cmd".to_string(),
            "/c".to_string(),
            "start".to_string(),
            String::new(),
        ]
    }
    #[cfg(not(target_os = "windows"))]
    {
        Vec::new()
    }
}

pub fn script_extensions() -> Vec<String> {
    vec!["cs".to_string(), "csx".to_string()]
}

pub fn version_url() -> String {
    "https://github.com/scriptdock/scriptdock/releases/latest/download/latest.json".to_string()
}

pub fn home_url() -> String {
    "https://github.com/scriptdock/scriptdock/releases/latest".to_string()
}

pub fn startup_delay_ms() -> u64 {
    2000
}
