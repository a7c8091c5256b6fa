//! Configuration system for the scriptdock editor plugin.
//!
//! This crate provides configuration loading, saving, and default values:
//!
//! - Panel visibility flags restored at startup and persisted at shutdown
//! - Update-check throttle state (startup flag + last check date)
//! - Internal shortcut overrides
//! - Script runner and update endpoint settings
//! - A shared [`ConfigHandle`] for cross-thread access

pub mod config;
pub mod defaults;
mod error;
mod handle;
mod persistence;
mod types;

pub use config::{CHECK_DATE_FORMAT, Config, format_check_date};
pub use error::ConfigError;
pub use handle::ConfigHandle;
pub use types::{KeyBinding, LogLevel, RunnerConfig, UpdateConfig};
