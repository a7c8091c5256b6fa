// Library exports for the plugin core and the command-line harness.
//
// Threading: everything reachable from `Plugin` is driven from one UI thread.
// Only the update check runs in the background; it shares nothing with the
// UI thread except the `ConfigHandle`, whose `parking_lot::Mutex` is the
// exclusion scope for the once-per-day decision.

/// Application version (root crate version, for use by sub-crates).
/// Sub-crates should receive this via parameter rather than using
/// `env!("CARGO_PKG_VERSION")` which resolves to the sub-crate's version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod actions;
pub mod cli;
pub mod commands;
pub mod debug;
pub mod headless;
pub mod menu;
pub mod panels;
pub mod plugin;
pub mod process;
pub mod project;

pub use actions::{Action, Trigger};
pub use commands::CommandDispatcher;
pub use menu::{CommandMenu, MenuCommand, MenuItem};
pub use panels::{DockSide, PanelCoordinator, PanelDescriptor, PanelHandle, PanelHost, PanelIds, PanelKind};
pub use plugin::{Plugin, PluginCore};
pub use process::{
    ExitNotifier, LaunchedScript, OutputStream, ProcessEvent, ProcessManager, ProcessStatus,
    RunRequest, RunState, ScriptOp, ScriptRunner,
};
pub use project::{CurrentProject, ScriptProject};
