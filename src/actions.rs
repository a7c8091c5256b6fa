//! The catalogue of plugin actions.
//!
//! Every action can be reached from a configured shortcut and, for most, from
//! the command menu. Config files refer to actions by [`Action::name`].

use std::fmt;

/// A named plugin action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Build,
    LoadCurrentDocument,
    Run,
    RunExternal,
    Debug,
    NextFileLocation,
    PreviousFileLocation,
    ToggleProjectPanel,
    ToggleOutputPanel,
    ToggleCodeMapPanel,
    ToggleSecondaryPanels,
    CheckForUpdates,
}

/// How an action was triggered.
///
/// Shortcut-triggered runs only fire when the current document is a script;
/// menu-triggered runs always go through to the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Shortcut,
    Menu,
}

impl Action {
    pub const ALL: [Action; 12] = [
        Action::Build,
        Action::LoadCurrentDocument,
        Action::Run,
        Action::RunExternal,
        Action::Debug,
        Action::NextFileLocation,
        Action::PreviousFileLocation,
        Action::ToggleProjectPanel,
        Action::ToggleOutputPanel,
        Action::ToggleCodeMapPanel,
        Action::ToggleSecondaryPanels,
        Action::CheckForUpdates,
    ];

    /// Identifier used in `keybindings` config entries.
    pub fn name(self) -> &'static str {
        match self {
            Action::Build => "build",
            Action::LoadCurrentDocument => "load_current_document",
            Action::Run => "run",
            Action::RunExternal => "run_external",
            Action::Debug => "debug",
            Action::NextFileLocation => "next_file_location",
            Action::PreviousFileLocation => "previous_file_location",
            Action::ToggleProjectPanel => "toggle_project_panel",
            Action::ToggleOutputPanel => "toggle_output_panel",
            Action::ToggleCodeMapPanel => "toggle_code_map_panel",
            Action::ToggleSecondaryPanels => "toggle_secondary_panels",
            Action::CheckForUpdates => "check_for_updates",
        }
    }

    /// Human-readable title shown in menus and shortcut listings.
    pub fn title(self) -> &'static str {
        match self {
            Action::Build => "Build (validate)",
            Action::LoadCurrentDocument => "Load Current Document",
            Action::Run => "Run",
            Action::RunExternal => "Run As External Process",
            Action::Debug => "Debug",
            Action::NextFileLocation => "Next File Location in Output",
            Action::PreviousFileLocation => "Previous File Location in Output",
            Action::ToggleProjectPanel => "Project Panel",
            Action::ToggleOutputPanel => "Output Panel",
            Action::ToggleCodeMapPanel => "CodeMap Panel",
            Action::ToggleSecondaryPanels => "Toggle Output/CodeMap Panels",
            Action::CheckForUpdates => "Check for Updates",
        }
    }

    /// Look up an action by its config identifier (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|action| action.name().eq_ignore_ascii_case(name))
    }

    /// Resolver for `ShortcutRegistry::from_config`.
    pub fn resolve(name: &str) -> Option<(String, Action)> {
        Self::from_name(name).map(|action| (action.title().to_string(), action))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
