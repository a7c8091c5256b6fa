//! The plugin's command menu.
//!
//! The menu is an ordered table registered with the host at startup. An
//! item's index is its host command ID, which is also where the stable panel
//! IDs come from. Menu shortcuts are handed to the host for display and
//! registration; they never reach the key interceptor.

use crate::actions::Action;
use crate::panels::{PanelIds, PanelKind};
use scriptdock_config::Config;
use scriptdock_keybindings::{Chord, KeyCode, Modifiers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuCommand {
    pub title: &'static str,
    pub action: Action,
    pub shortcut: Option<Chord>,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem {
    Command(MenuCommand),
    Separator,
}

/// Ordered command table.
#[derive(Debug, Clone)]
pub struct CommandMenu {
    items: Vec<MenuItem>,
    panel_ids: PanelIds,
}

impl CommandMenu {
    /// The standard menu, with panel items checked per `config`.
    pub fn standard(config: &Config) -> Self {
        let build_shortcut = KeyCode::from_char('B')
            .map(|key| Chord::new(Modifiers::new(true, false, true), key));

        let mut menu = Self {
            items: Vec::new(),
            panel_ids: PanelIds {
                project: 0,
                output: 0,
                code_map: 0,
            },
        };
        menu.push(Action::Build, build_shortcut, false);
        menu.push(Action::Run, Some(Chord::key(KeyCode::F5)), false);
        menu.push(Action::Debug, None, false);
        menu.items.push(MenuItem::Separator);
        menu.panel_ids.project = menu.push(Action::ToggleProjectPanel, None, config.show_project_panel);
        menu.panel_ids.output = menu.push(Action::ToggleOutputPanel, None, config.show_output_panel);
        menu.panel_ids.code_map =
            menu.push(Action::ToggleCodeMapPanel, None, config.show_code_map_panel);
        menu.push(Action::ToggleSecondaryPanels, None, false);
        menu.items.push(MenuItem::Separator);
        menu.push(Action::CheckForUpdates, None, false);
        menu
    }

    fn push(&mut self, action: Action, shortcut: Option<Chord>, checked: bool) -> usize {
        let index = self.items.len();
        self.items.push(MenuItem::Command(MenuCommand {
            title: action.title(),
            action,
            shortcut,
            checked,
        }));
        index
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn panel_ids(&self) -> PanelIds {
        self.panel_ids
    }

    /// Action behind the item at `index`. Separators and out-of-range indices
    /// have none.
    pub fn action_at(&self, index: usize) -> Option<Action> {
        match self.items.get(index)? {
            MenuItem::Command(command) => Some(command.action),
            MenuItem::Separator => None,
        }
    }

    pub fn index_of(&self, action: Action) -> Option<usize> {
        self.items.iter().position(
            |item| matches!(item, MenuItem::Command(command) if command.action == action),
        )
    }

    /// Menu item that toggles `kind`.
    pub fn panel_action(kind: PanelKind) -> Action {
        match kind {
            PanelKind::Project => Action::ToggleProjectPanel,
            PanelKind::Output => Action::ToggleOutputPanel,
            PanelKind::CodeMap => Action::ToggleCodeMapPanel,
        }
    }

    pub fn is_checked(&self, action: Action) -> bool {
        self.items.iter().any(
            |item| matches!(item, MenuItem::Command(command) if command.action == action && command.checked),
        )
    }

    pub fn set_checked(&mut self, action: Action, checked: bool) {
        for item in &mut self.items {
            if let MenuItem::Command(command) = item
                && command.action == action
            {
                command.checked = checked;
            }
        }
    }
}
