//! Panel visibility through the plugin: toggles, the secondary-panel cycle,
//! and persistence across sessions.

mod common;

use common::{RecordingHost, test_plugin, test_plugin_with_handle};
use scriptdock::{Action, PanelCoordinator, PanelKind, Trigger};
use scriptdock_config::{Config, ConfigHandle};
use std::path::PathBuf;
use tempfile::TempDir;

fn visibility(t: &common::TestPlugin) -> (bool, bool, bool) {
    let panels = t.plugin.panels();
    (
        panels.is_visible(PanelKind::Project),
        panels.is_visible(PanelKind::Output),
        panels.is_visible(PanelKind::CodeMap),
    )
}

#[test]
fn test_panel_ids_come_from_menu_indices() {
    let t = test_plugin(Config::default());
    let menu = t.plugin.menu();
    let ids = menu.panel_ids();

    assert_eq!(Some(ids.project), menu.index_of(Action::ToggleProjectPanel));
    assert_eq!(Some(ids.output), menu.index_of(Action::ToggleOutputPanel));
    assert_eq!(Some(ids.code_map), menu.index_of(Action::ToggleCodeMapPanel));
}

#[test]
fn test_first_toggle_creates_panel_with_its_title() {
    let mut t = test_plugin(Config::default());
    t.plugin.execute(Action::ToggleCodeMapPanel, Trigger::Menu);

    let ids = t.plugin.menu().panel_ids();
    assert_eq!(
        t.host.borrow().created,
        vec![(ids.code_map, "Code Map".to_string())]
    );
    assert!(t.plugin.menu().is_checked(Action::ToggleCodeMapPanel));

    t.plugin.execute(Action::ToggleCodeMapPanel, Trigger::Menu);
    assert!(!t.plugin.menu().is_checked(Action::ToggleCodeMapPanel));
    // Hidden, not destroyed
    assert_eq!(t.host.borrow().created.len(), 1);
}

#[test]
fn test_secondary_toggle_shows_output_first() {
    let mut t = test_plugin(Config::default());
    t.plugin.execute(Action::ToggleSecondaryPanels, Trigger::Menu);
    assert_eq!(visibility(&t), (false, true, false));
}

#[test]
fn test_secondary_toggle_then_shows_code_map() {
    let mut t = test_plugin(Config::default());
    t.plugin.execute(Action::ToggleSecondaryPanels, Trigger::Menu);
    t.plugin.execute(Action::ToggleSecondaryPanels, Trigger::Menu);
    assert_eq!(visibility(&t), (false, true, true));
    assert!(t.plugin.menu().is_checked(Action::ToggleCodeMapPanel));
}

#[test]
fn test_secondary_toggle_with_both_visible_keeps_both() {
    let mut t = test_plugin(Config::default());
    t.plugin.execute(Action::ToggleOutputPanel, Trigger::Menu);
    t.plugin.execute(Action::ToggleCodeMapPanel, Trigger::Menu);

    t.plugin.execute(Action::ToggleSecondaryPanels, Trigger::Menu);
    assert_eq!(visibility(&t), (false, true, true));
}

#[test]
fn test_secondary_toggle_with_hidden_output_ignores_code_map() {
    let mut t = test_plugin(Config::default());
    t.plugin.execute(Action::ToggleCodeMapPanel, Trigger::Menu);

    t.plugin.execute(Action::ToggleSecondaryPanels, Trigger::Menu);
    assert_eq!(visibility(&t), (false, true, true));
}

#[test]
fn test_code_map_refreshes_on_file_change_once_created() {
    let mut t = test_plugin(Config::default());
    t.plugin
        .on_current_file_changed(Some(PathBuf::from("a.cs")));
    assert!(t.host.borrow().refreshed.is_empty());

    t.plugin.execute(Action::ToggleCodeMapPanel, Trigger::Menu);
    t.plugin
        .on_current_file_changed(Some(PathBuf::from("b.cs")));

    assert_eq!(t.host.borrow().refreshed.len(), 1);
    assert_eq!(
        t.project.borrow().document,
        Some(PathBuf::from("b.cs"))
    );
}

#[test]
fn test_visibility_survives_restart() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.yaml");

    {
        let handle = ConfigHandle::with_path(Config::default(), &path);
        let mut t = test_plugin_with_handle(handle);
        t.plugin.on_ready(chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(visibility(&t), (false, false, false));

        t.plugin.execute(Action::ToggleProjectPanel, Trigger::Menu);
        t.plugin.execute(Action::ToggleCodeMapPanel, Trigger::Menu);
        t.plugin.on_shutdown().unwrap();
    }

    let saved = Config::load_from(&path).unwrap();
    assert!(saved.show_project_panel);
    assert!(!saved.show_output_panel);
    assert!(saved.show_code_map_panel);

    let handle = ConfigHandle::load_from(&path).unwrap();
    let mut t = test_plugin_with_handle(handle);
    assert!(t.plugin.menu().is_checked(Action::ToggleProjectPanel));
    t.plugin.on_ready(chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    assert_eq!(visibility(&t), (true, false, true));
}

#[test]
fn test_coordinator_ensure_leaves_hidden_panel_hidden() {
    let host = std::rc::Rc::new(std::cell::RefCell::new(common::HostState::default()));
    let ids = scriptdock::CommandMenu::standard(&Config::default()).panel_ids();
    let mut panels = PanelCoordinator::new(Box::new(RecordingHost(host.clone())), ids);

    panels.show_panel(PanelKind::Project);
    panels.hide_panel(PanelKind::Project);
    panels.ensure_panel(PanelKind::Project);

    assert!(!panels.is_visible(PanelKind::Project));
    assert_eq!(host.borrow().created.len(), 1);
}
