//! Chord-to-action dispatch for the plugin's internal shortcuts.

use crate::actions::Action;
use scriptdock_config::KeyBinding;
use scriptdock_keybindings::{Chord, KeyCode, ShortcutRegistry};
use std::collections::BTreeSet;

/// Resolves chords from the key interceptor to plugin actions.
pub struct CommandDispatcher {
    registry: ShortcutRegistry<Action>,
}

impl CommandDispatcher {
    pub fn new(registry: ShortcutRegistry<Action>) -> Self {
        Self { registry }
    }

    /// Build from config keybindings; unknown actions and bad chords are skipped.
    pub fn from_keybindings(keybindings: &[KeyBinding]) -> Self {
        Self::new(ShortcutRegistry::from_config(keybindings, Action::resolve))
    }

    pub fn registry(&self) -> &ShortcutRegistry<Action> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ShortcutRegistry<Action> {
        &mut self.registry
    }

    /// Exact-match lookup.
    pub fn action_for(&self, chord: &Chord) -> Option<Action> {
        self.registry.lookup(chord).map(|binding| binding.action)
    }

    /// Run `exec` with the action bound to `chord`.
    ///
    /// Returns `false` with no side effect when nothing is bound, so the key
    /// can be left to the host editor.
    pub fn dispatch(&self, chord: &Chord, exec: impl FnOnce(Action)) -> bool {
        self.registry.dispatch_with(chord, |action| exec(*action))
    }

    /// The key codes the interceptor has to watch.
    pub fn watched_keys(&self) -> BTreeSet<KeyCode> {
        self.registry.key_codes()
    }

    /// Bindings sorted by display string, for listings.
    pub fn listing(&self) -> Vec<(String, Action)> {
        let mut rows: Vec<(String, Action)> = self
            .registry
            .iter()
            .map(|(chord, binding)| (chord.to_string(), binding.action))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows
    }
}
