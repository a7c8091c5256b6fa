//! Keybinding system for scriptdock.
//!
//! This crate provides the plugin's internal shortcuts:
//!
//! - [`Chord`] values (key code + Ctrl/Alt/Shift) and a parser for
//!   human-readable strings such as "Ctrl+F5"
//! - [`ShortcutRegistry`], an exact-match map from chord to named action
//! - [`KeyInterceptor`], the watched-key hook that publishes key-downs
//! - A winit adapter for hosts built on a winit event loop

pub mod interceptor;
pub mod parser;
pub mod platform;

pub use interceptor::{HookError, KeyDownEvent, KeyHook, KeyInterceptor, SubscriptionId};
pub use parser::{Chord, KeyCode, Modifiers, ParseError, parse_chord};
pub use platform::WinitKeyHook;

use scriptdock_config::KeyBinding;
use std::collections::{BTreeSet, HashMap};

/// A named action bound to a chord.
#[derive(Debug, Clone)]
pub struct Binding<A> {
    pub name: String,
    pub action: A,
}

/// Registry of shortcuts mapping chords to named actions.
///
/// Chords are unique keys. Registering a chord that is already bound replaces
/// the previous binding (last write wins); the replaced binding is returned
/// and logged so the overwrite is never silent.
#[derive(Debug)]
pub struct ShortcutRegistry<A> {
    bindings: HashMap<Chord, Binding<A>>,
}

impl<A> Default for ShortcutRegistry<A> {
    fn default() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }
}

impl<A> ShortcutRegistry<A> {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from config keybindings.
    ///
    /// `resolve` turns an action name into an action; entries with an invalid
    /// chord or an unknown action name are logged and skipped.
    pub fn from_config(
        keybindings: &[KeyBinding],
        mut resolve: impl FnMut(&str) -> Option<(String, A)>,
    ) -> Self {
        let mut registry = Self::new();

        log::info!(
            "Building shortcut registry from {} config keybindings",
            keybindings.len()
        );
        for binding in keybindings {
            let chord = match parse_chord(&binding.key) {
                Ok(chord) => chord,
                Err(e) => {
                    log::warn!(
                        "Invalid keybinding '{}' for action '{}': {}",
                        binding.key,
                        binding.action,
                        e
                    );
                    continue;
                }
            };
            let Some((name, action)) = resolve(&binding.action) else {
                log::warn!(
                    "Unknown action '{}' for keybinding '{}'",
                    binding.action,
                    binding.key
                );
                continue;
            };
            log::info!("Registered keybinding: {} -> {}", chord, binding.action);
            registry.register(chord, name, action);
        }

        log::info!(
            "Shortcut registry initialized with {} bindings",
            registry.bindings.len()
        );
        registry
    }

    /// Bind `chord` to `action`, returning the binding it replaced.
    pub fn register(
        &mut self,
        chord: Chord,
        name: impl Into<String>,
        action: A,
    ) -> Option<Binding<A>> {
        let name = name.into();
        let replaced = self.bindings.insert(chord, Binding { name, action });
        if let Some(old) = &replaced {
            log::warn!(
                "Shortcut {} rebound, replacing '{}'",
                chord,
                old.name
            );
        }
        replaced
    }

    pub fn unregister(&mut self, chord: &Chord) -> Option<Binding<A>> {
        self.bindings.remove(chord)
    }

    /// Exact-match lookup.
    pub fn lookup(&self, chord: &Chord) -> Option<&Binding<A>> {
        self.bindings.get(chord)
    }

    /// Run `f` on the action bound to `chord`. Returns whether a binding existed.
    pub fn dispatch_with(&self, chord: &Chord, f: impl FnOnce(&A)) -> bool {
        match self.bindings.get(chord) {
            Some(binding) => {
                log::debug!("Dispatching {} -> {}", chord, binding.name);
                f(&binding.action);
                true
            }
            None => false,
        }
    }

    /// Key codes appearing in any binding; the set the interceptor must watch.
    pub fn key_codes(&self) -> BTreeSet<KeyCode> {
        self.bindings.keys().map(|chord| chord.key).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Chord, &Binding<A>)> {
        self.bindings.iter()
    }

    /// Check if the registry has any bindings.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Get the number of registered bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }
}

impl<A: Fn()> ShortcutRegistry<A> {
    /// Invoke the zero-argument action bound to `chord`.
    ///
    /// Returns `false`, with no side effect, when nothing is bound.
    pub fn dispatch(&self, chord: &Chord) -> bool {
        self.dispatch_with(chord, |action| action())
    }
}
