//! Process-wide key interception.
//!
//! [`KeyInterceptor`] sits between the host's raw key-down stream and the
//! plugin. It only looks at a fixed set of watched key codes; every other key
//! passes straight through to the host. For watched keys it publishes a
//! [`KeyDownEvent`] to its subscribers, synchronously and in subscription
//! order, on the thread that delivered the input.
//!
//! "Handled" semantics: the first subscriber to [`KeyDownEvent::claim`] the
//! event wins. Later subscribers still observe the event and can see that it
//! was claimed, but cannot claim it again. The host must only suppress its own
//! handling when the interceptor reports the event as claimed.

use crate::parser::{Chord, KeyCode, Modifiers};
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors raised by an OS key hook.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("failed to install key hook: {0}")]
    Install(String),
}

/// OS facility that delivers key events and reports live modifier state.
pub trait KeyHook {
    /// Hook into the input stream. Called at most once per installation.
    fn install(&mut self) -> Result<(), HookError>;

    /// Release the hook. Must leave no system-wide state behind.
    fn uninstall(&mut self);

    /// Modifier keys held right now.
    fn modifiers(&self) -> Modifiers;
}

/// A key-down notification for a watched key.
#[derive(Debug, Clone)]
pub struct KeyDownEvent {
    key: KeyCode,
    repeat_count: u32,
    modifiers: Modifiers,
    handled: bool,
}

impl KeyDownEvent {
    pub fn new(key: KeyCode, repeat_count: u32, modifiers: Modifiers) -> Self {
        Self {
            key,
            repeat_count,
            modifiers,
            handled: false,
        }
    }

    pub fn key(&self) -> KeyCode {
        self.key
    }

    pub fn repeat_count(&self) -> u32 {
        self.repeat_count
    }

    /// Modifier state read from the hook when the event was raised.
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// The chord formed by the live modifiers and this key.
    pub fn chord(&self) -> Chord {
        Chord::new(self.modifiers, self.key)
    }

    pub fn is_handled(&self) -> bool {
        self.handled
    }

    /// Mark the event handled. Returns `false` if another subscriber already
    /// claimed it.
    pub fn claim(&mut self) -> bool {
        if self.handled {
            return false;
        }
        self.handled = true;
        true
    }
}

/// Identifier returned by [`KeyInterceptor::subscribe`].
pub type SubscriptionId = u64;

type Subscriber<C> = Box<dyn FnMut(&mut KeyDownEvent, &mut C)>;

/// Key interceptor publishing watched key-downs to subscribers.
///
/// `C` is the context handed to subscribers alongside the event, which lets
/// the owner route events into its own state without shared ownership.
pub struct KeyInterceptor<H: KeyHook, C> {
    hook: H,
    installed: bool,
    enabled: bool,
    watched: BTreeSet<KeyCode>,
    subscribers: Vec<(SubscriptionId, Subscriber<C>)>,
    next_id: SubscriptionId,
}

impl<H: KeyHook, C> KeyInterceptor<H, C> {
    pub fn new(hook: H) -> Self {
        Self {
            hook,
            installed: false,
            enabled: true,
            watched: BTreeSet::new(),
            subscribers: Vec::new(),
            next_id: 1,
        }
    }

    /// Install the hook. Calling this again while installed does nothing.
    pub fn install(&mut self) -> Result<(), HookError> {
        if self.installed {
            log::debug!("Key hook already installed");
            return Ok(());
        }
        self.hook.install()?;
        self.installed = true;
        log::info!("Key hook installed");
        Ok(())
    }

    /// Remove the hook if installed.
    pub fn uninstall(&mut self) {
        if self.installed {
            self.hook.uninstall();
            self.installed = false;
            log::info!("Key hook uninstalled");
        }
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    /// Disabled interceptors let every key through without notifying anyone.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Start watching `key`.
    pub fn watch(&mut self, key: KeyCode) {
        self.watched.insert(key);
    }

    /// Replace the watched set.
    pub fn set_watched(&mut self, keys: impl IntoIterator<Item = KeyCode>) {
        self.watched = keys.into_iter().collect();
    }

    pub fn unwatch(&mut self, key: KeyCode) -> bool {
        self.watched.remove(&key)
    }

    pub fn is_watched(&self, key: KeyCode) -> bool {
        self.watched.contains(&key)
    }

    pub fn watched(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.watched.iter().copied()
    }

    /// Live modifier state from the hook.
    pub fn modifiers(&self) -> Modifiers {
        self.hook.modifiers()
    }

    pub fn hook(&self) -> &H {
        &self.hook
    }

    pub fn hook_mut(&mut self) -> &mut H {
        &mut self.hook
    }

    /// Register a key-down subscriber.
    pub fn subscribe(
        &mut self,
        subscriber: impl FnMut(&mut KeyDownEvent, &mut C) + 'static,
    ) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Feed a raw key-down from the host.
    ///
    /// Returns `true` when a subscriber claimed the event; the host must then
    /// skip its own handling. Unwatched keys, a disabled interceptor, or a
    /// hook that is not installed all return `false` without notifying anyone.
    pub fn key_down(&mut self, key: KeyCode, repeat_count: u32, ctx: &mut C) -> bool {
        if !self.installed || !self.enabled || !self.watched.contains(&key) {
            return false;
        }

        let mut event = KeyDownEvent::new(key, repeat_count, self.hook.modifiers());
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&mut event, ctx);
        }

        if event.is_handled() {
            log::debug!("Key {} handled by subscriber", event.chord());
        }
        event.is_handled()
    }
}

impl<H: KeyHook, C> Drop for KeyInterceptor<H, C> {
    fn drop(&mut self) {
        self.uninstall();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct TestHook {
        installs: u32,
        uninstalls: u32,
        modifiers: Modifiers,
    }

    impl KeyHook for TestHook {
        fn install(&mut self) -> Result<(), HookError> {
            self.installs += 1;
            Ok(())
        }

        fn uninstall(&mut self) {
            self.uninstalls += 1;
        }

        fn modifiers(&self) -> Modifiers {
            self.modifiers
        }
    }

    fn installed() -> KeyInterceptor<TestHook, Vec<String>> {
        let mut interceptor = KeyInterceptor::new(TestHook::default());
        interceptor.install().unwrap();
        interceptor.watch(KeyCode::F5);
        interceptor
    }

    #[test]
    fn test_install_is_idempotent() {
        let mut interceptor: KeyInterceptor<TestHook, ()> = KeyInterceptor::new(TestHook::default());
        interceptor.install().unwrap();
        interceptor.install().unwrap();
        assert_eq!(interceptor.hook().installs, 1);

        interceptor.uninstall();
        interceptor.uninstall();
        assert_eq!(interceptor.hook().uninstalls, 1);
        assert!(!interceptor.is_installed());
    }

    #[test]
    fn test_unwatched_key_passes_through() {
        let mut interceptor = installed();
        interceptor.subscribe(|event, log: &mut Vec<String>| {
            log.push(event.key().to_string());
            event.claim();
        });

        let mut log = Vec::new();
        assert!(!interceptor.key_down(KeyCode::F7, 1, &mut log));
        assert!(log.is_empty());
    }

    #[test]
    fn test_first_claim_wins_but_all_observe() {
        let mut interceptor = installed();
        interceptor.subscribe(|event, log: &mut Vec<String>| {
            log.push(format!("first:{}", event.claim()));
        });
        interceptor.subscribe(|event, log: &mut Vec<String>| {
            log.push(format!("second:{}:{}", event.is_handled(), event.claim()));
        });

        let mut log = Vec::new();
        assert!(interceptor.key_down(KeyCode::F5, 1, &mut log));
        assert_eq!(log, vec!["first:true", "second:true:false"]);
    }

    #[test]
    fn test_unclaimed_event_reports_unhandled() {
        let mut interceptor = installed();
        interceptor.subscribe(|_event, log: &mut Vec<String>| log.push("seen".into()));

        let mut log = Vec::new();
        assert!(!interceptor.key_down(KeyCode::F5, 1, &mut log));
        assert_eq!(log, vec!["seen"]);
    }

    #[test]
    fn test_event_carries_live_modifiers() {
        let mut interceptor = installed();
        interceptor.subscribe(|event, log: &mut Vec<String>| log.push(event.chord().to_string()));

        let mut log = Vec::new();
        interceptor.hook_mut().modifiers = Modifiers::CTRL;
        interceptor.key_down(KeyCode::F5, 1, &mut log);
        interceptor.hook_mut().modifiers = Modifiers::NONE;
        interceptor.key_down(KeyCode::F5, 1, &mut log);
        assert_eq!(log, vec!["Ctrl+F5", "F5"]);
    }

    #[test]
    fn test_disabled_or_uninstalled_delivers_nothing() {
        let mut interceptor = installed();
        interceptor.subscribe(|event, _log: &mut Vec<String>| {
            event.claim();
        });

        let mut log = Vec::new();
        interceptor.set_enabled(false);
        assert!(!interceptor.key_down(KeyCode::F5, 1, &mut log));

        interceptor.set_enabled(true);
        interceptor.uninstall();
        assert!(!interceptor.key_down(KeyCode::F5, 1, &mut log));
    }

    #[test]
    fn test_unsubscribe() {
        let mut interceptor = installed();
        let id = interceptor.subscribe(|event, _log: &mut Vec<String>| {
            event.claim();
        });
        assert!(interceptor.unsubscribe(id));
        assert!(!interceptor.unsubscribe(id));

        let mut log = Vec::new();
        assert!(!interceptor.key_down(KeyCode::F5, 1, &mut log));
    }
}
