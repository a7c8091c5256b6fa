//! The plugin context.
//!
//! [`Plugin`] is created once per host session and owns every piece of
//! plugin-wide state: the shortcut dispatcher, the command menu, the panels,
//! the running-script slot and the update checker. The host forwards its
//! lifecycle events, raw key-downs and menu clicks to it from the UI thread.

use crate::actions::{Action, Trigger};
use crate::commands::CommandDispatcher;
use crate::menu::CommandMenu;
use crate::panels::{PanelCoordinator, PanelHost, PanelKind};
use crate::process::{
    OutputStream, ProcessEvent, ProcessManager, ProcessStatus, RunRequest, ScriptOp,
};
use crate::project::CurrentProject;
use chrono::NaiveDate;
use scriptdock_config::ConfigHandle;
use scriptdock_keybindings::{
    HookError, KeyCode, KeyDownEvent, KeyHook, KeyInterceptor, SubscriptionId,
};
use scriptdock_update::{CheckDecision, UpdateChecker, UpdateOutcome};
use std::path::PathBuf;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Today's date in local time.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// State reachable from key-interceptor subscribers.
pub struct PluginCore {
    config: ConfigHandle,
    dispatcher: CommandDispatcher,
    menu: CommandMenu,
    panels: PanelCoordinator,
    processes: ProcessManager,
    project: Box<dyn CurrentProject>,
    updates: Option<UpdateChecker>,
    update_worker: Option<JoinHandle<UpdateOutcome>>,
}

impl PluginCore {
    /// Route an intercepted key-down to its bound action.
    ///
    /// Unbound chords and events another subscriber already claimed are left
    /// alone so the host keeps its own handling.
    fn on_shortcut(&mut self, event: &mut KeyDownEvent) {
        let Some(action) = self.dispatcher.action_for(&event.chord()) else {
            return;
        };
        if event.claim() {
            self.execute(action, Trigger::Shortcut);
        }
    }

    /// Perform `action`. Returns the lifecycle result for script operations.
    pub fn execute(&mut self, action: Action, trigger: Trigger) -> Option<RunRequest> {
        log::debug!("Executing {} ({:?})", action, trigger);
        match action {
            Action::Build => Some(self.run_op(ScriptOp::Build)),
            Action::LoadCurrentDocument => {
                self.panels.show_panel(PanelKind::Project);
                self.sync_panel_checks();
                if let Err(e) = self.project.load_current_document() {
                    log::warn!("Cannot load current document: {:#}", e);
                }
                None
            }
            Action::Run | Action::RunExternal => {
                if trigger == Trigger::Shortcut && !self.project.is_current_script_file() {
                    log::debug!("{} ignored: current document is not a script", action);
                    return None;
                }
                let op = if action == Action::Run {
                    ScriptOp::Run
                } else {
                    ScriptOp::RunExternal
                };
                Some(self.run_op(op))
            }
            Action::Debug => Some(self.run_op(ScriptOp::Debug)),
            Action::NextFileLocation => {
                self.panels.navigate_output(true);
                None
            }
            Action::PreviousFileLocation => {
                self.panels.navigate_output(false);
                None
            }
            Action::ToggleProjectPanel => self.toggle_panel(PanelKind::Project),
            Action::ToggleOutputPanel => self.toggle_panel(PanelKind::Output),
            Action::ToggleCodeMapPanel => self.toggle_panel(PanelKind::CodeMap),
            Action::ToggleSecondaryPanels => {
                self.panels.toggle_secondary_panels();
                self.sync_panel_checks();
                None
            }
            Action::CheckForUpdates => {
                self.check_for_updates_now(today());
                None
            }
        }
    }

    fn run_op(&mut self, op: ScriptOp) -> RunRequest {
        let panels = &mut self.panels;
        let request = self.processes.execute(op, self.project.as_mut(), || {
            panels.ensure_panel(PanelKind::Project);
        });
        if matches!(request, RunRequest::Started { .. }) && op != ScriptOp::RunExternal {
            self.panels.show_panel(PanelKind::Output);
        }
        self.sync_panel_checks();
        request
    }

    fn toggle_panel(&mut self, kind: PanelKind) -> Option<RunRequest> {
        let visible = self.panels.toggle_panel(kind);
        self.menu.set_checked(CommandMenu::panel_action(kind), visible);
        None
    }

    fn sync_panel_checks(&mut self) {
        for kind in PanelKind::ALL {
            let visible = self.panels.is_visible(kind);
            self.menu.set_checked(CommandMenu::panel_action(kind), visible);
        }
    }

    fn check_for_updates_now(&mut self, today: NaiveDate) -> bool {
        let Some(checker) = &self.updates else {
            log::info!("Update checking is not configured");
            return false;
        };
        self.update_worker = Some(checker.start_forced(&self.config, today));
        true
    }
}

/// The plugin, wired to a host through a key hook and a panel host.
pub struct Plugin<H: KeyHook> {
    interceptor: KeyInterceptor<H, PluginCore>,
    core: PluginCore,
    subscription: Option<SubscriptionId>,
}

impl<H: KeyHook> Plugin<H> {
    pub fn new(
        config: ConfigHandle,
        hook: H,
        panel_host: Box<dyn PanelHost>,
        project: Box<dyn CurrentProject>,
    ) -> Self {
        let snapshot = config.snapshot();
        let menu = CommandMenu::standard(&snapshot);
        let dispatcher = CommandDispatcher::from_keybindings(&snapshot.keybindings);
        let panels = PanelCoordinator::new(panel_host, menu.panel_ids());

        Self {
            interceptor: KeyInterceptor::new(hook),
            core: PluginCore {
                config,
                dispatcher,
                menu,
                panels,
                processes: ProcessManager::new(),
                project,
                updates: None,
                update_worker: None,
            },
            subscription: None,
        }
    }

    pub fn with_update_checker(mut self, checker: UpdateChecker) -> Self {
        self.core.updates = Some(checker);
        self
    }

    /// Install the key hook and subscribe the shortcut dispatcher.
    ///
    /// Safe to call more than once: the hook is installed and the dispatcher
    /// subscribed only the first time.
    pub fn command_menu_init(&mut self) -> Result<(), HookError> {
        self.interceptor.install()?;
        self.interceptor
            .set_watched(self.core.dispatcher.watched_keys());
        if self.subscription.is_none() {
            let id = self
                .interceptor
                .subscribe(|event, core: &mut PluginCore| core.on_shortcut(event));
            self.subscription = Some(id);
        }
        log::info!(
            "Plugin initialized: {} menu items, {} shortcuts, watching {:?}",
            self.core.menu.len(),
            self.core.dispatcher.registry().len(),
            self.interceptor
                .watched()
                .map(|key| key.to_string())
                .collect::<Vec<_>>()
        );
        Ok(())
    }

    /// Host finished starting: restore panels, then start the daily update check.
    pub fn on_ready(&mut self, today: NaiveDate) -> Option<CheckDecision> {
        let snapshot = self.core.config.snapshot();
        self.core.panels.restore_visibility(&snapshot);
        self.core.sync_panel_checks();

        let checker = self.core.updates.as_ref()?;
        let (decision, worker) = checker.start_on_startup(&self.core.config, today);
        log::info!("Startup update check: {:?}", decision);
        if worker.is_some() {
            self.core.update_worker = worker;
        }
        Some(decision)
    }

    /// Host is closing: persist panel visibility and release the key hook.
    pub fn on_shutdown(&mut self) -> anyhow::Result<()> {
        {
            let mut config = self.core.config.lock();
            self.core.panels.persist_visibility(&mut config);
            self.core.config.save_guarded(&config)?;
        }
        self.interceptor.uninstall();
        log::info!("Plugin shut down");
        Ok(())
    }

    /// The focused document changed.
    pub fn on_current_file_changed(&mut self, path: Option<PathBuf>) {
        self.core.project.set_current_document(path);
        self.core.panels.refresh(PanelKind::CodeMap);
    }

    /// Raw key-down from the host. Returns `true` when the plugin handled it
    /// and the host must not.
    pub fn on_key_down(&mut self, key: KeyCode, repeat_count: u32) -> bool {
        self.interceptor.key_down(key, repeat_count, &mut self.core)
    }

    /// Menu item clicked. Returns whether the index named a command.
    pub fn invoke_menu_command(&mut self, index: usize) -> bool {
        match self.core.menu.action_at(index) {
            Some(action) => {
                self.core.execute(action, Trigger::Menu);
                true
            }
            None => false,
        }
    }

    pub fn execute(&mut self, action: Action, trigger: Trigger) -> Option<RunRequest> {
        self.core.execute(action, trigger)
    }

    /// Check for updates now, ignoring the startup flag and today's date.
    pub fn check_for_updates_now(&mut self, today: NaiveDate) -> bool {
        self.core.check_for_updates_now(today)
    }

    /// Apply queued process events on the calling (UI) thread.
    pub fn pump_events(&mut self) -> Vec<ProcessEvent> {
        let events = self.core.processes.pump();
        for event in &events {
            self.forward_event(event);
        }
        events
    }

    /// Pump until no script is running or `timeout` passes. Returns whether
    /// the slot is idle.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.core.processes.is_running() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            if let Some(event) = self.core.processes.wait_event(remaining) {
                self.forward_event(&event);
            }
        }
        // Stray events of processes no longer tracked
        self.pump_events();
        true
    }

    fn forward_event(&mut self, event: &ProcessEvent) {
        match event {
            ProcessEvent::Output { pid, stream, line } => {
                let text = match stream {
                    OutputStream::Stdout => format!("{}: {}", pid, line),
                    OutputStream::Stderr => format!("{}: error: {}", pid, line),
                };
                if !self.core.panels.write_output(&text) {
                    log::debug!("No output panel for: {}", text);
                }
            }
            ProcessEvent::Exited { pid, code } => {
                let code = code.map_or_else(|| "none".to_string(), |c| c.to_string());
                self.core
                    .panels
                    .write_output(&format!("Script {} exited with code {}", pid, code));
            }
        }
    }

    /// Kill the running script, if the plugin started it.
    pub fn stop_script(&mut self) -> bool {
        self.core.processes.stop()
    }

    /// Hand over the worker of the last scheduled update check.
    pub fn take_update_worker(&mut self) -> Option<JoinHandle<UpdateOutcome>> {
        self.core.update_worker.take()
    }

    pub fn is_running(&self) -> bool {
        self.core.processes.is_running()
    }

    pub fn status(&self) -> ProcessStatus {
        self.core.processes.status()
    }

    pub fn processes_mut(&mut self) -> &mut ProcessManager {
        &mut self.core.processes
    }

    pub fn config(&self) -> &ConfigHandle {
        &self.core.config
    }

    pub fn menu(&self) -> &CommandMenu {
        &self.core.menu
    }

    pub fn dispatcher(&self) -> &CommandDispatcher {
        &self.core.dispatcher
    }

    pub fn panels(&self) -> &PanelCoordinator {
        &self.core.panels
    }

    pub fn interceptor(&self) -> &KeyInterceptor<H, PluginCore> {
        &self.interceptor
    }

    pub fn interceptor_mut(&mut self) -> &mut KeyInterceptor<H, PluginCore> {
        &mut self.interceptor
    }
}
