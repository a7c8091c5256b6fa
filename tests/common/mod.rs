//! Shared integration test helpers for scriptdock.
//!
//! Provides recording fakes for the host collaborators (key hook, panel host,
//! current project) and a factory wiring them into a [`Plugin`].
//!
//! ```ignore
//! mod common;
//! use common::{TestPlugin, test_plugin};
//! ```

#![allow(dead_code)]

use anyhow::{Result, bail};
use scriptdock::{
    CurrentProject, LaunchedScript, PanelDescriptor, PanelHandle, PanelHost, Plugin, ScriptRunner,
};
use scriptdock_config::{Config, ConfigHandle};
use scriptdock_keybindings::{HookError, KeyHook, Modifiers};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::rc::Rc;

// ---------------------------------------------------------------------------
// Key hook
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeHook {
    pub modifiers: Modifiers,
    pub installs: u32,
}

impl KeyHook for FakeHook {
    fn install(&mut self) -> Result<(), HookError> {
        self.installs += 1;
        Ok(())
    }

    fn uninstall(&mut self) {}

    fn modifiers(&self) -> Modifiers {
        self.modifiers
    }
}

// ---------------------------------------------------------------------------
// Panel host
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct HostState {
    /// `(id, title)` of every create call
    pub created: Vec<(usize, String)>,
    pub visible: HashMap<u64, bool>,
    pub refreshed: Vec<u64>,
    /// `true` for next, `false` for previous
    pub navigations: Vec<bool>,
    pub output: Vec<String>,
}

pub struct RecordingHost(pub Rc<RefCell<HostState>>);

impl PanelHost for RecordingHost {
    fn create_or_show(&mut self, descriptor: &PanelDescriptor) -> PanelHandle {
        let mut state = self.0.borrow_mut();
        state
            .created
            .push((descriptor.id, descriptor.title.to_string()));
        let handle = 1000 + descriptor.id as u64;
        state.visible.insert(handle, true);
        PanelHandle(handle)
    }

    fn set_visible(&mut self, handle: PanelHandle, _id: usize, visible: bool) {
        self.0.borrow_mut().visible.insert(handle.0, visible);
    }

    fn is_visible(&self, handle: PanelHandle) -> bool {
        self.0.borrow().visible.get(&handle.0).copied().unwrap_or(false)
    }

    fn refresh_content(&mut self, handle: PanelHandle) {
        self.0.borrow_mut().refreshed.push(handle.0);
    }

    fn navigate_file_reference(&mut self, _handle: PanelHandle, forward: bool) -> bool {
        self.0.borrow_mut().navigations.push(forward);
        true
    }

    fn write_output(&mut self, _handle: PanelHandle, text: &str) {
        self.0.borrow_mut().output.push(text.to_string());
    }
}

// ---------------------------------------------------------------------------
// Current project
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct ProjectState {
    /// Names of runner operations invoked, in order
    pub calls: Vec<&'static str>,
    pub script_file: bool,
    pub document: Option<PathBuf>,
    /// Program and arguments spawned by run/debug; `None` makes them fail
    pub command: Option<(String, Vec<String>)>,
}

pub struct FakeProject(pub Rc<RefCell<ProjectState>>);

impl FakeProject {
    fn launch(&self, op: &'static str) -> Result<LaunchedScript> {
        let mut state = self.0.borrow_mut();
        state.calls.push(op);
        let Some((program, args)) = state.command.clone() else {
            bail!("no command configured for {}", op);
        };
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        Ok(LaunchedScript::new(child))
    }
}

impl ScriptRunner for FakeProject {
    fn build(&mut self) -> Result<()> {
        self.0.borrow_mut().calls.push("build");
        Ok(())
    }

    fn run(&mut self) -> Result<LaunchedScript> {
        self.launch("run")
    }

    fn run_external(&mut self) -> Result<LaunchedScript> {
        self.launch("run_external")
    }

    fn debug(&mut self) -> Result<LaunchedScript> {
        self.launch("debug")
    }
}

impl CurrentProject for FakeProject {
    fn is_current_script_file(&self) -> bool {
        self.0.borrow().script_file
    }

    fn load_current_document(&mut self) -> Result<()> {
        self.0.borrow_mut().calls.push("load_current_document");
        Ok(())
    }

    fn set_current_document(&mut self, path: Option<PathBuf>) {
        self.0.borrow_mut().document = path;
    }
}

// ---------------------------------------------------------------------------
// Plugin factory
// ---------------------------------------------------------------------------

pub struct TestPlugin {
    pub plugin: Plugin<FakeHook>,
    pub host: Rc<RefCell<HostState>>,
    pub project: Rc<RefCell<ProjectState>>,
}

/// Plugin over an in-memory config, with the key hook installed.
pub fn test_plugin(config: Config) -> TestPlugin {
    test_plugin_with_handle(ConfigHandle::in_memory(config))
}

pub fn test_plugin_with_handle(config: ConfigHandle) -> TestPlugin {
    let host = Rc::new(RefCell::new(HostState::default()));
    let project = Rc::new(RefCell::new(ProjectState {
        script_file: true,
        ..Default::default()
    }));
    let mut plugin = Plugin::new(
        config,
        FakeHook::default(),
        Box::new(RecordingHost(Rc::clone(&host))),
        Box::new(FakeProject(Rc::clone(&project))),
    );
    plugin
        .command_menu_init()
        .expect("fake hook always installs");
    TestPlugin {
        plugin,
        host,
        project,
    }
}

/// `sh -c <script>` as a project command.
pub fn shell(script: &str) -> Option<(String, Vec<String>)> {
    Some((
        "sh".to_string(),
        vec!["-c".to_string(), script.to_string()],
    ))
}

