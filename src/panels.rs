//! Dockable panel coordination.
//!
//! The plugin owns three singleton panels (project, output and code map). The
//! host editor does the actual docking; [`PanelCoordinator`] only decides when
//! a panel is created, shown or hidden, and remembers visibility across
//! sessions through the config.

use scriptdock_config::Config;
use std::fmt;

/// The three plugin panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelKind {
    Project,
    Output,
    CodeMap,
}

impl PanelKind {
    pub const ALL: [PanelKind; 3] = [PanelKind::Project, PanelKind::Output, PanelKind::CodeMap];

    fn slot(self) -> usize {
        match self {
            PanelKind::Project => 0,
            PanelKind::Output => 1,
            PanelKind::CodeMap => 2,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            PanelKind::Project => "Project",
            PanelKind::Output => "Output",
            PanelKind::CodeMap => "Code Map",
        }
    }

    pub fn dock(self) -> DockSide {
        match self {
            PanelKind::Project => DockSide::Left,
            PanelKind::Output => DockSide::Bottom,
            PanelKind::CodeMap => DockSide::Right,
        }
    }
}

impl fmt::Display for PanelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Where the host should dock a panel when it is first created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockSide {
    Left,
    Right,
    Bottom,
}

/// Stable panel IDs, allocated from the command menu indices at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelIds {
    pub project: usize,
    pub output: usize,
    pub code_map: usize,
}

impl PanelIds {
    pub fn get(&self, kind: PanelKind) -> usize {
        match kind {
            PanelKind::Project => self.project,
            PanelKind::Output => self.output,
            PanelKind::CodeMap => self.code_map,
        }
    }
}

/// What the host needs to create a panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelDescriptor {
    pub kind: PanelKind,
    pub id: usize,
    pub title: &'static str,
    pub dock: DockSide,
}

/// Opaque host handle for a created panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PanelHandle(pub u64);

/// The editor's panel-docking subsystem.
pub trait PanelHost {
    /// Create the panel described by `descriptor` (or show it if the host
    /// already has it) and return its handle.
    fn create_or_show(&mut self, descriptor: &PanelDescriptor) -> PanelHandle;

    fn set_visible(&mut self, handle: PanelHandle, id: usize, visible: bool);

    fn is_visible(&self, handle: PanelHandle) -> bool;

    /// Rebuild the panel's content from the current document.
    fn refresh_content(&mut self, _handle: PanelHandle) {}

    /// Move to the next (or previous) file reference listed in the panel.
    /// Returns whether a reference was found.
    fn navigate_file_reference(&mut self, _handle: PanelHandle, _forward: bool) -> bool {
        false
    }

    /// Append a line of script output to the panel.
    fn write_output(&mut self, _handle: PanelHandle, _text: &str) {}
}

/// Lazily creates and shows the plugin panels.
pub struct PanelCoordinator {
    host: Box<dyn PanelHost>,
    ids: PanelIds,
    handles: [Option<PanelHandle>; 3],
}

impl PanelCoordinator {
    pub fn new(host: Box<dyn PanelHost>, ids: PanelIds) -> Self {
        Self {
            host,
            ids,
            handles: [None; 3],
        }
    }

    pub fn ids(&self) -> PanelIds {
        self.ids
    }

    pub fn descriptor(&self, kind: PanelKind) -> PanelDescriptor {
        PanelDescriptor {
            kind,
            id: self.ids.get(kind),
            title: kind.title(),
            dock: kind.dock(),
        }
    }

    /// Handle of the panel, if it has been created.
    pub fn handle(&self, kind: PanelKind) -> Option<PanelHandle> {
        self.handles[kind.slot()]
    }

    pub fn is_created(&self, kind: PanelKind) -> bool {
        self.handle(kind).is_some()
    }

    /// Whether the panel exists and the host reports it visible.
    pub fn is_visible(&self, kind: PanelKind) -> bool {
        self.handle(kind)
            .is_some_and(|handle| self.host.is_visible(handle))
    }

    /// Create the panel on first use, otherwise make the cached one visible.
    pub fn show_panel(&mut self, kind: PanelKind) -> PanelHandle {
        match self.handle(kind) {
            Some(handle) => {
                self.host.set_visible(handle, self.ids.get(kind), true);
                handle
            }
            None => {
                let descriptor = self.descriptor(kind);
                let handle = self.host.create_or_show(&descriptor);
                log::info!("Created {} panel (id {})", kind, descriptor.id);
                self.handles[kind.slot()] = Some(handle);
                handle
            }
        }
    }

    /// Create the panel if missing, leaving an existing one as it is.
    pub fn ensure_panel(&mut self, kind: PanelKind) -> PanelHandle {
        match self.handle(kind) {
            Some(handle) => handle,
            None => self.show_panel(kind),
        }
    }

    pub fn hide_panel(&mut self, kind: PanelKind) {
        if let Some(handle) = self.handle(kind) {
            self.host.set_visible(handle, self.ids.get(kind), false);
        }
    }

    /// Flip visibility. Returns the new state.
    pub fn toggle_panel(&mut self, kind: PanelKind) -> bool {
        if self.is_visible(kind) {
            self.hide_panel(kind);
            false
        } else {
            self.show_panel(kind);
            true
        }
    }

    /// Cycle the output and code-map panels:
    ///
    /// | output  | code map | result                |
    /// |---------|----------|-----------------------|
    /// | hidden  | any      | show output           |
    /// | visible | hidden   | show code map         |
    /// | visible | visible  | show both again       |
    pub fn toggle_secondary_panels(&mut self) {
        if !self.is_visible(PanelKind::Output) {
            self.show_panel(PanelKind::Output);
        } else if !self.is_visible(PanelKind::CodeMap) {
            self.show_panel(PanelKind::CodeMap);
        } else {
            self.show_panel(PanelKind::Output);
            self.show_panel(PanelKind::CodeMap);
        }
    }

    /// Show the panels the last session left visible.
    pub fn restore_visibility(&mut self, config: &Config) {
        if config.show_project_panel {
            self.show_panel(PanelKind::Project);
        }
        if config.show_output_panel {
            self.show_panel(PanelKind::Output);
        }
        if config.show_code_map_panel {
            self.show_panel(PanelKind::CodeMap);
        }
    }

    /// Record current visibility into `config`. Panels never created count as hidden.
    pub fn persist_visibility(&self, config: &mut Config) {
        config.show_project_panel = self.is_visible(PanelKind::Project);
        config.show_output_panel = self.is_visible(PanelKind::Output);
        config.show_code_map_panel = self.is_visible(PanelKind::CodeMap);
    }

    /// Refresh the panel's content if it exists.
    pub fn refresh(&mut self, kind: PanelKind) -> bool {
        match self.handle(kind) {
            Some(handle) => {
                self.host.refresh_content(handle);
                true
            }
            None => false,
        }
    }

    /// Jump to the next or previous file reference in the output panel.
    pub fn navigate_output(&mut self, forward: bool) -> bool {
        match self.handle(PanelKind::Output) {
            Some(handle) => self.host.navigate_file_reference(handle, forward),
            None => false,
        }
    }

    /// Append a line to the output panel if it exists.
    pub fn write_output(&mut self, text: &str) -> bool {
        match self.handle(PanelKind::Output) {
            Some(handle) => {
                self.host.write_output(handle, text);
                true
            }
            None => false,
        }
    }
}
