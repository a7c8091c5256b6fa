//! Console stand-ins for the host editor, used by the command-line harness.

use crate::panels::{PanelDescriptor, PanelHandle, PanelHost};
use scriptdock_update::UpdatePrompt;
use std::collections::HashMap;
use std::io::{self, BufRead, Write};

/// Panel host that keeps visibility in memory and prints output lines.
#[derive(Debug, Default)]
pub struct ConsolePanelHost {
    next_handle: u64,
    visible: HashMap<PanelHandle, bool>,
}

impl ConsolePanelHost {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PanelHost for ConsolePanelHost {
    fn create_or_show(&mut self, descriptor: &PanelDescriptor) -> PanelHandle {
        self.next_handle += 1;
        let handle = PanelHandle(self.next_handle);
        self.visible.insert(handle, true);
        log::debug!(
            "Console panel '{}' (id {}, {:?})",
            descriptor.title,
            descriptor.id,
            descriptor.dock
        );
        handle
    }

    fn set_visible(&mut self, handle: PanelHandle, _id: usize, visible: bool) {
        self.visible.insert(handle, visible);
    }

    fn is_visible(&self, handle: PanelHandle) -> bool {
        self.visible.get(&handle).copied().unwrap_or(false)
    }

    fn write_output(&mut self, _handle: PanelHandle, text: &str) {
        println!("{}", text);
    }
}

/// Yes/no prompt on stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsolePrompt;

impl UpdatePrompt for ConsolePrompt {
    fn confirm(&self, title: &str, message: &str) -> bool {
        println!("[{}] {}", title, message);
        print!("[y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut response = String::new();
        if io::stdin().lock().read_line(&mut response).is_err() {
            return false;
        }
        matches!(response.trim().to_lowercase().as_str(), "y" | "yes")
    }

    fn show_error(&self, title: &str, message: &str) {
        eprintln!("[{}] {}", title, message);
    }
}
