//! Single-flight script process lifecycle.
//!
//! [`ProcessManager`] owns the "running script" slot. At most one script
//! child runs at a time; build, run, run-external and debug requests made
//! while the slot is occupied are rejected without calling the runner.
//!
//! Child exits are observed on a watcher thread and sent back over a channel,
//! after every output line of the child. They only take effect when the owner drains the channel with
//! [`ProcessManager::pump`] on the UI thread. The slot and the status prefix
//! live in one [`RunState`] and are always written together, so observers
//! never see one without the other.

use parking_lot::Mutex;
use std::io::{BufRead, BufReader, Read};
use std::process::Child;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::thread::JoinHandle;
use std::time::Duration;

/// Poll interval of the exit watcher thread.
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// The operations a project can perform on its script.
///
/// Hosts that want different behavior provide their own implementation.
pub trait ScriptRunner {
    /// Validate the script without running it.
    fn build(&mut self) -> anyhow::Result<()>;

    /// Start the script with its output captured.
    fn run(&mut self) -> anyhow::Result<LaunchedScript>;

    /// Start the script in its own console, output not captured.
    fn run_external(&mut self) -> anyhow::Result<LaunchedScript>;

    /// Start the script under the debugger.
    fn debug(&mut self) -> anyhow::Result<LaunchedScript>;
}

/// A child process handed over to the manager.
pub struct LaunchedScript {
    child: Child,
}

impl LaunchedScript {
    pub fn new(child: Child) -> Self {
        Self { child }
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }
}

/// Which runner operation a request maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptOp {
    Build,
    Run,
    RunExternal,
    Debug,
}

/// Result of a lifecycle request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunRequest {
    /// Another script is running; nothing was done
    Rejected,
    /// The build finished
    Built,
    /// A child process started
    Started { pid: u32 },
    /// The runner reported an error
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// Notifications from script children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    Output {
        pid: u32,
        stream: OutputStream,
        line: String,
    },
    Exited {
        pid: u32,
        code: Option<i32>,
    },
}

/// The running-script slot together with the status prefix derived from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunState {
    running: Option<u32>,
    prefix: String,
}

impl RunState {
    pub fn running(&self) -> Option<u32> {
        self.running
    }

    /// `"<pid>: "` while a script runs, empty when idle.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn is_idle(&self) -> bool {
        self.running.is_none()
    }

    fn set_running(&mut self, pid: Option<u32>) {
        self.running = pid;
        self.prefix = match pid {
            Some(pid) => format!("{}: ", pid),
            None => String::new(),
        };
    }
}

/// Read-only view of the running-script state for status displays.
#[derive(Debug, Clone)]
pub struct ProcessStatus(Arc<Mutex<RunState>>);

impl ProcessStatus {
    /// Consistent copy of slot and prefix.
    pub fn snapshot(&self) -> RunState {
        self.0.lock().clone()
    }

    pub fn running_pid(&self) -> Option<u32> {
        self.0.lock().running
    }

    pub fn prefix(&self) -> String {
        self.0.lock().prefix.clone()
    }
}

/// Sender for exit notifications from an external process watcher.
#[derive(Debug, Clone)]
pub struct ExitNotifier(Sender<ProcessEvent>);

impl ExitNotifier {
    pub fn notify_exit(&self, pid: u32, code: Option<i32>) {
        let _ = self.0.send(ProcessEvent::Exited { pid, code });
    }
}

/// Owner of the running-script slot.
pub struct ProcessManager {
    state: Arc<Mutex<RunState>>,
    child: Option<Arc<Mutex<Child>>>,
    events_tx: Sender<ProcessEvent>,
    events_rx: Receiver<ProcessEvent>,
}

impl Default for ProcessManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessManager {
    pub fn new() -> Self {
        let (events_tx, events_rx) = channel();
        Self {
            state: Arc::new(Mutex::new(RunState::default())),
            child: None,
            events_tx,
            events_rx,
        }
    }

    pub fn status(&self) -> ProcessStatus {
        ProcessStatus(Arc::clone(&self.state))
    }

    pub fn exit_notifier(&self) -> ExitNotifier {
        ExitNotifier(self.events_tx.clone())
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().running.is_some()
    }

    pub fn running_pid(&self) -> Option<u32> {
        self.state.lock().running
    }

    /// Perform `op` unless a script is already running.
    ///
    /// `prepare` runs after the gate passes and before the runner is called.
    pub fn execute<R: ScriptRunner + ?Sized>(
        &mut self,
        op: ScriptOp,
        runner: &mut R,
        prepare: impl FnOnce(),
    ) -> RunRequest {
        if let Some(pid) = self.running_pid() {
            log::info!("Ignoring {:?}: script {} is still running", op, pid);
            return RunRequest::Rejected;
        }

        prepare();

        let launched = match op {
            ScriptOp::Build => {
                return match runner.build() {
                    Ok(()) => {
                        log::info!("Build succeeded");
                        RunRequest::Built
                    }
                    Err(e) => {
                        log::warn!("Build failed: {:#}", e);
                        RunRequest::Failed(format!("{:#}", e))
                    }
                };
            }
            ScriptOp::Run => runner.run(),
            ScriptOp::RunExternal => runner.run_external(),
            ScriptOp::Debug => runner.debug(),
        };

        match launched {
            Ok(script) => {
                let pid = self.attach(script);
                RunRequest::Started { pid }
            }
            Err(e) => {
                log::warn!("{:?} failed to start: {:#}", op, e);
                RunRequest::Failed(format!("{:#}", e))
            }
        }
    }

    /// Take ownership of a started child and occupy the slot.
    pub fn attach(&mut self, script: LaunchedScript) -> u32 {
        let mut child = script.child;
        let pid = child.id();

        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_reader(
                pid,
                OutputStream::Stdout,
                stdout,
                self.events_tx.clone(),
            ));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_reader(
                pid,
                OutputStream::Stderr,
                stderr,
                self.events_tx.clone(),
            ));
        }

        let child = Arc::new(Mutex::new(child));
        spawn_exit_watcher(pid, Arc::clone(&child), readers, self.events_tx.clone());
        self.child = Some(child);

        self.state.lock().set_running(Some(pid));
        log::info!("Script started (pid {})", pid);
        pid
    }

    /// Occupy the slot for a process started and watched elsewhere.
    ///
    /// Its exit must be reported through [`ExitNotifier`].
    pub fn attach_external(&mut self, pid: u32) {
        self.child = None;
        self.state.lock().set_running(Some(pid));
        log::info!("Tracking external script (pid {})", pid);
    }

    /// Kill the running child. The slot clears once its exit is pumped.
    pub fn stop(&mut self) -> bool {
        let Some(child) = &self.child else {
            return false;
        };
        let mut child = child.lock();
        match child.kill() {
            Ok(()) => {
                log::info!("Stopped script (pid {})", child.id());
                true
            }
            Err(e) => {
                log::warn!("Failed to stop script (pid {}): {}", child.id(), e);
                false
            }
        }
    }

    /// Drain pending events, applying exits to the slot.
    pub fn pump(&mut self) -> Vec<ProcessEvent> {
        let events: Vec<ProcessEvent> = self.events_rx.try_iter().collect();
        for event in &events {
            self.apply(event);
        }
        events
    }

    /// Block up to `timeout` for the next event, applying it if it is an exit.
    pub fn wait_event(&mut self, timeout: Duration) -> Option<ProcessEvent> {
        match self.events_rx.recv_timeout(timeout) {
            Ok(event) => {
                self.apply(&event);
                Some(event)
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    fn apply(&mut self, event: &ProcessEvent) {
        let ProcessEvent::Exited { pid, code } = event else {
            return;
        };
        let mut state = self.state.lock();
        if state.running != Some(*pid) {
            log::debug!("Exit of untracked process {} ignored", pid);
            return;
        }
        state.set_running(None);
        drop(state);

        self.child = None;
        log::info!("Script exited (pid {}, code {:?})", pid, code);
    }
}

fn spawn_reader(
    pid: u32,
    stream: OutputStream,
    source: impl Read + Send + 'static,
    tx: Sender<ProcessEvent>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let reader = BufReader::new(source);
        for line in reader.lines() {
            match line {
                Ok(line) => {
                    if tx.send(ProcessEvent::Output { pid, stream, line }).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    log::warn!("Error reading {:?} of script {}: {}", stream, pid, e);
                    break;
                }
            }
        }
    })
}

/// Waits for the child, then for its readers to hit end of stream, and only
/// then reports the exit. Output lines therefore always precede `Exited` in
/// the channel.
fn spawn_exit_watcher(
    pid: u32,
    child: Arc<Mutex<Child>>,
    readers: Vec<JoinHandle<()>>,
    tx: Sender<ProcessEvent>,
) {
    std::thread::spawn(move || {
        let code = loop {
            let status = child.lock().try_wait();
            match status {
                Ok(Some(status)) => break status.code(),
                Ok(None) => std::thread::sleep(EXIT_POLL_INTERVAL),
                Err(e) => {
                    log::warn!("Lost track of script {}: {}", pid, e);
                    break None;
                }
            }
        };

        for reader in readers {
            if reader.join().is_err() {
                log::warn!("Output reader of script {} panicked", pid);
            }
        }
        let _ = tx.send(ProcessEvent::Exited { pid, code });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_follows_slot() {
        let mut state = RunState::default();
        assert!(state.is_idle());
        assert_eq!(state.prefix(), "");

        state.set_running(Some(4242));
        assert_eq!(state.running(), Some(4242));
        assert_eq!(state.prefix(), "4242: ");

        state.set_running(None);
        assert!(state.is_idle());
        assert_eq!(state.prefix(), "");
    }

    #[test]
    fn test_external_exit_notification() {
        let mut manager = ProcessManager::new();
        let status = manager.status();
        manager.attach_external(77);
        assert_eq!(status.prefix(), "77: ");

        // A stale exit for another pid leaves the slot alone
        manager.exit_notifier().notify_exit(12, Some(0));
        manager.pump();
        assert_eq!(status.running_pid(), Some(77));

        manager.exit_notifier().notify_exit(77, Some(0));
        let events = manager.pump();
        assert_eq!(events.len(), 1);
        assert_eq!(status.snapshot(), RunState::default());
    }

    #[cfg(unix)]
    #[test]
    fn test_output_precedes_exit() {
        let child = std::process::Command::new("sh")
            .args(["-c", "i=0; while [ $i -lt 200 ]; do echo line$i; i=$((i+1)); done"])
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .spawn()
            .unwrap();
        let mut manager = ProcessManager::new();
        let pid = manager.attach(LaunchedScript::new(child));

        let mut lines = 0;
        loop {
            match manager.wait_event(Duration::from_secs(10)) {
                Some(ProcessEvent::Output { .. }) => lines += 1,
                Some(ProcessEvent::Exited { pid: exited, code }) => {
                    assert_eq!(exited, pid);
                    assert_eq!(code, Some(0));
                    break;
                }
                None => panic!("no exit within timeout"),
            }
        }
        assert_eq!(lines, 200);
        assert!(manager.pump().is_empty());
        assert!(!manager.is_running());
    }

    #[test]
    fn test_stop_without_child() {
        let mut manager = ProcessManager::new();
        assert!(!manager.stop());
        manager.attach_external(5);
        assert!(!manager.stop());
    }
}
