//! The current-project collaborator and its default implementation.

use crate::process::{LaunchedScript, ScriptRunner};
use anyhow::{Context, Result, bail};
use scriptdock_config::RunnerConfig;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// What the plugin needs from "the current project".
pub trait CurrentProject: ScriptRunner {
    /// Whether the document focused in the editor is a runnable script.
    fn is_current_script_file(&self) -> bool;

    /// Make the focused document the project's primary script.
    fn load_current_document(&mut self) -> Result<()>;

    /// The host reports a new focused document.
    fn set_current_document(&mut self, _path: Option<PathBuf>) {}
}

/// Runs scripts through the configured interpreter.
///
/// The primary script is the document last loaded with
/// [`load_current_document`](CurrentProject::load_current_document), falling
/// back to the focused document.
#[derive(Debug, Clone)]
pub struct ScriptProject {
    runner: RunnerConfig,
    current_document: Option<PathBuf>,
    primary_script: Option<PathBuf>,
}

impl ScriptProject {
    pub fn new(runner: RunnerConfig) -> Self {
        Self {
            runner,
            current_document: None,
            primary_script: None,
        }
    }

    pub fn runner(&self) -> &RunnerConfig {
        &self.runner
    }

    pub fn current_document(&self) -> Option<&Path> {
        self.current_document.as_deref()
    }

    pub fn primary_script(&self) -> Option<&Path> {
        self.primary_script.as_deref()
    }

    fn is_script(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.runner.is_script_extension(ext))
    }

    fn script(&self) -> Result<&Path> {
        self.primary_script
            .as_deref()
            .or(self.current_document.as_deref())
            .context("No script loaded and no document open")
    }

    /// Interpreter command line for `script`, with optional debugger arguments.
    pub fn interpreter_command(&self, script: &Path, debug: bool) -> Command {
        let mut cmd = Command::new(&self.runner.interpreter);
        if debug {
            cmd.args(&self.runner.debug_args);
        }
        cmd.args(&self.runner.args).arg(script);
        cmd
    }

    /// Command line for running `script` outside the editor.
    pub fn external_command(&self, script: &Path) -> Command {
        let Some((launcher, launcher_args)) = self.runner.external_launcher.split_first() else {
            return self.interpreter_command(script, false);
        };
        let mut cmd = Command::new(launcher);
        cmd.args(launcher_args)
            .arg(&self.runner.interpreter)
            .args(&self.runner.args)
            .arg(script);
        cmd
    }

    fn spawn_captured(&self, debug: bool) -> Result<LaunchedScript> {
        let script = self.script()?;
        let child = self
            .interpreter_command(script, debug)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| {
                format!(
                    "Failed to start '{}' for {}",
                    self.runner.interpreter,
                    script.display()
                )
            })?;
        Ok(LaunchedScript::new(child))
    }
}

impl ScriptRunner for ScriptProject {
    fn build(&mut self) -> Result<()> {
        let script = self.script()?;
        if !script.is_file() {
            bail!("Script not found: {}", script.display());
        }
        if !self.is_script(script) {
            bail!("Not a script file: {}", script.display());
        }
        File::open(script).with_context(|| format!("Cannot read {}", script.display()))?;
        log::info!("Validated {}", script.display());
        Ok(())
    }

    fn run(&mut self) -> Result<LaunchedScript> {
        self.spawn_captured(false)
    }

    fn run_external(&mut self) -> Result<LaunchedScript> {
        let script = self.script()?;
        let child = self
            .external_command(script)
            .spawn()
            .with_context(|| format!("Failed to start {} externally", script.display()))?;
        Ok(LaunchedScript::new(child))
    }

    fn debug(&mut self) -> Result<LaunchedScript> {
        self.spawn_captured(true)
    }
}

impl CurrentProject for ScriptProject {
    fn is_current_script_file(&self) -> bool {
        self.current_document
            .as_deref()
            .is_some_and(|path| self.is_script(path))
    }

    fn load_current_document(&mut self) -> Result<()> {
        let document = self
            .current_document
            .clone()
            .context("No document is open")?;
        log::info!("Loaded {} into the project", document.display());
        self.primary_script = Some(document);
        Ok(())
    }

    fn set_current_document(&mut self, path: Option<PathBuf>) {
        self.current_document = path;
    }
}
