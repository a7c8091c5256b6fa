//! Starting a downloaded installer and opening the release page.

use std::path::Path;
use std::process::Command;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("installer not found: {0}")]
    NotFound(String),
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to open '{url}': {source}")]
    Open {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

/// Starts installers and opens URLs on behalf of the update checker.
pub trait InstallerLauncher: Send + Sync {
    /// Start the installer without waiting for it to finish.
    fn launch_installer(&self, installer: &Path) -> Result<(), LaunchError>;

    /// Open `url` in the user's browser.
    fn open_url(&self, url: &str) -> Result<(), LaunchError>;
}

/// Launcher using the operating system's own facilities.
///
/// `.msi` packages run through `msiexec /i <path> /qb` (basic UI). Anything
/// else is opened with the platform handler for its file type.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

/// Program and arguments used to start `installer`, or `None` when the file
/// should go through the platform opener.
pub fn installer_command(installer: &Path) -> Option<(String, Vec<String>)> {
    let is_msi = installer
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("msi"));
    is_msi.then(|| {
        (
            "msiexec".to_string(),
            vec![
                "/i".to_string(),
                installer.to_string_lossy().into_owned(),
                "/qb".to_string(),
            ],
        )
    })
}

impl InstallerLauncher for SystemLauncher {
    fn launch_installer(&self, installer: &Path) -> Result<(), LaunchError> {
        if !installer.exists() {
            return Err(LaunchError::NotFound(installer.display().to_string()));
        }

        match installer_command(installer) {
            Some((program, args)) => {
                log::info!("Starting {} {}", program, args.join(" "));
                Command::new(&program)
                    .args(&args)
                    .spawn()
                    .map(|_| ())
                    .map_err(|source| LaunchError::Spawn { program, source })
            }
            None => open::that_detached(installer).map_err(|source| LaunchError::Spawn {
                program: installer.display().to_string(),
                source,
            }),
        }
    }

    fn open_url(&self, url: &str) -> Result<(), LaunchError> {
        open::that(url).map_err(|source| LaunchError::Open {
            url: url.to_string(),
            source,
        })
    }
}
