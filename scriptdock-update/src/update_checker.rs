//! Daily update checking for scriptdock.
//!
//! On each startup the checker decides, under the config lock, whether a check
//! is due today. If it is, today's date is written to the config before any
//! network access and the rest of the workflow runs on a background thread:
//!
//! 1. wait for the host to settle
//! 2. fetch the latest version string (absent -> stop silently)
//! 3. compare it with the running version (not older -> stop)
//! 4. ask the user to confirm the install (no -> stop)
//! 5. fetch the installer and launch it, or fall back to the release page
//!
//! Network failures degrade to "no update". Only the final launch failures
//! reach the user.

use crate::installer::InstallerLauncher;
use crate::version::{AppVersion, is_update_available};
use chrono::NaiveDate;
use parking_lot::Mutex;
use scriptdock_config::{Config, ConfigHandle, UpdateConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Title used for every user-facing update dialog.
pub const DIALOG_TITLE: &str = "scriptdock";

/// Source of release metadata.
///
/// Implementations report absence with `None`; they never fail loudly.
pub trait VersionSource: Send + Sync {
    /// Latest released version string, e.g. `"2.5.0.1"`.
    fn fetch_latest_version(&self) -> Option<String>;

    /// Local path of the installer for `version`, downloading it if needed.
    fn fetch_installer_location(&self, version: &str) -> Option<PathBuf>;
}

/// Blocking dialogs shown to the user.
pub trait UpdatePrompt: Send + Sync {
    /// Yes/no question. Returns `true` on "yes".
    fn confirm(&self, title: &str, message: &str) -> bool;

    /// Error notification.
    fn show_error(&self, title: &str, message: &str);
}

/// Outcome of the decision made at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckDecision {
    /// `check_updates_on_startup` is off
    Disabled,
    /// A check already ran today
    AlreadyCheckedToday,
    /// A background check was started
    Scheduled,
}

/// How a background check ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The version source returned nothing
    NoVersionInfo,
    /// The running version is current
    UpToDate { latest: String },
    /// The user answered "no"
    Declined { version: String },
    /// The installer process was started
    InstallerLaunched { version: String, installer: PathBuf },
    /// The installer could not be started
    InstallerFailed { version: String, installer: PathBuf },
    /// No installer was available; the release page was opened instead
    OpenedHomePage { version: String },
}

/// Runs the throttled update workflow.
#[derive(Clone)]
pub struct UpdateChecker {
    current_version: AppVersion,
    source: Arc<dyn VersionSource>,
    prompt: Arc<dyn UpdatePrompt>,
    launcher: Arc<dyn InstallerLauncher>,
    home_url: String,
    startup_delay: Duration,
    /// Last outcome (shared with the background thread for UI access)
    last_outcome: Arc<Mutex<Option<UpdateOutcome>>>,
}

impl UpdateChecker {
    /// Create a checker for the running `current_version`.
    pub fn new(
        current_version: AppVersion,
        source: Arc<dyn VersionSource>,
        prompt: Arc<dyn UpdatePrompt>,
        launcher: Arc<dyn InstallerLauncher>,
    ) -> Self {
        let defaults = UpdateConfig::default();
        Self {
            current_version,
            source,
            prompt,
            launcher,
            home_url: defaults.home_url,
            startup_delay: Duration::from_millis(defaults.startup_delay_ms),
            last_outcome: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_home_url(mut self, url: impl Into<String>) -> Self {
        self.home_url = url.into();
        self
    }

    pub fn with_startup_delay(mut self, delay: Duration) -> Self {
        self.startup_delay = delay;
        self
    }

    /// Take the home page and startup delay from the persisted settings.
    pub fn with_update_config(self, updates: &UpdateConfig) -> Self {
        self.with_home_url(updates.home_url.clone())
            .with_startup_delay(Duration::from_millis(updates.startup_delay_ms))
    }

    pub fn startup_delay(&self) -> Duration {
        self.startup_delay
    }

    pub fn home_url(&self) -> &str {
        &self.home_url
    }

    pub fn current_version(&self) -> AppVersion {
        self.current_version
    }

    pub fn last_outcome(&self) -> Option<UpdateOutcome> {
        self.last_outcome.lock().clone()
    }

    /// Whether the startup gate lets a check through on `today`.
    pub fn should_check(config: &Config, today: NaiveDate) -> bool {
        config.check_updates_on_startup && !config.checked_for_updates_on(today)
    }

    /// Startup entry point: at most one check per calendar day.
    ///
    /// The decision, the date update and the spawn happen while the config
    /// lock is held, so concurrent startup events cannot both schedule a
    /// check. Returns the decision and, when scheduled, the worker handle.
    pub fn start_on_startup(
        &self,
        config: &ConfigHandle,
        today: NaiveDate,
    ) -> (CheckDecision, Option<JoinHandle<UpdateOutcome>>) {
        let mut guard = config.lock();

        if !guard.check_updates_on_startup {
            log::debug!("Update checks on startup are disabled");
            return (CheckDecision::Disabled, None);
        }
        if guard.checked_for_updates_on(today) {
            log::debug!("Already checked for updates on {}", today);
            return (CheckDecision::AlreadyCheckedToday, None);
        }

        guard.mark_update_check(today);
        if let Err(e) = config.save_guarded(&guard) {
            log::warn!("Failed to save config after recording update check: {}", e);
        }

        let handle = self.spawn_check(self.startup_delay);
        (CheckDecision::Scheduled, Some(handle))
    }

    /// Check now regardless of the startup flag or today's date.
    pub fn start_forced(&self, config: &ConfigHandle, today: NaiveDate) -> JoinHandle<UpdateOutcome> {
        {
            let mut guard = config.lock();
            guard.mark_update_check(today);
            if let Err(e) = config.save_guarded(&guard) {
                log::warn!("Failed to save config after recording update check: {}", e);
            }
        }
        self.spawn_check(Duration::ZERO)
    }

    fn spawn_check(&self, delay: Duration) -> JoinHandle<UpdateOutcome> {
        let checker = self.clone();
        std::thread::spawn(move || {
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }
            checker.run_check()
        })
    }

    /// Steps 2-5 of the workflow, blocking the calling thread.
    pub fn run_check(&self) -> UpdateOutcome {
        let outcome = self.perform_check();
        log::info!("Update check finished: {:?}", outcome);
        *self.last_outcome.lock() = Some(outcome.clone());
        outcome
    }

    fn perform_check(&self) -> UpdateOutcome {
        let Some(version) = self.source.fetch_latest_version() else {
            log::info!("No release information available");
            return UpdateOutcome::NoVersionInfo;
        };

        if !is_update_available(&version, &self.current_version) {
            log::info!(
                "scriptdock is up to date ({} >= {})",
                self.current_version,
                version
            );
            return UpdateOutcome::UpToDate { latest: version };
        }

        log::info!(
            "Update available: {} (current: {})",
            version,
            self.current_version
        );
        if !self.prompt.confirm(DIALOG_TITLE, &confirmation_message(&version)) {
            return UpdateOutcome::Declined { version };
        }

        match self.source.fetch_installer_location(&version) {
            Some(installer) => self.launch_installer(version, installer),
            None => self.open_home_page(version),
        }
    }

    fn launch_installer(&self, version: String, installer: PathBuf) -> UpdateOutcome {
        match self.launcher.launch_installer(&installer) {
            Ok(()) => {
                log::info!("Installer started: {:?}", installer);
                UpdateOutcome::InstallerLaunched { version, installer }
            }
            Err(e) => {
                log::error!("Failed to start installer: {}", e);
                self.prompt
                    .show_error(DIALOG_TITLE, &launch_failure_message(&installer));
                UpdateOutcome::InstallerFailed { version, installer }
            }
        }
    }

    fn open_home_page(&self, version: String) -> UpdateOutcome {
        self.prompt.show_error(
            DIALOG_TITLE,
            "Cannot download the binaries. The latest release Web page will be opened instead.",
        );
        if let Err(e) = self.launcher.open_url(&self.home_url) {
            log::warn!("Failed to open {}: {}", self.home_url, e);
        }
        UpdateOutcome::OpenedHomePage { version }
    }
}

/// Text of the install confirmation dialog.
pub fn confirmation_message(version: &str) -> String {
    format!(
        "The newer version v{} is available.\n\
         Do you want to download and install it?\n\n\
         WARNING: If you choose 'Yes' the editor will be closed and all unsaved data may be lost.",
        version
    )
}

fn launch_failure_message(installer: &Path) -> String {
    format!("Cannot execute setup file: {}", installer.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_check_gate() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut config = Config::default();
        assert!(UpdateChecker::should_check(&config, today));

        config.last_updates_check_date = "2024-01-01".to_string();
        assert!(!UpdateChecker::should_check(&config, today));

        config.last_updates_check_date = "2023-12-31".to_string();
        config.check_updates_on_startup = false;
        assert!(!UpdateChecker::should_check(&config, today));
    }

    struct NoSource;

    impl VersionSource for NoSource {
        fn fetch_latest_version(&self) -> Option<String> {
            None
        }

        fn fetch_installer_location(&self, _version: &str) -> Option<PathBuf> {
            None
        }
    }

    struct Silent;

    impl UpdatePrompt for Silent {
        fn confirm(&self, _title: &str, _message: &str) -> bool {
            false
        }

        fn show_error(&self, _title: &str, _message: &str) {}
    }

    #[test]
    fn test_update_config_sets_delay_and_home_page() {
        let checker = UpdateChecker::new(
            AppVersion::parse("1.0.0").unwrap(),
            Arc::new(NoSource),
            Arc::new(Silent),
            Arc::new(crate::installer::SystemLauncher),
        );
        assert_eq!(checker.startup_delay(), Duration::from_millis(2000));

        let updates = UpdateConfig {
            home_url: "https://example.com/releases".to_string(),
            startup_delay_ms: 150,
            ..UpdateConfig::default()
        };
        let checker = checker.with_update_config(&updates);
        assert_eq!(checker.startup_delay(), Duration::from_millis(150));
        assert_eq!(checker.home_url(), "https://example.com/releases");
    }

    #[test]
    fn test_confirmation_warns_about_closing() {
        let message = confirmation_message("2.5.0.1");
        assert!(message.contains("v2.5.0.1"));
        assert!(message.contains("will be closed"));
        assert!(message.contains("unsaved data may be lost"));
    }
}
