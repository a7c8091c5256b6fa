//! Integration tests for the update workflow, driven by in-memory
//! collaborators so no network or process is touched.

use chrono::NaiveDate;
use parking_lot::Mutex;
use scriptdock_config::{Config, ConfigHandle};
use scriptdock_update::{
    AppVersion, CheckDecision, InstallerLauncher, LaunchError, UpdateChecker, UpdateOutcome,
    UpdatePrompt, VersionSource,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

#[derive(Default)]
struct FakeSource {
    version: Option<String>,
    installer: Option<PathBuf>,
    version_calls: AtomicUsize,
}

impl VersionSource for FakeSource {
    fn fetch_latest_version(&self) -> Option<String> {
        self.version_calls.fetch_add(1, Ordering::SeqCst);
        self.version.clone()
    }

    fn fetch_installer_location(&self, _version: &str) -> Option<PathBuf> {
        self.installer.clone()
    }
}

#[derive(Default)]
struct FakePrompt {
    answer: bool,
    questions: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl UpdatePrompt for FakePrompt {
    fn confirm(&self, _title: &str, message: &str) -> bool {
        self.questions.lock().push(message.to_string());
        self.answer
    }

    fn show_error(&self, _title: &str, message: &str) {
        self.errors.lock().push(message.to_string());
    }
}

#[derive(Default)]
struct FakeLauncher {
    fail_launch: bool,
    fail_open: bool,
    launched: Mutex<Vec<PathBuf>>,
    opened: Mutex<Vec<String>>,
}

impl InstallerLauncher for FakeLauncher {
    fn launch_installer(&self, installer: &Path) -> Result<(), LaunchError> {
        self.launched.lock().push(installer.to_path_buf());
        if self.fail_launch {
            return Err(LaunchError::NotFound(installer.display().to_string()));
        }
        Ok(())
    }

    fn open_url(&self, url: &str) -> Result<(), LaunchError> {
        self.opened.lock().push(url.to_string());
        if self.fail_open {
            return Err(LaunchError::Open {
                url: url.to_string(),
                source: std::io::Error::other("no browser"),
            });
        }
        Ok(())
    }
}

struct Harness {
    source: Arc<FakeSource>,
    prompt: Arc<FakePrompt>,
    launcher: Arc<FakeLauncher>,
    checker: UpdateChecker,
}

fn harness(current: &str, source: FakeSource, prompt: FakePrompt, launcher: FakeLauncher) -> Harness {
    let source = Arc::new(source);
    let prompt = Arc::new(prompt);
    let launcher = Arc::new(launcher);
    let checker = UpdateChecker::new(
        AppVersion::parse(current).unwrap(),
        source.clone(),
        prompt.clone(),
        launcher.clone(),
    )
    .with_home_url("https://example.com/releases")
    .with_startup_delay(Duration::ZERO);
    Harness {
        source,
        prompt,
        launcher,
        checker,
    }
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ---------------------------------------------------------------------------
// Startup gate
// ---------------------------------------------------------------------------

#[test]
fn first_startup_of_the_day_schedules_and_persists_date() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    let mut config = Config::default();
    config.last_updates_check_date = "2023-12-31".to_string();
    let handle = ConfigHandle::with_path(config, &path);

    let h = harness("2.4.9.9", FakeSource::default(), FakePrompt::default(), FakeLauncher::default());
    let (decision, worker) = h.checker.start_on_startup(&handle, day(2024, 1, 1));
    assert_eq!(decision, CheckDecision::Scheduled);
    assert_eq!(worker.unwrap().join().unwrap(), UpdateOutcome::NoVersionInfo);

    assert_eq!(handle.snapshot().last_updates_check_date, "2024-01-01");
    let saved = Config::load_from(&path).unwrap();
    assert_eq!(saved.last_updates_check_date, "2024-01-01");
}

#[test]
fn second_startup_same_day_does_nothing() {
    let handle = ConfigHandle::in_memory(Config::default());
    let h = harness("1.0.0.0", FakeSource::default(), FakePrompt::default(), FakeLauncher::default());

    let (first, worker) = h.checker.start_on_startup(&handle, day(2024, 1, 1));
    assert_eq!(first, CheckDecision::Scheduled);
    worker.unwrap().join().unwrap();

    let (second, worker) = h.checker.start_on_startup(&handle, day(2024, 1, 1));
    assert_eq!(second, CheckDecision::AlreadyCheckedToday);
    assert!(worker.is_none());
    assert_eq!(h.source.version_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn disabled_flag_skips_everything() {
    let mut config = Config::default();
    config.check_updates_on_startup = false;
    let handle = ConfigHandle::in_memory(config);
    let h = harness("1.0.0.0", FakeSource::default(), FakePrompt::default(), FakeLauncher::default());

    let (decision, worker) = h.checker.start_on_startup(&handle, day(2024, 1, 1));
    assert_eq!(decision, CheckDecision::Disabled);
    assert!(worker.is_none());
    assert_eq!(handle.snapshot().last_updates_check_date, "");
    assert_eq!(h.source.version_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn forced_check_ignores_gate() {
    let mut config = Config::default();
    config.check_updates_on_startup = false;
    config.last_updates_check_date = "2024-01-01".to_string();
    let handle = ConfigHandle::in_memory(config);
    let h = harness("1.0.0.0", FakeSource::default(), FakePrompt::default(), FakeLauncher::default());

    let outcome = h.checker.start_forced(&handle, day(2024, 1, 1)).join().unwrap();
    assert_eq!(outcome, UpdateOutcome::NoVersionInfo);
    assert_eq!(h.source.version_calls.load(Ordering::SeqCst), 1);
}

// ---------------------------------------------------------------------------
// Background workflow
// ---------------------------------------------------------------------------

#[test]
fn newer_version_confirmed_launches_installer() {
    let installer = PathBuf::from("/tmp/scriptdock-2.5.0.1.msi");
    let h = harness(
        "2.4.9.9",
        FakeSource {
            version: Some("2.5.0.1".to_string()),
            installer: Some(installer.clone()),
            ..Default::default()
        },
        FakePrompt {
            answer: true,
            ..Default::default()
        },
        FakeLauncher::default(),
    );

    let outcome = h.checker.run_check();
    assert_eq!(
        outcome,
        UpdateOutcome::InstallerLaunched {
            version: "2.5.0.1".to_string(),
            installer: installer.clone(),
        }
    );
    assert_eq!(h.prompt.questions.lock().len(), 1);
    assert!(h.prompt.questions.lock()[0].contains("v2.5.0.1"));
    assert_eq!(*h.launcher.launched.lock(), vec![installer]);
    assert!(h.prompt.errors.lock().is_empty());
    assert_eq!(h.checker.last_outcome(), Some(outcome));
}

#[test]
fn older_or_equal_version_never_prompts() {
    for latest in ["2.4.9.9", "2.5.0.1"] {
        let h = harness(
            "2.5.0.1",
            FakeSource {
                version: Some(latest.to_string()),
                ..Default::default()
            },
            FakePrompt {
                answer: true,
                ..Default::default()
            },
            FakeLauncher::default(),
        );

        assert!(matches!(h.checker.run_check(), UpdateOutcome::UpToDate { .. }));
        assert!(h.prompt.questions.lock().is_empty());
    }
}

#[test]
fn declined_prompt_stops() {
    let h = harness(
        "1.0.0.0",
        FakeSource {
            version: Some("1.0.0.1".to_string()),
            installer: Some(PathBuf::from("setup.msi")),
            ..Default::default()
        },
        FakePrompt::default(),
        FakeLauncher::default(),
    );

    assert_eq!(
        h.checker.run_check(),
        UpdateOutcome::Declined {
            version: "1.0.0.1".to_string()
        }
    );
    assert!(h.launcher.launched.lock().is_empty());
    assert!(h.launcher.opened.lock().is_empty());
}

#[test]
fn launch_failure_is_reported_with_path() {
    let h = harness(
        "1.0.0.0",
        FakeSource {
            version: Some("1.1".to_string()),
            installer: Some(PathBuf::from("setup.msi")),
            ..Default::default()
        },
        FakePrompt {
            answer: true,
            ..Default::default()
        },
        FakeLauncher {
            fail_launch: true,
            ..Default::default()
        },
    );

    assert!(matches!(
        h.checker.run_check(),
        UpdateOutcome::InstallerFailed { .. }
    ));
    let errors = h.prompt.errors.lock();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Cannot execute setup file: "));
    assert!(errors[0].contains("setup.msi"));
}

#[test]
fn missing_installer_falls_back_to_home_page() {
    let h = harness(
        "1.0.0.0",
        FakeSource {
            version: Some("2.0".to_string()),
            ..Default::default()
        },
        FakePrompt {
            answer: true,
            ..Default::default()
        },
        FakeLauncher {
            fail_open: true,
            ..Default::default()
        },
    );

    assert_eq!(
        h.checker.run_check(),
        UpdateOutcome::OpenedHomePage {
            version: "2.0".to_string()
        }
    );
    assert_eq!(h.prompt.errors.lock().len(), 1);
    assert!(h.prompt.errors.lock()[0].contains("Cannot download the binaries"));
    assert_eq!(
        *h.launcher.opened.lock(),
        vec!["https://example.com/releases".to_string()]
    );
}
