//! Update checking for the scriptdock editor plugin.
//!
//! Provides:
//! - `version`: four-part release versions and numeric comparison
//! - `update_checker`: the once-per-day startup check and its collaborators
//! - `http`: HTTPS release manifest and installer download
//! - `installer`: starting the installer or opening the release page

pub mod http;
pub mod installer;
pub mod update_checker;
pub mod version;

pub use http::{HttpVersionSource, ReleaseManifest};
pub use installer::{InstallerLauncher, LaunchError, SystemLauncher};
pub use update_checker::{
    CheckDecision, DIALOG_TITLE, UpdateChecker, UpdateOutcome, UpdatePrompt, VersionSource,
    confirmation_message,
};
pub use version::{AppVersion, VersionError, is_update_available};
