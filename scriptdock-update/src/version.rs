//! Four-part release versions.
//!
//! Releases are numbered `major.minor.build.revision` and compared numerically
//! per component, so `2.10.0.0` is newer than `2.9.9.9`.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid version '{input}': {reason}")]
pub struct VersionError {
    input: String,
    reason: String,
}

impl VersionError {
    fn new(input: &str, reason: impl Into<String>) -> Self {
        Self {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// An ordered `major.minor.build.revision` version.
///
/// Missing trailing components are zero: `2.5` equals `2.5.0.0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AppVersion {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    pub revision: u32,
}

impl AppVersion {
    pub const fn new(major: u32, minor: u32, build: u32, revision: u32) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }

    /// Parse `1` to `4` dot-separated numeric components, with an optional
    /// leading `v`. Semver strings carrying pre-release or build metadata
    /// (`1.2.3-beta.1`) fall back to their numeric core.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        let text = trimmed.strip_prefix(['v', 'V']).unwrap_or(trimmed);
        if text.is_empty() {
            return Err(VersionError::new(input, "empty version"));
        }

        match Self::parse_numeric(text) {
            Ok(version) => Ok(version),
            Err(numeric_err) => match semver::Version::parse(text) {
                Ok(semver) => Self::try_from(&semver).map_err(|_| numeric_err),
                Err(_) => Err(numeric_err),
            },
        }
    }

    fn parse_numeric(text: &str) -> Result<Self, VersionError> {
        let parts: Vec<&str> = text.split('.').collect();
        if parts.len() > 4 {
            return Err(VersionError::new(text, "more than four components"));
        }

        let mut components = [0u32; 4];
        for (slot, part) in components.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| VersionError::new(text, format!("'{}' is not a number", part)))?;
        }

        let [major, minor, build, revision] = components;
        Ok(Self::new(major, minor, build, revision))
    }

    /// Whether `self` is strictly older than `other`.
    pub fn is_older_than(&self, other: &AppVersion) -> bool {
        self < other
    }
}

impl TryFrom<&semver::Version> for AppVersion {
    type Error = std::num::TryFromIntError;

    fn try_from(v: &semver::Version) -> Result<Self, Self::Error> {
        Ok(Self::new(
            u32::try_from(v.major)?,
            u32::try_from(v.minor)?,
            u32::try_from(v.patch)?,
            0,
        ))
    }
}

impl FromStr for AppVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AppVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

/// Compare a fetched version string against the running version.
///
/// Unparseable input counts as "no update".
pub fn is_update_available(latest: &str, current: &AppVersion) -> bool {
    match AppVersion::parse(latest) {
        Ok(latest) => current.is_older_than(&latest),
        Err(e) => {
            log::warn!("Ignoring release version: {}", e);
            false
        }
    }
}
