//! Release manifest and installer download over HTTPS (native-tls).
//!
//! The release endpoint serves a small JSON document:
//!
//! ```json
//! { "version": "2.5.0.1", "installer_url": "https://...", "sha256": "..." }
//! ```
//!
//! `sha256` is optional. When present, the downloaded installer must match it.

use crate::update_checker::VersionSource;
use parking_lot::Mutex;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;
use ureq::Agent;
use ureq::tls::{RootCerts, TlsConfig, TlsProvider};

/// Global timeout for all HTTP operations (30 seconds).
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum size of the release manifest (1 MB).
pub const MAX_MANIFEST_SIZE: u64 = 1024 * 1024;

/// Maximum size of a downloaded installer (200 MB).
pub const MAX_INSTALLER_SIZE: u64 = 200 * 1024 * 1024;

const USER_AGENT: &str = concat!("scriptdock/", env!("CARGO_PKG_VERSION"));

/// Release metadata served by the version endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseManifest {
    pub version: String,
    #[serde(default)]
    pub installer_url: Option<String>,
    #[serde(default)]
    pub sha256: Option<String>,
}

impl ReleaseManifest {
    pub fn parse(json: &str) -> Result<Self, String> {
        let manifest: Self = serde_json::from_str(json)
            .map_err(|e| format!("Failed to parse release manifest: {}", e))?;
        if manifest.version.trim().is_empty() {
            return Err("Release manifest has an empty version".to_string());
        }
        Ok(manifest)
    }
}

/// Reject anything that is not an `https://` URL.
pub fn validate_https_url(url: &str) -> Result<(), String> {
    let parsed = url::Url::parse(url).map_err(|e| format!("Invalid URL '{}': {}", url, e))?;
    match parsed.scheme() {
        "https" => Ok(()),
        scheme => Err(format!(
            "Insecure URL scheme '{}' rejected; only HTTPS is allowed. URL: {}",
            scheme, url
        )),
    }
}

/// Create a new HTTP agent configured with native-tls and a global timeout.
pub fn agent() -> Agent {
    let tls_config = TlsConfig::builder()
        .provider(TlsProvider::NativeTls)
        .root_certs(RootCerts::PlatformVerifier)
        .build();

    Agent::config_builder()
        .tls_config(tls_config)
        .timeout_global(Some(HTTP_TIMEOUT))
        .build()
        .into()
}

/// Fetch and parse the release manifest.
pub fn fetch_manifest(url: &str) -> Result<ReleaseManifest, String> {
    validate_https_url(url)?;

    let body = agent()
        .get(url)
        .header("User-Agent", USER_AGENT)
        .header("Accept", "application/json")
        .call()
        .map_err(|e| format!("Failed to fetch release manifest from {}: {}", url, e))?
        .into_body()
        .with_config()
        .limit(MAX_MANIFEST_SIZE)
        .read_to_string()
        .map_err(|e| format!("Failed to read release manifest: {}", e))?;

    ReleaseManifest::parse(&body)
}

/// Download `url` and return its bytes.
pub fn download_file(url: &str) -> Result<Vec<u8>, String> {
    validate_https_url(url)?;

    agent()
        .get(url)
        .header("User-Agent", USER_AGENT)
        .call()
        .map_err(|e| format!("Failed to download '{}': {}", url, e))?
        .into_body()
        .with_config()
        .limit(MAX_INSTALLER_SIZE)
        .read_to_vec()
        .map_err(|e| format!("Failed to read downloaded content from '{}': {}", url, e))
}

/// Lowercase hex SHA-256 of `data`.
pub fn compute_data_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Check `data` against an expected hex digest (case-insensitive).
pub fn verify_checksum(data: &[u8], expected: &str) -> Result<(), String> {
    let expected = expected.trim().to_lowercase();
    if expected.len() != 64 || !expected.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("'{}' is not a SHA256 hash", expected));
    }
    let actual = compute_data_hash(data);
    if actual != expected {
        return Err(format!(
            "Checksum verification failed!\nExpected: {}\nActual:   {}",
            expected, actual
        ));
    }
    Ok(())
}

/// File name for a downloaded installer, taken from the last URL segment.
fn installer_file_name(url: &str, version: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| format!("scriptdock-{}-setup", version))
}

/// [`VersionSource`] backed by the HTTPS release manifest.
///
/// The manifest fetched by [`fetch_latest_version`](VersionSource::fetch_latest_version)
/// is reused by the installer download that follows it.
pub struct HttpVersionSource {
    manifest_url: String,
    download_dir: PathBuf,
    manifest: Mutex<Option<ReleaseManifest>>,
}

impl HttpVersionSource {
    pub fn new(manifest_url: impl Into<String>) -> Self {
        Self {
            manifest_url: manifest_url.into(),
            download_dir: std::env::temp_dir().join("scriptdock-updates"),
            manifest: Mutex::new(None),
        }
    }

    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    fn manifest_for(&self, version: &str) -> Option<ReleaseManifest> {
        if let Some(cached) = self.manifest.lock().as_ref()
            && cached.version == version
        {
            return Some(cached.clone());
        }
        match fetch_manifest(&self.manifest_url) {
            Ok(manifest) if manifest.version == version => Some(manifest),
            Ok(manifest) => {
                log::warn!(
                    "Release manifest moved to {} while fetching installer for {}",
                    manifest.version,
                    version
                );
                None
            }
            Err(e) => {
                log::warn!("{}", e);
                None
            }
        }
    }

    fn download_installer(&self, manifest: &ReleaseManifest) -> Result<PathBuf, String> {
        let url = manifest
            .installer_url
            .as_deref()
            .ok_or_else(|| format!("Release {} has no installer", manifest.version))?;

        let data = download_file(url)?;
        if let Some(expected) = &manifest.sha256 {
            verify_checksum(&data, expected)?;
            log::info!("SHA256 checksum verified successfully");
        } else {
            log::warn!("Release manifest has no sha256; skipping installer verification");
        }

        std::fs::create_dir_all(&self.download_dir).map_err(|e| {
            format!(
                "Failed to create download directory {:?}: {}",
                self.download_dir, e
            )
        })?;
        let path = self
            .download_dir
            .join(installer_file_name(url, &manifest.version));
        std::fs::write(&path, &data)
            .map_err(|e| format!("Failed to write installer {:?}: {}", path, e))?;

        log::info!("Installer downloaded to {:?} ({} bytes)", path, data.len());
        Ok(path)
    }
}

impl VersionSource for HttpVersionSource {
    fn fetch_latest_version(&self) -> Option<String> {
        match fetch_manifest(&self.manifest_url) {
            Ok(manifest) => {
                let version = manifest.version.trim().to_string();
                *self.manifest.lock() = Some(manifest);
                Some(version)
            }
            Err(e) => {
                log::warn!("Update check failed: {}", e);
                None
            }
        }
    }

    fn fetch_installer_location(&self, version: &str) -> Option<PathBuf> {
        let manifest = self.manifest_for(version)?;
        match self.download_installer(&manifest) {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("Installer download failed: {}", e);
                None
            }
        }
    }
}
