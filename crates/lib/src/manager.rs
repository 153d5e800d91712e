//! The download, use, list and latest flows.
//!
//! Tokens reach this module already validated as [`VersionToken`]s, so a
//! malformed request never gets as far as the network or the filesystem.

use std::future::Future;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, warn};

use crate::activate::{ActiveSlot, Activation};
use crate::cache::{CacheEntry, VersionCache};
use crate::config::Config;
use crate::download::Downloader;
use crate::hash;
use crate::manifest::{ManifestClient, http_client};
use crate::resolve::{Release, resolve_installed, resolve_release};
use crate::storage::{Storage, StorageLocator};
use crate::version::{SolcVersion, VersionToken};
use crate::{Error, Result};

/// Result of a `download` request.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadOutcome {
  pub release: Release,
  pub path: PathBuf,
  pub bytes: u64,
  /// The entry was already in the cache with the expected hash.
  pub was_cached: bool,
}

/// A release listed in the remote manifest.
#[derive(Debug, Clone, Serialize)]
pub struct AvailableRelease {
  pub version: SolcVersion,
  pub file_name: String,
  pub is_latest: bool,
  pub is_installed: bool,
}

pub struct VersionManager {
  config: Config,
  storage: Storage,
  manifest_client: ManifestClient,
  downloader: Downloader,
}

impl VersionManager {
  pub fn new(config: Config, storage: Storage) -> Result<Self> {
    let client = http_client(config.timeout)?;
    Ok(Self {
      manifest_client: ManifestClient::new(client.clone(), config.manifest_url.clone()),
      downloader: Downloader::new(client),
      config,
      storage,
    })
  }

  /// Resolve the storage root with `locator` and build a manager on it.
  pub fn locate(config: Config, locator: &dyn StorageLocator) -> Result<Self> {
    let storage = Storage::locate(&config, locator)?;
    Self::new(config, storage)
  }

  pub fn storage(&self) -> &Storage {
    &self.storage
  }

  fn cache(&self) -> VersionCache {
    self.storage.cache()
  }

  fn slot(&self) -> ActiveSlot {
    self.storage.active_slot()
  }

  /// Fetch the manifest, resolve `token` and download the release into the
  /// cache.
  ///
  /// An existing entry whose hash matches the manifest is kept as is unless
  /// `force` is set. `cancel` aborts an in-flight transfer.
  pub async fn download<F>(&self, token: &VersionToken, force: bool, cancel: F) -> Result<DownloadOutcome>
  where
    F: Future<Output = ()>,
  {
    let manifest = self.manifest_client.fetch().await?;
    let release = resolve_release(token, &manifest)?;
    self.fetch_release(release, force, cancel).await
  }

  async fn fetch_release<F>(&self, release: Release, force: bool, cancel: F) -> Result<DownloadOutcome>
  where
    F: Future<Output = ()>,
  {
    let cache = self.cache();
    cache.ensure_dir()?;
    let dest = cache.entry_path(&release.file_name);

    if !force && dest.is_file() {
      let existing = hash::hash_file(&dest)?;
      if existing == release.keccak256 {
        info!(version = %release.version, path = ?dest, "already downloaded");
        let bytes = std::fs::metadata(&dest).map_err(|e| Error::io(&dest, e))?.len();
        return Ok(DownloadOutcome {
          release,
          path: dest,
          bytes,
          was_cached: true,
        });
      }
      warn!(version = %release.version, expected = %release.keccak256, actual = %existing, "cached file hash mismatch, re-downloading");
    }

    let url = self.config.binary_url(&release.file_name);
    let report = self.downloader.fetch(&url, &dest, &release.keccak256, cancel).await?;

    Ok(DownloadOutcome {
      release,
      path: report.path,
      bytes: report.bytes,
      was_cached: false,
    })
  }

  /// Activate the cache entry matching `token`.
  pub fn use_version(&self, token: &VersionToken) -> Result<Activation> {
    let cache = self.cache();
    let entries = cache.entries().collect::<Result<Vec<_>>>()?;
    let entry = resolve_installed(token, &entries, cache.dir())?;
    self.slot().activate(entry)
  }

  /// Download the manifest's latest release and activate it.
  pub async fn download_and_use_latest<F>(&self, cancel: F) -> Result<(DownloadOutcome, Activation)>
  where
    F: Future<Output = ()>,
  {
    let outcome = self.download(&VersionToken::Latest, false, cancel).await?;
    let entry = CacheEntry {
      file_name: outcome.release.file_name.clone(),
      path: outcome.path.clone(),
      version: Some(outcome.release.version.clone()),
    };
    let activation = self.slot().activate(&entry)?;
    Ok((outcome, activation))
  }

  /// Installed versions in directory order.
  pub fn list(&self) -> Result<Vec<CacheEntry>> {
    self.cache().list()
  }

  /// The cache entry the active slot currently holds.
  pub fn current(&self) -> Result<Option<CacheEntry>> {
    let entries = self.cache().entries().collect::<Result<Vec<_>>>()?;
    Ok(self.slot().current(&entries)?.cloned())
  }

  /// Releases published in the manifest, newest first.
  pub async fn available(&self) -> Result<Vec<AvailableRelease>> {
    let manifest = self.manifest_client.fetch().await?;
    let cache = self.cache();
    let latest = SolcVersion::parse(&manifest.latest_release);

    let mut releases: Vec<AvailableRelease> = manifest
      .releases
      .iter()
      .filter_map(|(version, file_name)| {
        let version = SolcVersion::parse(version)?;
        Some(AvailableRelease {
          is_latest: latest.as_ref() == Some(&version),
          is_installed: cache.entry_path(file_name).is_file(),
          version,
          file_name: file_name.clone(),
        })
      })
      .collect();

    releases.sort_by(|a, b| b.version.cmp(&a.version));
    Ok(releases)
  }
}
