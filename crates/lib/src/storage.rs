//! Locating the storage root and the paths inside it.
//!
//! ```text
//! <root>/
//! ├── soljson.js              # active binary slot
//! └── versions/               # download cache
//!     └── soljson-v0.8.19+commit.7dd6d404.js
//! ```

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::activate::ActiveSlot;
use crate::cache::VersionCache;
use crate::config::Config;
use crate::consts::{ACTIVE_SLOT_FILENAME, VERSIONS_DIR};
use crate::{Error, Result};

/// Finds the directory of an installed package.
pub trait StorageLocator {
  /// Absolute path of `package`'s directory, or `None` if it is not installed.
  fn locate(&self, package: &str) -> Option<PathBuf>;
}

/// Looks for `node_modules/<package>` from a start directory upwards, then in
/// the global npm root.
#[derive(Debug, Clone)]
pub struct NpmLocator {
  start: PathBuf,
  search_global: bool,
}

impl NpmLocator {
  /// Search from the current directory, falling back to `npm root -g`.
  pub fn from_current_dir() -> Self {
    Self {
      start: std::env::current_dir().unwrap_or_default(),
      search_global: true,
    }
  }

  /// Search only the ancestors of `start`.
  pub fn local_only(start: impl Into<PathBuf>) -> Self {
    Self {
      start: start.into(),
      search_global: false,
    }
  }

  fn global_root() -> Option<PathBuf> {
    let output = Command::new("npm").args(["root", "-g"]).output().ok()?;
    if !output.status.success() {
      return None;
    }
    let root = String::from_utf8(output.stdout).ok()?;
    let root = root.trim();
    (!root.is_empty()).then(|| PathBuf::from(root))
  }
}

impl StorageLocator for NpmLocator {
  fn locate(&self, package: &str) -> Option<PathBuf> {
    let local = self
      .start
      .ancestors()
      .map(|dir| dir.join("node_modules").join(package))
      .find(|candidate| candidate.is_dir());

    let found = local.or_else(|| {
      if !self.search_global {
        return None;
      }
      let candidate = Self::global_root()?.join(package);
      candidate.is_dir().then_some(candidate)
    })?;

    debug!(package, path = ?found, "located package");
    Some(dunce::canonicalize(&found).unwrap_or(found))
  }
}

/// The storage root and the resources under it.
#[derive(Debug, Clone)]
pub struct Storage {
  root: PathBuf,
}

impl Storage {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  /// Use the configured root if there is one, otherwise ask `locator`.
  pub fn locate(config: &Config, locator: &dyn StorageLocator) -> Result<Self> {
    if let Some(root) = &config.root {
      return Ok(Self::new(root));
    }
    locator
      .locate(&config.package)
      .map(Self::new)
      .ok_or_else(|| Error::StorageNotFound(config.package.clone()))
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn cache(&self) -> VersionCache {
    VersionCache::new(self.root.join(VERSIONS_DIR))
  }

  pub fn active_slot(&self) -> ActiveSlot {
    ActiveSlot::new(self.root.join(ACTIVE_SLOT_FILENAME))
  }
}
