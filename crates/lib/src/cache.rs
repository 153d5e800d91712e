//! The local download cache (`<root>/versions/`).
//!
//! Entries are identified by the version embedded in their file name; there is
//! no companion metadata.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::version::{SolcVersion, extract_version};
use crate::{Error, Result};

/// A file in the versions directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheEntry {
  pub file_name: String,
  pub path: PathBuf,
  /// Version embedded in the file name, if any.
  pub version: Option<SolcVersion>,
}

impl CacheEntry {
  fn from_path(path: PathBuf) -> Option<Self> {
    let file_name = path.file_name()?.to_str()?.to_string();
    let version = extract_version(&file_name);
    Some(Self {
      file_name,
      path,
      version,
    })
  }
}

#[derive(Debug, Clone)]
pub struct VersionCache {
  dir: PathBuf,
}

impl VersionCache {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  pub fn entry_path(&self, file_name: &str) -> PathBuf {
    self.dir.join(file_name)
  }

  pub fn ensure_dir(&self) -> Result<()> {
    fs::create_dir_all(&self.dir).map_err(|e| Error::io(&self.dir, e))
  }

  /// Lazily enumerate every regular file in the cache.
  ///
  /// Order is whatever the directory yields. A missing directory behaves as an
  /// empty cache. Each call starts a fresh enumeration.
  pub fn entries(&self) -> CacheEntries {
    let inner = if self.dir.is_dir() {
      Some(WalkDir::new(&self.dir).min_depth(1).max_depth(1).into_iter())
    } else {
      None
    };
    CacheEntries { inner }
  }

  /// Lazily enumerate the versions recognizable from cache file names.
  pub fn versions(&self) -> impl Iterator<Item = Result<SolcVersion>> + use<> {
    self
      .entries()
      .filter_map(|entry| entry.map(|e| e.version).transpose())
  }

  /// Collect the recognizable entries, in enumeration order.
  ///
  /// An empty cache is reported as [`Error::NoVersionsAvailable`] so callers
  /// can point the user at `download`.
  pub fn list(&self) -> Result<Vec<CacheEntry>> {
    let mut listed = Vec::new();
    for entry in self.entries() {
      let entry = entry?;
      if entry.version.is_some() {
        listed.push(entry);
      }
    }

    if listed.is_empty() {
      return Err(Error::NoVersionsAvailable { dir: self.dir.clone() });
    }
    Ok(listed)
  }
}

/// Iterator over cache entries, see [`VersionCache::entries`].
pub struct CacheEntries {
  inner: Option<walkdir::IntoIter>,
}

impl Iterator for CacheEntries {
  type Item = Result<CacheEntry>;

  fn next(&mut self) -> Option<Self::Item> {
    let inner = self.inner.as_mut()?;
    loop {
      match inner.next()? {
        Ok(entry) if entry.file_type().is_file() => {
          if let Some(cache_entry) = CacheEntry::from_path(entry.into_path()) {
            return Some(Ok(cache_entry));
          }
        }
        Ok(_) => {}
        Err(e) => {
          let path = e.path().map(Path::to_path_buf).unwrap_or_default();
          return Some(Err(Error::io(path, e.into())));
        }
      }
    }
  }
}
