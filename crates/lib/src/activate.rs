//! The active binary slot (`<root>/soljson.js`).
//!
//! [`ActiveSlot::activate`] is the only operation that mutates the slot. It
//! deletes the current occupant and copies the new content in place; readers
//! running at the same time may observe a missing or partially written file,
//! and concurrent invocations are not synchronized. This is acceptable for a
//! single-user tool invoked sequentially.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::cache::CacheEntry;
use crate::hash;
use crate::version::SolcVersion;
use crate::{Error, Result};

/// Result of activating a cache entry.
#[derive(Debug, Clone, Serialize)]
pub struct Activation {
  pub version: Option<SolcVersion>,
  pub source: PathBuf,
  pub slot: PathBuf,
  pub bytes: u64,
}

#[derive(Debug, Clone)]
pub struct ActiveSlot {
  path: PathBuf,
}

impl ActiveSlot {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn is_occupied(&self) -> bool {
    self.path.symlink_metadata().is_ok()
  }

  /// Replace the slot's content with a copy of `entry`.
  ///
  /// On a failed copy the slot may be left absent or partially written.
  pub fn activate(&self, entry: &CacheEntry) -> Result<Activation> {
    match fs::remove_file(&self.path) {
      Ok(()) => debug!(slot = ?self.path, "removed previous active binary"),
      Err(e) if e.kind() == io::ErrorKind::NotFound => {}
      Err(e) => return Err(self.copy_error(e)),
    }

    let bytes = fs::copy(&entry.path, &self.path).map_err(|e| self.copy_error(e))?;

    info!(source = ?entry.path, slot = ?self.path, bytes, "activated");
    Ok(Activation {
      version: entry.version.clone(),
      source: entry.path.clone(),
      slot: self.path.clone(),
      bytes,
    })
  }

  /// Find the cache entry whose content the slot currently holds.
  ///
  /// The slot is a copy, not a link, so entries are compared by size and then
  /// by content hash.
  pub fn current<'a>(&self, entries: &'a [CacheEntry]) -> Result<Option<&'a CacheEntry>> {
    let slot_len = match fs::metadata(&self.path) {
      Ok(meta) => meta.len(),
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(Error::io(&self.path, e)),
    };

    let mut slot_hash = None;
    for entry in entries {
      let same_len = fs::metadata(&entry.path).map(|m| m.len() == slot_len).unwrap_or(false);
      if !same_len {
        continue;
      }

      if slot_hash.is_none() {
        slot_hash = Some(hash::hash_file(&self.path)?);
      }
      if slot_hash.as_deref() == Some(hash::hash_file(&entry.path)?.as_str()) {
        return Ok(Some(entry));
      }
    }

    Ok(None)
  }

  fn copy_error(&self, source: io::Error) -> Error {
    Error::Copy {
      path: self.path.clone(),
      source,
    }
  }
}
