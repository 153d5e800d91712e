//! Version resolution against the remote manifest or the local cache.

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::cache::CacheEntry;
use crate::manifest::Manifest;
use crate::version::{SolcVersion, VersionToken};
use crate::{Error, Result};

/// A release resolved from the manifest, ready to download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Release {
  pub version: SolcVersion,
  pub file_name: String,
  pub keccak256: String,
}

/// Resolve a download request against the manifest.
///
/// The release must have exactly one matching build; anything else fails
/// closed with [`Error::VersionNotFound`].
pub fn resolve_release(token: &VersionToken, manifest: &Manifest) -> Result<Release> {
  let wanted = match token {
    VersionToken::Exact(version) => version.to_string(),
    VersionToken::Latest => manifest.latest_release.clone(),
    VersionToken::Newest => {
      return Err(Error::InvalidVersionToken {
        token: token.to_string(),
        expected: "<major>.<minor>.<patch> or 'latest'",
      });
    }
  };

  let version = SolcVersion::parse(&wanted).ok_or_else(|| Error::VersionNotFound(wanted.clone()))?;
  let file_name = manifest
    .release_file(&wanted)
    .ok_or_else(|| Error::VersionNotFound(wanted.clone()))?;
  check_file_name(file_name)?;
  let build = manifest
    .build_for(file_name)
    .ok_or_else(|| Error::VersionNotFound(wanted.clone()))?;

  debug!(%version, file = %file_name, "resolved release");
  Ok(Release {
    version,
    file_name: file_name.to_string(),
    keccak256: build.keccak256.clone(),
  })
}

/// Release file names become cache paths, so they must be a single component.
fn check_file_name(file_name: &str) -> Result<()> {
  let unsafe_name =
    file_name.is_empty() || file_name == "." || file_name == ".." || file_name.contains(['/', '\\']);
  if unsafe_name {
    return Err(Error::Parse(format!("release file name '{}' is not a plain file name", file_name)));
  }
  Ok(())
}

/// Resolve a `use` request against the cache listing.
///
/// `newest` picks the highest embedded version. An exact token matches any
/// file whose name *contains* it, so `0.8.1` also matches a `0.8.10` file.
/// When several files match, the one whose embedded version equals the token
/// wins, otherwise the highest embedded version.
pub fn resolve_installed<'a>(token: &VersionToken, entries: &'a [CacheEntry], dir: &Path) -> Result<&'a CacheEntry> {
  match token {
    VersionToken::Newest => entries
      .iter()
      .filter(|e| e.version.is_some())
      .max_by(|a, b| a.version.cmp(&b.version))
      .ok_or_else(|| Error::NoVersionsAvailable { dir: dir.to_path_buf() }),
    VersionToken::Exact(version) => {
      let needle = version.to_string();
      let candidates = entries.iter().filter(|e| e.file_name.contains(&needle));
      candidates
        .max_by_key(|e| (e.version.as_ref() == Some(version), e.version.clone()))
        .ok_or_else(|| Error::VersionNotInstalled(version.to_string()))
    }
    VersionToken::Latest => Err(Error::InvalidVersionToken {
      token: token.to_string(),
      expected: "<major>.<minor>.<patch> or 'newest'",
    }),
  }
}
