//! Version identifiers and user-supplied version tokens.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::{Error, Result};

/// A `major.minor.patch` release identifier.
///
/// Ordering compares components numerically, so `0.8.10 > 0.8.9`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SolcVersion(semver::Version);

impl SolcVersion {
  pub fn new(major: u64, minor: u64, patch: u64) -> Self {
    Self(semver::Version::new(major, minor, patch))
  }

  /// Parse a strict `major.minor.patch` string.
  ///
  /// Pre-release and build suffixes are rejected.
  pub fn parse(s: &str) -> Option<Self> {
    let mut parts = s.split('.');
    let major = parse_component(parts.next()?)?;
    let minor = parse_component(parts.next()?)?;
    let patch = parse_component(parts.next()?)?;
    if parts.next().is_some() {
      return None;
    }
    Some(Self::new(major, minor, patch))
  }
}

fn parse_component(s: &str) -> Option<u64> {
  if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  s.parse().ok()
}

impl fmt::Display for SolcVersion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl FromStr for SolcVersion {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    Self::parse(s).ok_or_else(|| Error::InvalidVersionToken {
      token: s.to_string(),
      expected: "<major>.<minor>.<patch>",
    })
  }
}

impl Serialize for SolcVersion {
  fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

/// Find the first `major.minor.patch` run embedded in a file name.
///
/// `soljson-v0.8.19+commit.7dd6d404.js` yields `0.8.19`.
pub fn extract_version(file_name: &str) -> Option<SolcVersion> {
  let bytes = file_name.as_bytes();

  for start in 0..bytes.len() {
    if !bytes[start].is_ascii_digit() || (start > 0 && bytes[start - 1].is_ascii_digit()) {
      continue;
    }
    if let Some(version) = triple_at(&file_name[start..]) {
      return Some(version);
    }
  }

  None
}

fn triple_at(s: &str) -> Option<SolcVersion> {
  let mut rest = s;
  let mut components = [0u64; 3];

  for (i, component) in components.iter_mut().enumerate() {
    if i > 0 {
      rest = rest.strip_prefix('.')?;
    }
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
      return None;
    }
    *component = rest[..digits].parse().ok()?;
    rest = &rest[digits..];
  }

  Some(SolcVersion::new(components[0], components[1], components[2]))
}

/// Where a token is resolved: the remote manifest or the local cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
  Remote,
  Installed,
}

impl Lookup {
  fn expected(self) -> &'static str {
    match self {
      Lookup::Remote => "<major>.<minor>.<patch> or 'latest'",
      Lookup::Installed => "<major>.<minor>.<patch> or 'newest'",
    }
  }
}

/// A validated version request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionToken {
  Exact(SolcVersion),
  /// The manifest's latest release.
  Latest,
  /// The highest installed version.
  Newest,
}

impl VersionToken {
  /// Validate a raw token for the given lookup.
  ///
  /// Pure string validation: nothing touches the network or the filesystem.
  /// `latest` is only accepted for [`Lookup::Remote`] and `newest` only for
  /// [`Lookup::Installed`].
  pub fn parse(raw: &str, lookup: Lookup) -> Result<Self> {
    let token = match (raw, lookup) {
      ("latest", Lookup::Remote) => Some(VersionToken::Latest),
      ("newest", Lookup::Installed) => Some(VersionToken::Newest),
      _ => SolcVersion::parse(raw).map(VersionToken::Exact),
    };

    token.ok_or_else(|| Error::InvalidVersionToken {
      token: raw.to_string(),
      expected: lookup.expected(),
    })
  }
}

impl fmt::Display for VersionToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      VersionToken::Exact(version) => write!(f, "{}", version),
      VersionToken::Latest => write!(f, "latest"),
      VersionToken::Newest => write!(f, "newest"),
    }
  }
}
