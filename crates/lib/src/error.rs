//! Error types for solvm-lib.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Exit status used when a download is cancelled with Ctrl+C.
pub const INTERRUPTED_EXIT_CODE: u8 = 130;

/// Errors that can occur while resolving, downloading or activating versions.
///
/// Every variant is terminal for the current invocation.
#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid version '{token}': expected {expected}")]
  InvalidVersionToken { token: String, expected: &'static str },

  #[error("request to {url} failed: {message}")]
  Network { url: String, message: String },

  #[error("invalid release manifest: {0}")]
  Parse(String),

  #[error("version {0} not found in the release manifest")]
  VersionNotFound(String),

  #[error("version {0} is not installed, download it first")]
  VersionNotInstalled(String),

  #[error("no versions installed in {}, download one first", dir.display())]
  NoVersionsAvailable { dir: PathBuf },

  #[error("hash mismatch: expected {expected}, got {actual}")]
  HashMismatch { expected: String, actual: String },

  #[error("failed to activate {}: {source}", path.display())]
  Copy {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("could not locate the storage root for package '{0}' (set SOLVM_ROOT or pass --root)")]
  StorageNotFound(String),

  #[error("download interrupted")]
  Interrupted,

  #[error("{primary}; additionally failed to remove {}: {source}", path.display())]
  Cleanup {
    primary: Box<Error>,
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("I/O error at {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

impl Error {
  pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
    Error::Io {
      path: path.into(),
      source,
    }
  }

  pub(crate) fn network(url: &str, err: impl std::fmt::Display) -> Self {
    Error::Network {
      url: url.to_string(),
      message: err.to_string(),
    }
  }

  /// Process exit status for this error.
  pub fn exit_code(&self) -> u8 {
    match self {
      Error::Interrupted => INTERRUPTED_EXIT_CODE,
      Error::Cleanup { primary, .. } => primary.exit_code(),
      _ => 1,
    }
  }
}
