//! Runtime configuration resolved from the environment.

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::consts::{
  DEFAULT_BINARIES_URL, DEFAULT_PACKAGE, DEFAULT_TIMEOUT_SECS, ENV_BINARIES_URL, ENV_MANIFEST_URL, ENV_PACKAGE,
  ENV_ROOT, ENV_TIMEOUT_SECS, MANIFEST_FILENAME,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
  /// Explicit storage root. When unset the storage locator is consulted.
  pub root: Option<PathBuf>,
  /// npm package the locator searches for.
  pub package: String,
  /// Base URL that release file names are appended to.
  pub binaries_url: String,
  pub manifest_url: String,
  pub timeout: Duration,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      root: None,
      package: DEFAULT_PACKAGE.to_string(),
      binaries_url: DEFAULT_BINARIES_URL.to_string(),
      manifest_url: format!("{}/{}", DEFAULT_BINARIES_URL, MANIFEST_FILENAME),
      timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    }
  }
}

impl Config {
  /// Build a config from `SOLVM_*` environment variables, falling back to the
  /// defaults for anything unset or empty.
  ///
  /// The manifest URL defaults to `list.json` under the binaries URL, so
  /// pointing `SOLVM_BINARIES_URL` at a mirror moves both.
  pub fn from_env() -> Self {
    let defaults = Self::default();

    let binaries_url = env_var(ENV_BINARIES_URL)
      .map(|url| url.trim_end_matches('/').to_string())
      .unwrap_or(defaults.binaries_url);
    let manifest_url =
      env_var(ENV_MANIFEST_URL).unwrap_or_else(|| format!("{}/{}", binaries_url, MANIFEST_FILENAME));

    let timeout = match env_var(ENV_TIMEOUT_SECS) {
      Some(raw) => match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Duration::from_secs(secs),
        _ => {
          warn!(value = %raw, "ignoring invalid {}", ENV_TIMEOUT_SECS);
          defaults.timeout
        }
      },
      None => defaults.timeout,
    };

    Self {
      root: env_var(ENV_ROOT).map(PathBuf::from),
      package: env_var(ENV_PACKAGE).unwrap_or(defaults.package),
      binaries_url,
      manifest_url,
      timeout,
    }
  }

  /// Download URL for a release file.
  pub fn binary_url(&self, file_name: &str) -> String {
    format!("{}/{}", self.binaries_url.trim_end_matches('/'), file_name)
  }
}

fn env_var(name: &str) -> Option<String> {
  std::env::var(name).ok().filter(|v| !v.is_empty())
}
