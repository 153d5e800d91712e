//! The remote release manifest (`list.json`) and the client that fetches it.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::consts::APP_NAME;
use crate::{Error, Result};

/// A snapshot of the published releases.
///
/// Unknown fields in the document are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
  /// Version string of the latest release.
  pub latest_release: String,
  /// Version string to release file name.
  pub releases: BTreeMap<String, String>,
  pub builds: Vec<Build>,
}

/// One published build artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Build {
  /// Release file name, relative to the binaries URL.
  pub path: String,
  /// `0x`-prefixed Keccak-256 of the file contents.
  pub keccak256: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub long_version: Option<String>,
}

impl Manifest {
  pub fn from_json(json: &str) -> Result<Self> {
    serde_json::from_str(json).map_err(|e| Error::Parse(e.to_string()))
  }

  /// Release file name for a version string, if published.
  pub fn release_file(&self, version: &str) -> Option<&str> {
    self.releases.get(version).map(String::as_str)
  }

  /// The single build whose `path` is `file_name`.
  ///
  /// Returns `None` when no build matches or when several builds claim the
  /// same path, so inconsistent manifests are never guessed at.
  pub fn build_for(&self, file_name: &str) -> Option<&Build> {
    let mut matches = self.builds.iter().filter(|b| b.path == file_name);
    let build = matches.next()?;
    match matches.next() {
      Some(_) => None,
      None => Some(build),
    }
  }
}

/// Fetches the manifest over HTTP.
#[derive(Debug, Clone)]
pub struct ManifestClient {
  client: reqwest::Client,
  url: String,
}

impl ManifestClient {
  pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
    Self { client, url: url.into() }
  }

  /// Perform one GET of the manifest URL and parse the body.
  pub async fn fetch(&self) -> Result<Manifest> {
    info!(url = %self.url, "fetching release manifest");

    let response = self
      .client
      .get(&self.url)
      .send()
      .await
      .map_err(|e| Error::network(&self.url, e))?;

    let status = response.status();
    if !status.is_success() {
      return Err(Error::network(&self.url, format!("HTTP {}", status)));
    }

    let body = response.text().await.map_err(|e| Error::network(&self.url, e))?;
    let manifest = Manifest::from_json(&body)?;

    debug!(
      releases = manifest.releases.len(),
      builds = manifest.builds.len(),
      latest = %manifest.latest_release,
      "manifest parsed"
    );
    Ok(manifest)
  }
}

/// Build the HTTP client shared by the manifest client and the downloader.
///
/// `timeout` bounds connecting and each wait for more response data, not the
/// whole transfer, so large releases on slow links still complete.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
  reqwest::Client::builder()
    .connect_timeout(timeout)
    .read_timeout(timeout)
    .user_agent(format!("{}/{}", APP_NAME, env!("CARGO_PKG_VERSION")))
    .build()
    .map_err(|e| Error::Network {
      url: String::new(),
      message: format!("failed to create HTTP client: {}", e),
    })
}
