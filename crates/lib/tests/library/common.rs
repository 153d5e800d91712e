//! Shared helpers: a mock release server and an isolated storage root.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use mockito::{Mock, Server, ServerGuard};
use serde_json::json;
use solvm_lib::hash::hash_bytes;
use solvm_lib::{Config, Storage, VersionManager};
use tempfile::TempDir;

/// A published release served by the mock server.
pub struct Published {
  pub version: &'static str,
  pub body: &'static [u8],
}

pub const V0_8_9: Published = Published {
  version: "0.8.9",
  body: b"// soljson 0.8.9\nvar Module = { version: '0.8.9' };",
};

pub const V0_8_10: Published = Published {
  version: "0.8.10",
  body: b"// soljson 0.8.10\nvar Module = {};",
};

pub const V0_8_19: Published = Published {
  version: "0.8.19",
  body: b"// soljson 0.8.19\nvar Module = { version: '0.8.19', build: 'commit' };",
};

/// Release file name as published upstream, e.g. `soljson-v0.8.19+commit.0000000a.js`.
pub fn file_name(version: &str) -> String {
  format!("soljson-v{}+commit.{:08x}.js", version, version.len())
}

pub struct ReleaseServer {
  pub server: ServerGuard,
  pub temp: TempDir,
  _mocks: Vec<Mock>,
}

impl ReleaseServer {
  /// Serve `releases` with correct hashes and `latest` as the latest release.
  pub async fn start(releases: &[Published], latest: &str) -> Self {
    Self::start_with(releases, latest, |_, body| hash_bytes(body)).await
  }

  /// Like [`ReleaseServer::start`] but with the advertised hash computed by `advertise`.
  pub async fn start_with(
    releases: &[Published],
    latest: &str,
    advertise: impl Fn(&str, &[u8]) -> String,
  ) -> Self {
    Self::serve(releases, latest, advertise, None).await
  }

  /// Like [`ReleaseServer::start`] but `stalled` sends half its body and then
  /// pauses for three seconds before sending the rest.
  pub async fn start_stalling(releases: &[Published], latest: &str, stalled: &str) -> Self {
    Self::serve(releases, latest, |_, body| hash_bytes(body), Some(stalled)).await
  }

  async fn serve(
    releases: &[Published],
    latest: &str,
    advertise: impl Fn(&str, &[u8]) -> String,
    stalled: Option<&str>,
  ) -> Self {
    let mut server = Server::new_async().await;

    let builds: Vec<serde_json::Value> = releases
      .iter()
      .map(|r| {
        json!({
          "path": file_name(r.version),
          "version": r.version,
          "keccak256": advertise(r.version, r.body),
          "urls": []
        })
      })
      .collect();
    let files: serde_json::Map<String, serde_json::Value> = releases
      .iter()
      .map(|r| (r.version.to_string(), json!(file_name(r.version))))
      .collect();
    let manifest = json!({
      "builds": builds,
      "releases": files,
      "latestRelease": latest
    });

    let manifest_mock = server
      .mock("GET", "/list.json")
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(manifest.to_string())
      .create_async()
      .await;

    let mut mocks = vec![manifest_mock];
    for release in releases {
      let mock = server
        .mock("GET", format!("/{}", file_name(release.version)).as_str())
        .with_status(200);
      let body = release.body;
      let mock = if stalled == Some(release.version) {
        mock.with_chunked_body(move |w| {
          let (head, tail) = body.split_at(body.len() / 2);
          w.write_all(head)?;
          w.flush()?;
          std::thread::sleep(Duration::from_secs(3));
          w.write_all(tail)
        })
      } else {
        mock.with_body(body)
      };
      mocks.push(mock.create_async().await);
    }

    Self {
      server,
      temp: TempDir::new().unwrap(),
      _mocks: mocks,
    }
  }

  pub fn root(&self) -> PathBuf {
    self.temp.path().join("solc")
  }

  pub fn config(&self) -> Config {
    Config {
      root: Some(self.root()),
      binaries_url: self.server.url(),
      manifest_url: format!("{}/list.json", self.server.url()),
      ..Config::default()
    }
  }

  pub fn manager(&self) -> VersionManager {
    VersionManager::new(self.config(), Storage::new(self.root())).unwrap()
  }

  pub fn cache_path(&self, version: &str) -> PathBuf {
    self.root().join("versions").join(file_name(version))
  }

  pub fn slot_path(&self) -> PathBuf {
    self.root().join("soljson.js")
  }
}
