//! Shared test helpers for CLI integration tests.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Child, Stdio};
use std::time::Duration;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use mockito::{Mock, Server, ServerGuard};
use serde_json::json;
use solvm_lib::hash::hash_bytes;
use tempfile::TempDir;

/// A release published by the mock server.
pub struct Release {
  pub version: &'static str,
  pub body: &'static [u8],
}

pub const V0_8_9: Release = Release {
  version: "0.8.9",
  body: b"// soljson 0.8.9\nvar Module = { version: '0.8.9', padding: '................' };",
};

pub const V0_8_10: Release = Release {
  version: "0.8.10",
  body: b"// soljson 0.8.10\nvar Module = {};",
};

pub const V0_8_19: Release = Release {
  version: "0.8.19",
  body: b"// soljson 0.8.19\nvar Module = { version: '0.8.19' };",
};

/// Release file name in the upstream naming scheme.
pub fn file_name(version: &str) -> String {
  format!("soljson-v{}+commit.{:08x}.js", version, version.len())
}

/// Isolated test environment.
///
/// Each test gets its own storage root and its own mock release server.
pub struct TestEnv {
  pub temp: TempDir,
  pub server: ServerGuard,
  mocks: Vec<Mock>,
}

impl TestEnv {
  pub fn new() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
      server: Server::new(),
      mocks: Vec::new(),
    }
  }

  /// Publish `releases` with correct hashes and `latest` as the latest release.
  pub fn publish(&mut self, releases: &[Release], latest: &str) {
    self.publish_with(releases, latest, |release| hash_bytes(release.body));
  }

  /// Publish `releases`, advertising the hash returned by `advertise`.
  pub fn publish_with(&mut self, releases: &[Release], latest: &str, advertise: impl Fn(&Release) -> String) {
    self.serve(releases, latest, advertise, None);
  }

  /// Publish `releases`; `stalled` sends half its body, then pauses for three seconds.
  pub fn publish_stalling(&mut self, releases: &[Release], latest: &str, stalled: &str) {
    self.serve(releases, latest, |release| hash_bytes(release.body), Some(stalled));
  }

  fn serve(
    &mut self,
    releases: &[Release],
    latest: &str,
    advertise: impl Fn(&Release) -> String,
    stalled: Option<&str>,
  ) {
    let builds: Vec<serde_json::Value> = releases
      .iter()
      .map(|r| json!({ "path": file_name(r.version), "version": r.version, "keccak256": advertise(r) }))
      .collect();
    let files: serde_json::Map<String, serde_json::Value> = releases
      .iter()
      .map(|r| (r.version.to_string(), json!(file_name(r.version))))
      .collect();
    let manifest = json!({ "builds": builds, "releases": files, "latestRelease": latest });

    let mock = self
      .server
      .mock("GET", "/list.json")
      .with_status(200)
      .with_body(manifest.to_string())
      .create();
    self.mocks.push(mock);

    for release in releases {
      let mock = self
        .server
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
      self.mocks.push(mock.create());
    }
  }

  /// Storage root (isolated per test).
  pub fn root_path(&self) -> PathBuf {
    let p = self.temp.path().join("solc");
    std::fs::create_dir_all(&p).unwrap();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  pub fn cache_file(&self, version: &str) -> PathBuf {
    self.root_path().join("versions").join(file_name(version))
  }

  pub fn slot_path(&self) -> PathBuf {
    self.root_path().join("soljson.js")
  }

  /// Write a release straight into the cache, bypassing the server.
  pub fn seed(&self, release: &Release) {
    let path = self.cache_file(release.version);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, release.body).unwrap();
  }

  /// Get a pre-configured Command for the solvm binary.
  ///
  /// Sets environment variables for isolated testing:
  /// - `SOLVM_ROOT`: Isolated storage root
  /// - `SOLVM_BINARIES_URL`: The mock server, which also serves `list.json`
  pub fn solvm_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("solvm");
    cmd.env("SOLVM_ROOT", self.root_path());
    cmd.env("SOLVM_BINARIES_URL", self.server.url());
    cmd.env_remove("SOLVM_MANIFEST_URL");
    cmd.env_remove("RUST_LOG");
    cmd
  }

  /// Start the solvm binary in the background with the same isolated environment.
  pub fn spawn(&self, args: &[&str]) -> Child {
    std::process::Command::new(env!("CARGO_BIN_EXE_solvm"))
      .args(args)
      .env("SOLVM_ROOT", self.root_path())
      .env("SOLVM_BINARIES_URL", self.server.url())
      .env_remove("SOLVM_MANIFEST_URL")
      .env_remove("RUST_LOG")
      .stdout(Stdio::null())
      .stderr(Stdio::null())
      .spawn()
      .unwrap()
  }
}
