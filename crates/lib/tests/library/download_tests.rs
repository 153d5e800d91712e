//! Tests for the download flow.

use std::cell::Cell;
use std::future::{pending, ready};
use std::path::Path;
use std::time::Duration;

use solvm_lib::{Error, SolcVersion, VersionToken};

use super::common::{ReleaseServer, V0_8_9, V0_8_10, V0_8_19};

fn exact(version: &str) -> VersionToken {
  VersionToken::Exact(SolcVersion::parse(version).unwrap())
}

#[tokio::test]
async fn download_writes_verified_cache_entry() {
  let server = ReleaseServer::start(&[V0_8_9, V0_8_19], "0.8.19").await;
  let manager = server.manager();

  let outcome = manager.download(&exact("0.8.19"), false, pending()).await.unwrap();

  assert!(!outcome.was_cached);
  assert_eq!(outcome.release.version, SolcVersion::new(0, 8, 19));
  assert_eq!(outcome.path, server.cache_path("0.8.19"));
  assert_eq!(outcome.bytes, V0_8_19.body.len() as u64);
  assert_eq!(std::fs::read(&outcome.path).unwrap(), V0_8_19.body);
}

#[tokio::test]
async fn latest_token_downloads_latest_release() {
  let server = ReleaseServer::start(&[V0_8_9, V0_8_10], "0.8.10").await;

  let outcome = server
    .manager()
    .download(&VersionToken::Latest, false, pending())
    .await
    .unwrap();

  assert_eq!(outcome.release.version, SolcVersion::new(0, 8, 10));
  assert!(server.cache_path("0.8.10").is_file());
  assert!(!server.cache_path("0.8.9").exists());
}

#[tokio::test]
async fn second_download_uses_cached_entry() {
  let server = ReleaseServer::start(&[V0_8_19], "0.8.19").await;
  let manager = server.manager();

  manager.download(&exact("0.8.19"), false, pending()).await.unwrap();
  let again = manager.download(&exact("0.8.19"), false, pending()).await.unwrap();

  assert!(again.was_cached);
  assert_eq!(std::fs::read(&again.path).unwrap(), V0_8_19.body);

  let forced = manager.download(&exact("0.8.19"), true, pending()).await.unwrap();
  assert!(!forced.was_cached);
}

#[tokio::test]
async fn corrupt_cached_entry_is_replaced() {
  let server = ReleaseServer::start(&[V0_8_19], "0.8.19").await;
  std::fs::create_dir_all(server.root().join("versions")).unwrap();
  std::fs::write(server.cache_path("0.8.19"), b"truncated").unwrap();

  let outcome = server
    .manager()
    .download(&exact("0.8.19"), false, pending())
    .await
    .unwrap();

  assert!(!outcome.was_cached);
  assert_eq!(std::fs::read(server.cache_path("0.8.19")).unwrap(), V0_8_19.body);
}

#[tokio::test]
async fn hash_mismatch_leaves_no_cache_entry() {
  let server = ReleaseServer::start_with(&[V0_8_19], "0.8.19", |_, _| {
    "0x0000000000000000000000000000000000000000000000000000000000000000".to_string()
  })
  .await;
  let manager = server.manager();

  let result = manager.download(&exact("0.8.19"), false, pending()).await;

  match result {
    Err(Error::HashMismatch { expected, actual }) => {
      assert!(expected.starts_with("0x0000"));
      assert_eq!(actual, solvm_lib::hash::hash_bytes(V0_8_19.body));
    }
    other => panic!("expected hash mismatch, got {:?}", other),
  }
  assert!(!server.cache_path("0.8.19").exists());
  assert!(matches!(manager.list(), Err(Error::NoVersionsAvailable { .. })));
  assert!(matches!(
    manager.use_version(&exact("0.8.19")),
    Err(Error::VersionNotInstalled(_))
  ));
}

/// Resolves once `path` holds at least one byte, or after two seconds.
async fn first_bytes_on_disk(path: &Path, seen: &Cell<bool>) {
  for _ in 0..100 {
    if std::fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false) {
      seen.set(true);
      return;
    }
    tokio::time::sleep(Duration::from_millis(20)).await;
  }
}

#[tokio::test]
async fn interrupted_download_leaves_no_partial_file() {
  let server = ReleaseServer::start_stalling(&[V0_8_9, V0_8_19], "0.8.19", "0.8.19").await;
  let manager = server.manager();
  manager.download(&exact("0.8.9"), false, pending()).await.unwrap();

  let dest = server.cache_path("0.8.19");
  let saw_partial_bytes = Cell::new(false);
  let result = manager
    .download(&exact("0.8.19"), false, first_bytes_on_disk(&dest, &saw_partial_bytes))
    .await;

  assert!(matches!(result, Err(Error::Interrupted)));
  assert!(saw_partial_bytes.get());
  assert!(!dest.exists());

  let listed: Vec<_> = manager.list().unwrap().into_iter().filter_map(|e| e.version).collect();
  assert_eq!(listed, vec![SolcVersion::new(0, 8, 9)]);
  assert!(matches!(
    manager.use_version(&exact("0.8.19")),
    Err(Error::VersionNotInstalled(_))
  ));
}

#[tokio::test]
async fn interrupt_before_transfer_creates_nothing() {
  let server = ReleaseServer::start(&[V0_8_19], "0.8.19").await;
  let manager = server.manager();

  let result = manager.download(&exact("0.8.19"), false, ready(())).await;

  assert!(matches!(result, Err(Error::Interrupted)));
  assert!(!server.cache_path("0.8.19").exists());
}

#[tokio::test]
async fn unknown_version_is_not_found() {
  let server = ReleaseServer::start(&[V0_8_19], "0.8.19").await;

  let result = server.manager().download(&exact("0.4.26"), false, pending()).await;

  assert!(matches!(result, Err(Error::VersionNotFound(v)) if v == "0.4.26"));
  assert!(!server.root().join("versions").exists());
}

#[tokio::test]
async fn inconsistent_latest_release_fails_closed() {
  let server = ReleaseServer::start(&[V0_8_19], "0.8.20").await;

  let result = server.manager().download(&VersionToken::Latest, false, pending()).await;

  assert!(matches!(result, Err(Error::VersionNotFound(v)) if v == "0.8.20"));
}

#[tokio::test]
async fn available_lists_newest_first() {
  let server = ReleaseServer::start(&[V0_8_9, V0_8_19, V0_8_10], "0.8.19").await;
  let manager = server.manager();
  manager.download(&exact("0.8.10"), false, pending()).await.unwrap();

  let available = manager.available().await.unwrap();

  let versions: Vec<String> = available.iter().map(|r| r.version.to_string()).collect();
  assert_eq!(versions, vec!["0.8.19", "0.8.10", "0.8.9"]);
  assert!(available[0].is_latest);
  assert!(!available[0].is_installed);
  assert!(available[1].is_installed);
}
