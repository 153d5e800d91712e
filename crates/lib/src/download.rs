//! Streaming downloads into the version cache.
//!
//! The destination file is owned by a [`PartialDownload`] guard from the moment
//! it is created until the content has been verified. Every other exit path
//! (transport failure, hash mismatch, cancellation) deletes it, so a cache
//! entry only exists once its hash has matched.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use serde::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::hash::{self, ContentHasher};
use crate::{Error, Result};

/// Outcome of a verified download.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadReport {
  pub path: PathBuf,
  pub bytes: u64,
  pub keccak256: String,
}

/// A destination file that is deleted unless explicitly kept.
///
/// Nothing touches the filesystem until [`PartialDownload::open`]. From then on
/// the guard owns the file on disk and removes it unless it is persisted.
pub struct PartialDownload {
  path: PathBuf,
  file: Option<fs::File>,
}

impl PartialDownload {
  pub fn new(path: &Path) -> Self {
    Self {
      path: path.to_path_buf(),
      file: None,
    }
  }

  /// Remove whatever is at the destination and create an empty file in its place.
  pub async fn open(&mut self) -> Result<()> {
    match fs::remove_file(&self.path).await {
      Ok(()) => debug!(path = ?self.path, "removed existing file"),
      Err(e) if e.kind() == io::ErrorKind::NotFound => {}
      Err(e) => return Err(Error::io(&self.path, e)),
    }

    let file = fs::File::create(&self.path).await.map_err(|e| Error::io(&self.path, e))?;
    self.file = Some(file);
    Ok(())
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  async fn write(&mut self, chunk: &[u8]) -> Result<()> {
    let file = self
      .file
      .as_mut()
      .ok_or_else(|| Error::io(&self.path, io::Error::other("download file is not open")))?;
    file.write_all(chunk).await.map_err(|e| Error::io(&self.path, e))
  }

  /// Flush to disk and keep the file.
  pub async fn persist(mut self) -> Result<PathBuf> {
    let mut file = self
      .file
      .take()
      .ok_or_else(|| Error::io(&self.path, io::Error::other("download file is not open")))?;
    file.flush().await.map_err(|e| Error::io(&self.path, e))?;
    file.sync_all().await.map_err(|e| Error::io(&self.path, e))?;
    Ok(std::mem::take(&mut self.path))
  }

  /// Close and delete the file, reporting a failed removal.
  ///
  /// A guard that was never opened leaves the destination untouched.
  pub fn discard(mut self) -> io::Result<()> {
    match self.file.take() {
      Some(file) => {
        drop(file);
        remove_partial(&self.path)
      }
      None => Ok(()),
    }
  }

  /// Discard the file and return `primary`, or a [`Error::Cleanup`] carrying
  /// both failures when the removal itself fails.
  fn abandon(self, primary: Error) -> Error {
    let path = self.path.clone();
    match self.discard() {
      Ok(()) => primary,
      Err(source) => Error::Cleanup {
        primary: Box::new(primary),
        path,
        source,
      },
    }
  }
}

impl Drop for PartialDownload {
  fn drop(&mut self) {
    // Only reached when neither persist nor discard ran, e.g. the owning
    // future was dropped mid-transfer.
    if self.file.take().is_none() {
      return;
    }
    if let Err(e) = remove_partial(&self.path) {
      warn!(path = ?self.path, error = %e, "failed to remove partial download");
    }
  }
}

fn remove_partial(path: &Path) -> io::Result<()> {
  match std::fs::remove_file(path) {
    Ok(()) => {
      debug!(path = ?path, "removed partial download");
      Ok(())
    }
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
    Err(e) => Err(e),
  }
}

/// Streams release binaries to disk.
#[derive(Debug, Clone)]
pub struct Downloader {
  client: reqwest::Client,
}

impl Downloader {
  pub fn new(client: reqwest::Client) -> Self {
    Self { client }
  }

  /// Download `url` to `dest` and verify it against `expected_hash`.
  ///
  /// `cancel` is polled before `dest` is touched, so a signal listener it
  /// wraps is registered before any file exists. Any existing file at `dest`
  /// is then removed. If `cancel` completes before the transfer does, the
  /// partial file is deleted and [`Error::Interrupted`] is returned. The file
  /// is also deleted on transport errors and on a hash mismatch.
  pub async fn fetch<F>(&self, url: &str, dest: &Path, expected_hash: &str, cancel: F) -> Result<DownloadReport>
  where
    F: Future<Output = ()>,
  {
    info!(url = %url, dest = ?dest, "downloading");

    let mut partial = PartialDownload::new(dest);

    let outcome = tokio::select! {
      biased;
      _ = cancel => None,
      result = self.stream_to(url, &mut partial) => Some(result),
    };

    let (bytes, actual_hash) = match outcome {
      None => {
        warn!(path = ?dest, "download interrupted, removing partial file");
        return Err(partial.abandon(Error::Interrupted));
      }
      Some(Err(e)) => return Err(partial.abandon(e)),
      Some(Ok(streamed)) => streamed,
    };

    if let Err(e) = hash::verify_digest(&actual_hash, expected_hash) {
      warn!(path = ?dest, expected = %expected_hash, actual = %actual_hash, "hash mismatch, removing file");
      return Err(partial.abandon(e));
    }

    let path = partial.persist().await?;
    info!(path = ?path, size = bytes, "download complete");

    Ok(DownloadReport {
      path,
      bytes,
      keccak256: actual_hash,
    })
  }

  async fn stream_to(&self, url: &str, partial: &mut PartialDownload) -> Result<(u64, String)> {
    partial.open().await?;
    let response = self.client.get(url).send().await.map_err(|e| Error::network(url, e))?;

    let status = response.status();
    if !status.is_success() {
      return Err(Error::network(url, format!("HTTP {}", status)));
    }

    let mut hasher = ContentHasher::new();
    let mut written: u64 = 0;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
      let chunk = chunk.map_err(|e| Error::network(url, e))?;
      hasher.update(&chunk);
      partial.write(&chunk).await?;
      written += chunk.len() as u64;
    }

    Ok((written, hasher.finalize_hex()))
  }
}

/// Resolves when the user presses Ctrl+C.
///
/// If the handler cannot be installed this never resolves, so downloads run
/// to completion rather than being cancelled immediately.
pub async fn interrupt_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(error = %e, "failed to listen for Ctrl+C");
    std::future::pending::<()>().await;
  }
}
