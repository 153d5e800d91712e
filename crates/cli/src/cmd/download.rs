use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use solvm_lib::download::interrupt_signal;
use solvm_lib::{DownloadOutcome, Lookup, VersionToken};

use super::open_manager;
use crate::output::{format_bytes, format_duration, print_info, print_stat, print_success};

pub async fn cmd_download(version: &str, force: bool, root: Option<PathBuf>) -> Result<()> {
  let token = VersionToken::parse(version, Lookup::Remote)?;
  let manager = open_manager(root)?;
  let start = Instant::now();

  let outcome = manager
    .download(&token, force, interrupt_signal())
    .await
    .with_context(|| format!("Failed to download {}", token))?;

  print_download(&outcome, start);
  print_info(&format!("Run 'solvm use {}' to activate it", outcome.release.version));
  Ok(())
}

pub(super) fn print_download(outcome: &DownloadOutcome, start: Instant) {
  if outcome.was_cached {
    print_info(&format!(
      "solc {} is already downloaded (use --force to download again)",
      outcome.release.version
    ));
  } else {
    print_success(&format!("Downloaded solc {}", outcome.release.version));
    print_stat("Size", &format_bytes(outcome.bytes));
    print_stat("Duration", &format_duration(start.elapsed()));
  }
  print_stat("File", &outcome.path.display().to_string());
  print_stat("Keccak-256", &outcome.release.keccak256);
}
