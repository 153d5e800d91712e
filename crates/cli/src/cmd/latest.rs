use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use solvm_lib::download::interrupt_signal;

use super::download::print_download;
use super::open_manager;
use super::use_version::print_activation;

pub async fn cmd_latest(root: Option<PathBuf>) -> Result<()> {
  let manager = open_manager(root)?;
  let start = Instant::now();

  let (outcome, activation) = manager
    .download_and_use_latest(interrupt_signal())
    .await
    .context("Failed to install the latest release")?;

  print_download(&outcome, start);
  println!();
  print_activation(&activation);
  Ok(())
}
