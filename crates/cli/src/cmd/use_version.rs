use std::path::PathBuf;

use anyhow::{Context, Result};
use solvm_lib::{Activation, Lookup, VersionToken};

use super::open_manager;
use crate::output::{format_bytes, print_stat, print_success};

pub fn cmd_use(version: &str, root: Option<PathBuf>) -> Result<()> {
  let token = VersionToken::parse(version, Lookup::Installed)?;
  let manager = open_manager(root)?;

  let activation = manager
    .use_version(&token)
    .with_context(|| format!("Failed to use {}", token))?;

  print_activation(&activation);
  Ok(())
}

pub(super) fn print_activation(activation: &Activation) {
  let label = match &activation.version {
    Some(version) => format!("solc {}", version),
    None => activation.source.display().to_string(),
  };
  print_success(&format!("Now using {}", label));
  print_stat("Source", &activation.source.display().to_string());
  print_stat("Active", &activation.slot.display().to_string());
  print_stat("Size", &format_bytes(activation.bytes));
}
