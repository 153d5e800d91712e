use std::path::PathBuf;

use anyhow::Result;

use super::open_manager;
use crate::output::{OutputFormat, print_info, print_json, print_stat, print_success};

pub fn cmd_current(output: OutputFormat, root: Option<PathBuf>) -> Result<()> {
  let manager = open_manager(root)?;
  let current = manager.current()?;

  if output.is_json() {
    print_json(&current)?;
    return Ok(());
  }

  match current {
    Some(entry) => {
      match &entry.version {
        Some(version) => print_success(&format!("Using solc {}", version)),
        None => print_success(&format!("Using {}", entry.file_name)),
      }
      print_stat("File", &entry.path.display().to_string());
      print_stat("Active", &manager.storage().active_slot().path().display().to_string());
    }
    None => print_info("No downloaded version is active"),
  }
  Ok(())
}
