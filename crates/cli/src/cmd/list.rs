use std::path::PathBuf;

use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;
use solvm_lib::{CacheEntry, VersionManager};

use super::open_manager;
use crate::output::{OutputFormat, print_info, print_json, symbols};

pub async fn cmd_list(remote: bool, output: OutputFormat, root: Option<PathBuf>) -> Result<()> {
  let manager = open_manager(root)?;
  if remote {
    list_remote(&manager, output).await
  } else {
    list_installed(&manager, output)
  }
}

fn list_installed(manager: &VersionManager, output: OutputFormat) -> Result<()> {
  let mut entries = manager.list()?;
  entries.sort_by(|a, b| b.version.cmp(&a.version));
  let current = manager.current()?;

  if output.is_json() {
    #[derive(Serialize)]
    struct ListOutput {
      versions: Vec<CacheEntry>,
      current: Option<String>,
    }

    print_json(&ListOutput {
      versions: entries,
      current: current.map(|entry| entry.file_name),
    })?;
    return Ok(());
  }

  for entry in &entries {
    let is_current = current.as_ref().is_some_and(|c| c.file_name == entry.file_name);
    let marker = if is_current { symbols::ARROW } else { " " };
    let version = entry
      .version
      .as_ref()
      .map(ToString::to_string)
      .unwrap_or_else(|| "?".to_string());

    if is_current {
      println!(
        "{} {:<10} {}",
        marker.if_supports_color(Stream::Stdout, |s| s.green()),
        version.if_supports_color(Stream::Stdout, |s| s.green()),
        entry.file_name.if_supports_color(Stream::Stdout, |s| s.dimmed())
      );
    } else {
      println!(
        "{} {:<10} {}",
        marker,
        version,
        entry.file_name.if_supports_color(Stream::Stdout, |s| s.dimmed())
      );
    }
  }

  print_info(&format!("{} version(s) installed", entries.len()));
  Ok(())
}

async fn list_remote(manager: &VersionManager, output: OutputFormat) -> Result<()> {
  let releases = manager.available().await.context("Failed to list remote releases")?;

  if output.is_json() {
    print_json(&releases)?;
    return Ok(());
  }

  for release in &releases {
    let mut tags = Vec::new();
    if release.is_latest {
      tags.push("latest");
    }
    if release.is_installed {
      tags.push("installed");
    }
    let tags = if tags.is_empty() {
      String::new()
    } else {
      format!(" ({})", tags.join(", "))
    };
    println!(
      "  {:<10}{}",
      release.version.to_string(),
      tags.if_supports_color(Stream::Stdout, |s| s.dimmed())
    );
  }

  print_info(&format!("{} release(s) available", releases.len()));
  Ok(())
}
