mod current;
mod download;
mod latest;
mod list;
mod use_version;

use std::path::PathBuf;

use anyhow::Result;
use solvm_lib::{Config, NpmLocator, VersionManager};
use tracing::debug;

pub use current::cmd_current;
pub use download::cmd_download;
pub use latest::cmd_latest;
pub use list::cmd_list;
pub use use_version::cmd_use;

/// Resolve configuration and the storage root, with `--root` taking precedence over `SOLVM_ROOT`.
fn open_manager(root: Option<PathBuf>) -> Result<VersionManager> {
  let mut config = Config::from_env();
  if root.is_some() {
    config.root = root;
  }
  let manager = VersionManager::locate(config, &NpmLocator::from_current_dir())?;
  debug!(root = ?manager.storage().root(), "using storage root");
  Ok(manager)
}
