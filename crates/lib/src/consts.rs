//! Names, paths and defaults shared across the crate.

pub const APP_NAME: &str = "solvm";

/// npm package whose directory holds the storage root when no root is configured.
pub const DEFAULT_PACKAGE: &str = "solc";

pub const DEFAULT_BINARIES_URL: &str = "https://binaries.soliditylang.org/bin";
pub const MANIFEST_FILENAME: &str = "list.json";

/// Subdirectory of the storage root holding downloaded releases.
pub const VERSIONS_DIR: &str = "versions";

/// The active binary slot, relative to the storage root.
pub const ACTIVE_SLOT_FILENAME: &str = "soljson.js";

pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

pub const ENV_ROOT: &str = "SOLVM_ROOT";
pub const ENV_PACKAGE: &str = "SOLVM_PACKAGE";
pub const ENV_BINARIES_URL: &str = "SOLVM_BINARIES_URL";
pub const ENV_MANIFEST_URL: &str = "SOLVM_MANIFEST_URL";
pub const ENV_TIMEOUT_SECS: &str = "SOLVM_TIMEOUT_SECS";
