//! solvm-lib: core types and logic for solvm
//!
//! This crate resolves, downloads and activates `soljson.js` compiler releases:
//! - `Manifest`: the remote index of published releases and their hashes
//! - `VersionToken`: a validated `x.y.z` / `latest` / `newest` request
//! - `VersionCache`: downloaded releases under `<root>/versions/`
//! - `ActiveSlot`: the single `<root>/soljson.js` read by dependent tooling
//! - `VersionManager`: the download, use, list and latest flows

pub mod activate;
pub mod cache;
pub mod config;
pub mod consts;
pub mod download;
pub mod error;
pub mod hash;
pub mod manager;
pub mod manifest;
pub mod resolve;
pub mod storage;
pub mod version;

pub use activate::{ActiveSlot, Activation};
pub use cache::{CacheEntry, VersionCache};
pub use config::Config;
pub use error::Error;
pub use manager::{AvailableRelease, DownloadOutcome, VersionManager};
pub use manifest::Manifest;
pub use storage::{NpmLocator, Storage, StorageLocator};
pub use version::{Lookup, SolcVersion, VersionToken};

/// Result type for solvm operations
pub type Result<T> = std::result::Result<T, Error>;
