//! Keccak-256 content hashing in the release manifest's `0x`-prefixed format.
//!
//! The manifest publishes legacy Keccak-256 digests (the pre-standard padding),
//! which differ from SHA3-256 for every input.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sha3::{Digest, Keccak256};
use tracing::debug;

use crate::{Error, Result};

const HASH_PREFIX: &str = "0x";

/// Incremental hasher for streamed downloads.
#[derive(Default)]
pub struct ContentHasher(Keccak256);

impl ContentHasher {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn update(&mut self, data: &[u8]) {
    self.0.update(data);
  }

  /// Finish hashing and return `0x` followed by 64 lowercase hex characters.
  pub fn finalize_hex(self) -> String {
    format!("{}{}", HASH_PREFIX, hex::encode(self.0.finalize()))
  }
}

/// Hash arbitrary bytes.
pub fn hash_bytes(data: &[u8]) -> String {
  let mut hasher = ContentHasher::new();
  hasher.update(data);
  hasher.finalize_hex()
}

/// Hash a file's contents.
pub fn hash_file(path: &Path) -> Result<String> {
  let file = File::open(path).map_err(|e| Error::io(path, e))?;
  let mut reader = BufReader::new(file);
  let mut hasher = ContentHasher::new();

  let mut buffer = [0u8; 8192];
  loop {
    let bytes_read = reader.read(&mut buffer).map_err(|e| Error::io(path, e))?;
    if bytes_read == 0 {
      break;
    }
    hasher.update(&buffer[..bytes_read]);
  }

  Ok(hasher.finalize_hex())
}

/// Check `bytes` against the manifest-supplied hash.
pub fn verify(bytes: &[u8], expected: &str) -> Result<()> {
  verify_digest(&hash_bytes(bytes), expected)
}

/// Compare an already computed digest with the expected one.
///
/// The comparison is byte-exact: an uppercase expected hash does not match.
pub fn verify_digest(actual: &str, expected: &str) -> Result<()> {
  if actual != expected {
    return Err(Error::HashMismatch {
      expected: expected.to_string(),
      actual: actual.to_string(),
    });
  }
  debug!(hash = %expected, "hash verified");
  Ok(())
}
