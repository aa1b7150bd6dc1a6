//! Hashing utilities for fingerprints and deterministic GUIDs.
//!
//! This module provides:
//! - `ObjectHash`: A truncated 20-character hash identifying a serialized value
//! - `ContentHash`: A full 64-character hash of arbitrary bytes
//! - `stable_guid()`: A v5 GUID derived from a seed and a name, identical across runs

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::consts::OBJ_HASH_PREFIX_LEN;

pub type HashError = serde_json::Error;

/// A hash identifying a serialized value, e.g. a loaded manifest.
///
/// The hash is a 20-character truncated SHA-256 of the JSON-serialized struct.
///
/// # Format
///
/// The hash is a lowercase hexadecimal string, e.g., `"a1b2c3d4e5f6789012ab"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectHash(pub String);

impl std::fmt::Display for ObjectHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

pub trait Hashable: Serialize {
  fn compute_hash(&self) -> Result<ObjectHash, HashError> {
    let serialized = serde_json::to_string(self)?;
    let mut hasher = Sha256::new();
    hasher.update(serialized.as_bytes());
    let full = hex::encode(hasher.finalize());
    Ok(ObjectHash(full[..OBJ_HASH_PREFIX_LEN].to_string()))
  }
}

/// A full 64-character SHA256 hash of some content, such as a rendered document.
///
/// # Format
///
/// The hash is a lowercase hexadecimal string (64 characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Hash arbitrary bytes.
///
/// Returns the full 64-character SHA256 hash.
pub fn hash_bytes(data: &[u8]) -> ContentHash {
  let mut hasher = Sha256::new();
  hasher.update(data);
  ContentHash(hex::encode(hasher.finalize()))
}

/// Derive an upper-case GUID from `seed` and `name`.
///
/// Components need a GUID that stays the same from one build to the next, so
/// it is a name-based (v5) UUID of the component id instead of a random one.
/// A seed that is itself a GUID is the namespace; any other seed is first
/// hashed into one.
///
/// ```ignore
/// let guid = stable_guid("6f330b47-2577-43ad-9095-1861ba25889b", "Component.app.exe");
/// assert_eq!(guid.len(), 36);
/// ```
pub fn stable_guid(seed: &str, name: &str) -> String {
  let namespace = Uuid::parse_str(seed.trim_matches(['{', '}']))
    .unwrap_or_else(|_| Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.to_lowercase().as_bytes()));
  Uuid::new_v5(&namespace, name.as_bytes())
    .hyphenated()
    .encode_upper(&mut Uuid::encode_buffer())
    .to_string()
}
