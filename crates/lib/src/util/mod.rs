//! Shared utilities.
//!
//! Hashing helpers used for manifest fingerprints and component GUIDs.

pub mod hash;
