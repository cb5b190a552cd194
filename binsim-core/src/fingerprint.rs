//! Configuration fingerprints.
//!
//! A fingerprint is the BLAKE3 hash of a value's canonical JSON form. Two runs
//! with the same fingerprint were fed identical parameters, so their results
//! are comparable seed for seed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hex-encoded BLAKE3 hash of a serialized configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigHash(pub String);

impl ConfigHash {
    pub fn of<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        let bytes = serde_json::to_vec(value)?;
        Ok(Self(blake3::hash(&bytes).to_hex().to_string()))
    }

    /// First 12 hex characters, for file names and log lines.
    ///
    /// Falls back to the whole value when it is shorter or the cut would
    /// split a character, which only happens for hand-edited summaries.
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl fmt::Display for ConfigHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
