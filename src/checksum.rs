//! Schema fingerprints
//!
//! SHA-256 over the compact JSON of an emitted document. Key order is the
//! emitter's insertion order, so equal definitions always hash the same.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA256 checksum of a schema document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(String);

impl Checksum {
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    /// Checksum of a JSON document in compact form
    pub fn from_json(value: &serde_json::Value) -> Self {
        Self::from_bytes(value.to_string().as_bytes())
    }

    /// Get the hex string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix suitable for ETags and log lines
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }

    pub fn verify_json(&self, value: &serde_json::Value) -> bool {
        *self == Self::from_json(value)
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_checksum_consistency() {
        let doc = json!({ "type": "integer", "minimum": 1 });
        assert_eq!(Checksum::from_json(&doc), Checksum::from_json(&doc.clone()));
        assert_eq!(Checksum::from_json(&doc).as_str().len(), 64);
    }

    #[test]
    fn test_checksum_different_content() {
        let a = Checksum::from_json(&json!({ "minimum": 1 }));
        let b = Checksum::from_json(&json!({ "minimum": 2 }));
        assert_ne!(a, b);
        assert!(a.verify_json(&json!({ "minimum": 1 })));
        assert_eq!(a.short().len(), 12);
    }
}
