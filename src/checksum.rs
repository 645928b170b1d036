//! Digest of export output, for checking that an export is byte-stable

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 of an export document, as lowercase hex
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExportDigest(String);

impl ExportDigest {
    /// Digest of raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    /// Digest of export text
    pub fn of(content: &str) -> Self {
        Self::from_bytes(content.as_bytes())
    }

    /// Short form for log lines
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }

    /// Verify that content matches this digest
    pub fn verify(&self, content: &str) -> bool {
        Self::of(content) == *self
    }
}

impl fmt::Display for ExportDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_consistency() {
        let content = r#"{"DrawingTablets": []}"#;
        assert_eq!(ExportDigest::of(content), ExportDigest::of(content));
    }

    #[test]
    fn test_digest_known_value() {
        assert_eq!(
            ExportDigest::of("").to_string(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(ExportDigest::of("").short(), "e3b0c44298fc");
    }

    #[test]
    fn test_digest_verification() {
        let content = r#"{"DrawingTablets": [{"ModelBrand": "Wacom"}]}"#;
        let digest = ExportDigest::of(content);
        assert!(digest.verify(content));
        assert!(!digest.verify(r#"{"DrawingTablets": []}"#));
    }
}
