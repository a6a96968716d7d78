//! Content fingerprints for exact-duplicate detection.

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

/// 128-bit MD5 digest of a content's UTF-8 bytes, rendered as lower-case hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint a content string.
    pub fn of(content: &str) -> Self {
        Self(hex::encode(Md5::digest(content.as_bytes())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
