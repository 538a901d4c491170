//! Request fingerprinting: a stable 64-hex-char cache key derived from a
//! canonicalized source URL.

use sha2::{Digest, Sha256};

/// A `sha256(canonical_url)` hex digest. Always exactly 64 lowercase hex
/// characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of_url(url: &str) -> Self {
        let canonical = canonicalize(url);
        let digest = Sha256::digest(canonical.as_bytes());
        Self(hex::encode(digest))
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

/// Strips a trailing `#fragment` and trims surrounding whitespace.
fn canonicalize(url: &str) -> String {
    let trimmed = url.trim();
    match trimmed.find('#') {
        Some(idx) => trimmed[..idx].to_string(),
        None => trimmed.to_string(),
    }
}
