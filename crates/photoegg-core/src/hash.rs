//! Hothash: the content identity of a photo.
//!
//! The hothash is the SHA-256 of the hot preview's JPEG bytes, rendered as
//! 64 lowercase hex characters. It is not a hash of the uploaded file.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Length of a hothash in hex characters.
pub const HOTHASH_LEN: usize = 64;

/// Lowercase hex SHA-256 digest of a hot preview.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hothash(String);

impl Hothash {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// First `n` characters, used for fallback filenames.
    pub fn prefix(&self, n: usize) -> &str {
        &self.0[..n.min(self.0.len())]
    }
}

impl fmt::Display for Hothash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Hothash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Compute the hothash of encoded hot preview bytes.
pub fn hothash(bytes: &[u8]) -> Hothash {
    Hothash(hex::encode(Sha256::digest(bytes)))
}

/// Check bytes against an expected hothash, ignoring hex case.
pub fn verify(bytes: &[u8], expected: &str) -> bool {
    expected.len() == HOTHASH_LEN && hothash(bytes).as_str().eq_ignore_ascii_case(expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digests() {
        assert_eq!(
            hothash(b"").as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            hothash(b"abc").as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_format() {
        let hash = hothash(&[0xFF, 0xD8, 0xFF, 0xD9]);
        assert_eq!(hash.as_str().len(), HOTHASH_LEN);
        assert!(hash
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_verify() {
        let bytes = b"preview bytes";
        let hash = hothash(bytes);
        assert!(verify(bytes, hash.as_str()));
        assert!(verify(bytes, &hash.as_str().to_uppercase()));
        assert!(!verify(b"other bytes", hash.as_str()));
        assert!(!verify(bytes, &hash.as_str()[..32]));
        assert!(!verify(bytes, ""));
    }

    #[test]
    fn test_prefix_and_serde() {
        let hash = hothash(b"abc");
        assert_eq!(hash.prefix(8), "ba7816bf");
        assert_eq!(hash.prefix(100).len(), HOTHASH_LEN);

        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", hash));
    }
}
