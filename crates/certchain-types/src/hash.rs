// Content hashing
//
// Documents and audit reports are never stored, only their SHA-256 digest.
// The all-zero digest stands for "nothing uploaded yet".

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use certchain_error::{TypesError, TypesResult};

/// Length of a content hash in bytes
pub const HASH_LENGTH: usize = 32;

/// SHA-256 digest of a document or report
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ContentHash([u8; HASH_LENGTH]);

impl ContentHash {
    /// Create a hash from raw bytes
    pub const fn new(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    /// The empty (all-zero) hash
    pub const fn empty() -> Self {
        Self([0u8; HASH_LENGTH])
    }

    /// Hash arbitrary content
    pub fn of(content: impl AsRef<[u8]>) -> Self {
        let digest = Sha256::digest(content.as_ref());
        let mut bytes = [0u8; HASH_LENGTH];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    /// Whether this is the empty hash
    pub fn is_empty(&self) -> bool {
        self.0 == [0u8; HASH_LENGTH]
    }

    /// Get the raw bytes of the hash
    pub fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.0
    }

    /// Convert the hash to a hex string without prefix
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a hex string, with or without a `0x` prefix
    pub fn from_hex(hex_str: &str) -> TypesResult<Self> {
        let trimmed = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = hex::decode(trimmed).map_err(|e| TypesError::InvalidHex(e.to_string()))?;
        if bytes.len() != HASH_LENGTH {
            return Err(TypesError::InvalidLength {
                expected: HASH_LENGTH,
                actual: bytes.len(),
            });
        }
        let mut data = [0u8; HASH_LENGTH];
        data.copy_from_slice(&bytes);
        Ok(Self(data))
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash(0x{})", self.to_hex())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl FromStr for ContentHash {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_hash() {
        assert!(ContentHash::empty().is_empty());
        assert!(ContentHash::default().is_empty());
        assert!(!ContentHash::of("QMS").is_empty());
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            ContentHash::of("abc").to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hex_parsing() {
        let hash = ContentHash::of("report");
        assert_eq!(ContentHash::from_hex(&hash.to_string()).unwrap(), hash);
        assert_eq!(ContentHash::from_hex(&hash.to_hex()).unwrap(), hash);
        assert!(matches!(
            ContentHash::from_hex("0xabcd"),
            Err(TypesError::InvalidLength { expected: 32, actual: 2 })
        ));
        assert!(matches!(ContentHash::from_hex("zz"), Err(TypesError::InvalidHex(_))));
    }
}
