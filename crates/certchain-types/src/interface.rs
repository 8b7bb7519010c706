// Capability group identifiers
//
// A four-byte identifier naming a group of operations. Rendered and parsed
// as `0x`-prefixed hex, e.g. `0x80ac58cd`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use certchain_error::{TypesError, TypesResult};

/// Identifier of a capability group
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InterfaceId([u8; 4]);

impl InterfaceId {
    /// The capability-query capability itself
    pub const CAPABILITY_QUERY: InterfaceId = InterfaceId([0x01, 0xff, 0xc9, 0xa7]);
    /// Core ownership, transfer and approval operations
    pub const OWNERSHIP: InterfaceId = InterfaceId([0x80, 0xac, 0x58, 0xcd]);
    /// Record existence query
    pub const EXISTENCE: InterfaceId = InterfaceId([0x4f, 0x55, 0x8e, 0x79]);
    /// Global and per-owner enumeration
    pub const ENUMERATION: InterfaceId = InterfaceId([0x78, 0x0e, 0x9d, 0x63]);
    /// Name, symbol and record URI
    pub const METADATA: InterfaceId = InterfaceId([0x5b, 0x5e, 0x13, 0x9f]);
    /// Reserved, never a valid capability
    pub const INVALID: InterfaceId = InterfaceId([0xff, 0xff, 0xff, 0xff]);

    /// Create an identifier from raw bytes
    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Parse a hex string, with or without a `0x` prefix
    pub fn from_hex(hex_str: &str) -> TypesResult<Self> {
        let trimmed = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = hex::decode(trimmed).map_err(|e| TypesError::InvalidHex(e.to_string()))?;
        let bytes: [u8; 4] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| TypesError::InvalidLength {
                expected: 4,
                actual: bytes.len(),
            })?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InterfaceId({})", self)
    }
}

impl fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for InterfaceId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for InterfaceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for InterfaceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
