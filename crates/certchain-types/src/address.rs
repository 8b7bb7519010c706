// Participant identities
//
// Every party known to the registry (companies, auditors, operators, the
// registry owner) is an `Address`. One reserved value, the zero address,
// means "no one".

use std::fmt;

use serde::{Deserialize, Serialize};

/// Textual form of the sentinel identity
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Address represents an identity in the system, such as a company, an auditor or the registry owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address {
    /// The string representation of the address
    inner: String,
}

impl Address {
    /// Create a new address from a string
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            inner: address.into(),
        }
    }

    /// The sentinel identity, used as `from` on creation and `to` on destruction
    pub fn zero() -> Self {
        Self::new(ZERO_ADDRESS)
    }

    /// Whether this is the sentinel identity
    pub fn is_zero(&self) -> bool {
        self.inner == ZERO_ADDRESS
    }

    /// Get the string representation of the address
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Get the byte representation of the address
    pub fn as_bytes(&self) -> &[u8] {
        self.inner.as_bytes()
    }
}

impl Default for Address {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<String> for Address {
    fn from(address: String) -> Self {
        Self { inner: address }
    }
}

impl From<&str> for Address {
    fn from(address: &str) -> Self {
        Self {
            inner: address.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_address_is_sentinel() {
        assert!(Address::zero().is_zero());
        assert!(Address::from(ZERO_ADDRESS).is_zero());
        assert!(Address::default().is_zero());
        assert!(!Address::from("alice").is_zero());
    }

    #[test]
    fn test_address_serializes_as_plain_string() {
        let json = serde_json::to_string(&Address::from("auditor")).unwrap();
        assert_eq!(json, "\"auditor\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back.as_str(), "auditor");
    }
}
