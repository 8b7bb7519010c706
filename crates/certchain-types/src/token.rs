// Record identifiers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use certchain_error::TypesError;

/// Identifier of a registry record. Ids are assigned from 1 and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(u64);

impl TokenId {
    /// Wrap a raw id
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw numeric value
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TokenId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for TokenId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s
            .trim()
            .parse::<u64>()
            .map_err(|e| TypesError::InvalidTokenId(format!("{}: {}", s, e)))?;
        if id == 0 {
            return Err(TypesError::InvalidTokenId("ids start at 1".to_string()));
        }
        Ok(Self(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token_id() {
        assert_eq!("42".parse::<TokenId>().unwrap(), TokenId::new(42));
        assert!(matches!("0".parse::<TokenId>(), Err(TypesError::InvalidTokenId(_))));
        assert!(matches!("abc".parse::<TokenId>(), Err(TypesError::InvalidTokenId(_))));
    }
}
