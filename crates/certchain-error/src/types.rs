// Type-level error types
// These errors are raised when parsing identifiers and hashes

use std::any::Any;

use thiserror::Error;

use crate::{CertChainError, ErrorCode, ErrorDomain};

/// Types error codes start with 4000
pub mod codes {
    use crate::ErrorCode;

    pub const INVALID_HEX: ErrorCode = ErrorCode(4001);
    pub const INVALID_LENGTH: ErrorCode = ErrorCode(4002);
    pub const INVALID_TOKEN_ID: ErrorCode = ErrorCode(4003);
}

/// Errors raised by the value types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypesError {
    /// Input was not valid hexadecimal
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Input decoded to the wrong number of bytes
    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Record ids start at 1
    #[error("Invalid token id: {0}")]
    InvalidTokenId(String),
}

impl CertChainError for TypesError {
    fn error_code(&self) -> &'static str {
        match self {
            TypesError::InvalidHex(_) => "TYPES_INVALID_HEX",
            TypesError::InvalidLength { .. } => "TYPES_INVALID_LENGTH",
            TypesError::InvalidTokenId(_) => "TYPES_INVALID_TOKEN_ID",
        }
    }

    fn code(&self) -> ErrorCode {
        use codes::*;
        match self {
            TypesError::InvalidHex(_) => INVALID_HEX,
            TypesError::InvalidLength { .. } => INVALID_LENGTH,
            TypesError::InvalidTokenId(_) => INVALID_TOKEN_ID,
        }
    }

    fn domain(&self) -> ErrorDomain {
        ErrorDomain::Types
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Convenient Result type for type-level parsing
pub type TypesResult<T> = Result<T, TypesError>;
