// CertChain Error Handling Framework
// Central location for error types, codes, and handling utilities

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;

// Re-export thiserror for crates deriving their own errors
pub use thiserror;

// Module structure
mod macros;

// Include sub-modules
mod config;
mod registry;
mod types;

// Public exports
pub use config::{ConfigError, ConfigResult};
pub use registry::{codes, RegistryError, RegistryResult};
pub use types::{TypesError, TypesResult};

/// Error domains representing different components of the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorDomain {
    Registry,
    Workflow,
    Config,
    Types,
}

impl fmt::Display for ErrorDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorDomain::Registry => write!(f, "registry"),
            ErrorDomain::Workflow => write!(f, "workflow"),
            ErrorDomain::Config => write!(f, "config"),
            ErrorDomain::Types => write!(f, "types"),
        }
    }
}

/// Error code structure for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ErrorCode(pub u32);

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

/// Standard error message format for serialization
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ErrorMessage {
    pub code: ErrorCode,
    pub domain: ErrorDomain,
    pub error_code: String,
    pub message: String,
}

impl ErrorMessage {
    /// Render any CertChain error into its serializable form
    pub fn from_error(err: &dyn CertChainError) -> Self {
        Self {
            code: err.code(),
            domain: err.domain(),
            error_code: err.error_code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Base trait for all errors in the CertChain system.
pub trait CertChainError: StdError + fmt::Debug + fmt::Display + Send + Sync + Any + 'static {
    /// Returns a unique static string code for this error type.
    fn error_code(&self) -> &'static str;

    /// Numeric code, unique across the workspace.
    fn code(&self) -> ErrorCode;

    /// The component that raised this error.
    fn domain(&self) -> ErrorDomain;

    /// Converts the error into a boxed trait object.
    fn into_boxed(self) -> BoxError
    where
        Self: Sized,
    {
        Box::new(self)
    }

    /// Returns this error as a `&dyn Any` to allow downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// Shorthand for a boxed CertChainError
pub type BoxError = Box<dyn CertChainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display_is_zero_padded() {
        assert_eq!(ErrorCode(7).to_string(), "0007");
        assert_eq!(ErrorCode(1004).to_string(), "1004");
    }

    #[test]
    fn test_error_message_from_registry_error() {
        let err = RegistryError::NotFound("token 3".to_string());
        let message = ErrorMessage::from_error(&err);
        assert_eq!(message.code, codes::NOT_FOUND);
        assert_eq!(message.domain, ErrorDomain::Registry);
        assert_eq!(message.error_code, "REGISTRY_NOT_FOUND");
        assert_eq!(message.message, "Not found: token 3");
    }

    #[test]
    fn test_boxed_error_downcasts() {
        let boxed = RegistryError::SlotsExhausted("token 1".to_string()).into_boxed();
        let concrete = boxed.as_any().downcast_ref::<RegistryError>();
        assert!(matches!(concrete, Some(RegistryError::SlotsExhausted(_))));
    }
}
