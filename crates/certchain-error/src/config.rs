// Configuration error types

use std::any::Any;

use thiserror::Error;

use crate::{CertChainError, ErrorCode, ErrorDomain};

/// Configuration error codes start with 3000
pub mod codes {
    use crate::ErrorCode;

    pub const IO_ERROR: ErrorCode = ErrorCode(3001);
    pub const PARSE_ERROR: ErrorCode = ErrorCode(3002);
    pub const INVALID_OWNER: ErrorCode = ErrorCode(3003);
    pub const INVALID_FIELD: ErrorCode = ErrorCode(3004);
}

/// Errors raised while loading or validating registry configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML for the expected schema
    #[error("Parse error: {0}")]
    Parse(String),

    /// The registry owner identity is missing or is the sentinel
    #[error("Invalid registry owner: {0}")]
    InvalidOwner(String),

    /// Any other field holds an unusable value
    #[error("Invalid field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl CertChainError for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            ConfigError::Io(_) => "CONFIG_IO_ERROR",
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR",
            ConfigError::InvalidOwner(_) => "CONFIG_INVALID_OWNER",
            ConfigError::InvalidField { .. } => "CONFIG_INVALID_FIELD",
        }
    }

    fn code(&self) -> ErrorCode {
        use codes::*;
        match self {
            ConfigError::Io(_) => IO_ERROR,
            ConfigError::Parse(_) => PARSE_ERROR,
            ConfigError::InvalidOwner(_) => INVALID_OWNER,
            ConfigError::InvalidField { .. } => INVALID_FIELD,
        }
    }

    fn domain(&self) -> ErrorDomain {
        ErrorDomain::Config
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Convenient Result type for configuration handling
pub type ConfigResult<T> = Result<T, ConfigError>;
