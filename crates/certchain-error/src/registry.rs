// Registry error types
// Errors raised by the ownership registry, approvals and the certification workflow

use std::any::Any;

use thiserror::Error;

use crate::{CertChainError, ErrorCode, ErrorDomain};

/// Registry error codes
pub mod codes {
    use crate::ErrorCode;

    // Registry error codes start with 1000
    pub const INVALID_RECIPIENT: ErrorCode = ErrorCode(1001);
    pub const NOT_FOUND: ErrorCode = ErrorCode(1002);
    pub const OWNERSHIP_MISMATCH: ErrorCode = ErrorCode(1003);
    pub const UNAUTHORIZED: ErrorCode = ErrorCode(1004);
    pub const INDEX_OUT_OF_RANGE: ErrorCode = ErrorCode(1005);
    pub const RECIPIENT_REJECTED: ErrorCode = ErrorCode(1006);
    pub const INVALID_ARGUMENT: ErrorCode = ErrorCode(1007);

    // Workflow error codes start with 2000
    pub const SELF_REFERENCE: ErrorCode = ErrorCode(2001);
    pub const INVALID_AMOUNT: ErrorCode = ErrorCode(2002);
    pub const PRECONDITION_FAILED: ErrorCode = ErrorCode(2003);
    pub const SLOTS_EXHAUSTED: ErrorCode = ErrorCode(2004);
}

/// Every way a registry operation can be rejected.
///
/// A rejected operation leaves the registry exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The sentinel identity was supplied where a real participant is required
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    /// The record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The stated or required owner is not the record's current owner
    #[error("Ownership mismatch: {0}")]
    OwnershipMismatch(String),

    /// The caller lacks the role required for the operation
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A participant was named in two roles that must differ
    #[error("Self reference: {0}")]
    SelfReference(String),

    /// A certificate cost was zero
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// A workflow step was attempted out of order
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// Both audit slots are already filled
    #[error("Audit slots exhausted: {0}")]
    SlotsExhausted(String),

    /// An enumeration index was past the end of its index
    #[error("Index out of range: {index} >= {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// A safe-transfer recipient refused or mis-acknowledged the record
    #[error("Recipient rejected: {0}")]
    RecipientRejected(String),

    /// The argument is a reserved invalid value
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl CertChainError for RegistryError {
    fn error_code(&self) -> &'static str {
        match self {
            RegistryError::InvalidRecipient(_) => "REGISTRY_INVALID_RECIPIENT",
            RegistryError::NotFound(_) => "REGISTRY_NOT_FOUND",
            RegistryError::OwnershipMismatch(_) => "REGISTRY_OWNERSHIP_MISMATCH",
            RegistryError::Unauthorized(_) => "REGISTRY_UNAUTHORIZED",
            RegistryError::SelfReference(_) => "WORKFLOW_SELF_REFERENCE",
            RegistryError::InvalidAmount(_) => "WORKFLOW_INVALID_AMOUNT",
            RegistryError::PreconditionFailed(_) => "WORKFLOW_PRECONDITION_FAILED",
            RegistryError::SlotsExhausted(_) => "WORKFLOW_SLOTS_EXHAUSTED",
            RegistryError::IndexOutOfRange { .. } => "REGISTRY_INDEX_OUT_OF_RANGE",
            RegistryError::RecipientRejected(_) => "REGISTRY_RECIPIENT_REJECTED",
            RegistryError::InvalidArgument(_) => "REGISTRY_INVALID_ARGUMENT",
        }
    }

    fn code(&self) -> ErrorCode {
        use codes::*;
        match self {
            RegistryError::InvalidRecipient(_) => INVALID_RECIPIENT,
            RegistryError::NotFound(_) => NOT_FOUND,
            RegistryError::OwnershipMismatch(_) => OWNERSHIP_MISMATCH,
            RegistryError::Unauthorized(_) => UNAUTHORIZED,
            RegistryError::SelfReference(_) => SELF_REFERENCE,
            RegistryError::InvalidAmount(_) => INVALID_AMOUNT,
            RegistryError::PreconditionFailed(_) => PRECONDITION_FAILED,
            RegistryError::SlotsExhausted(_) => SLOTS_EXHAUSTED,
            RegistryError::IndexOutOfRange { .. } => INDEX_OUT_OF_RANGE,
            RegistryError::RecipientRejected(_) => RECIPIENT_REJECTED,
            RegistryError::InvalidArgument(_) => INVALID_ARGUMENT,
        }
    }

    fn domain(&self) -> ErrorDomain {
        match self {
            RegistryError::SelfReference(_)
            | RegistryError::InvalidAmount(_)
            | RegistryError::PreconditionFailed(_)
            | RegistryError::SlotsExhausted(_) => ErrorDomain::Workflow,
            _ => ErrorDomain::Registry,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Convenient Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Convert from registry error to boxed error
impl From<RegistryError> for Box<dyn CertChainError> {
    fn from(err: RegistryError) -> Self {
        Box::new(err)
    }
}
