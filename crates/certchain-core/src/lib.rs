// CertChain registry core
//
// Ownership records, approvals, enumeration indices and the certification
// workflow, exposed through `CertRegistry`.

pub mod access;
pub mod approval;
pub mod certification;
pub mod config;
pub mod events;
pub mod indexed_set;
pub mod interface;
pub mod logging;
pub mod ownership;
pub mod receiver;
pub mod registry;
pub mod time;

pub use approval::SpenderRole;
pub use certification::{AuditRound, AuditSlot, CertAudit, CertStage, Certificate, CertificateEntry};
pub use config::RegistryConfig;
pub use events::RegistryEvent;
pub use receiver::{FixedReceiver, TokenReceiver, RECEIVER_ACCEPTED};
pub use registry::CertRegistry;
pub use time::{Clock, FixedClock, SystemClock};

pub use certchain_error::{RegistryError, RegistryResult};
pub use certchain_types::{Address, ContentHash, InterfaceId, TokenId};
