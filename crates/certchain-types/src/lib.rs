// Core type definitions shared by the CertChain registry crates
//
// Identities, record ids, content hashes and capability identifiers.

pub mod address;
pub mod hash;
pub mod interface;
pub mod token;

pub use address::Address;
pub use hash::ContentHash;
pub use interface::InterfaceId;
pub use token::TokenId;

/// Seconds since the Unix epoch
pub type Timestamp = u64;
