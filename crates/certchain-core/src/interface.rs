// Capability advertisement

use std::collections::BTreeSet;

use certchain_error::{ensure, RegistryError, RegistryResult};
use certchain_types::InterfaceId;

/// Set of capability groups the registry advertises
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedInterfaces {
    ids: BTreeSet<InterfaceId>,
}

impl SupportedInterfaces {
    /// The groups implemented by `CertRegistry`
    pub fn registry_defaults() -> Self {
        let ids = [
            InterfaceId::CAPABILITY_QUERY,
            InterfaceId::OWNERSHIP,
            InterfaceId::EXISTENCE,
            InterfaceId::ENUMERATION,
            InterfaceId::METADATA,
        ]
        .into_iter()
        .collect();
        Self { ids }
    }

    /// Whether `id` is advertised. The reserved invalid id is an error, not `false`.
    pub fn supports(&self, id: InterfaceId) -> RegistryResult<bool> {
        ensure!(
            id != InterfaceId::INVALID,
            RegistryError::InvalidArgument(format!("{} is reserved and never valid", id))
        );
        Ok(self.ids.contains(&id))
    }

    /// Every advertised group
    pub fn iter(&self) -> impl Iterator<Item = &InterfaceId> {
        self.ids.iter()
    }
}
