// Identity & access control
//
// Sentinel validation for participant identities and the registry-owner role.

use certchain_error::{ensure, RegistryError, RegistryResult};
use certchain_types::Address;

/// Reject the sentinel identity where a real participant is required.
///
/// `role` names the argument in the error message.
pub fn require_participant(address: &Address, role: &str) -> RegistryResult<()> {
    ensure!(
        !address.is_zero(),
        RegistryError::InvalidRecipient(format!("{} must not be the zero address", role))
    );
    Ok(())
}

/// Holds the registry-owner identity fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessControl {
    registry_owner: Address,
}

impl AccessControl {
    /// Create access control for the given registry owner.
    ///
    /// Fails with `InvalidRecipient` if the owner is the sentinel.
    pub fn new(registry_owner: Address) -> RegistryResult<Self> {
        require_participant(&registry_owner, "registry owner")?;
        Ok(Self { registry_owner })
    }

    /// The registry-owner identity
    pub fn registry_owner(&self) -> &Address {
        &self.registry_owner
    }

    /// Whether `address` is the registry owner
    pub fn is_registry_owner(&self, address: &Address) -> bool {
        &self.registry_owner == address
    }

    /// Reject calls made by the registry owner.
    pub fn require_not_registry_owner(&self, caller: &Address) -> RegistryResult<()> {
        ensure!(
            !self.is_registry_owner(caller),
            RegistryError::Unauthorized("the registry owner cannot perform this operation".into())
        );
        Ok(())
    }

    /// Reject records not held in escrow by the registry owner.
    pub fn require_escrow(&self, current_owner: &Address, what: &str) -> RegistryResult<()> {
        ensure!(
            self.is_registry_owner(current_owner),
            RegistryError::OwnershipMismatch(format!(
                "{} is held by {}, not the registry owner",
                what, current_owner
            ))
        );
        Ok(())
    }
}
