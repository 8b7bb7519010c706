// Ownership registry
//
// Assigns record ids, keeps the owner map, the per-owner and global
// enumerable indices, and per-record metadata URIs. This layer performs the
// raw state changes only; caller authorization lives in `registry`.

use std::collections::HashMap;

use tracing::debug;

use certchain_error::{ensure, RegistryError, RegistryResult};
use certchain_types::{Address, TokenId};

use crate::access::require_participant;
use crate::indexed_set::IndexedSet;

/// Owner map plus the enumerable indices over it
#[derive(Debug, Clone, Default)]
pub struct OwnershipRegistry {
    /// Last id handed out; ids are never reused
    last_issued: u64,
    /// Current owner of every existing record
    owners: HashMap<TokenId, Address>,
    /// Records held by each owner
    owned: HashMap<Address, IndexedSet>,
    /// Every existing record
    all: IndexedSet,
    /// Metadata URI per record, absent means empty
    uris: HashMap<TokenId, String>,
}

impl OwnershipRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id and assign it to `owner`.
    pub fn mint(&mut self, owner: &Address) -> RegistryResult<TokenId> {
        require_participant(owner, "owner")?;

        self.last_issued += 1;
        let id = TokenId::new(self.last_issued);
        self.owners.insert(id, owner.clone());
        self.owned.entry(owner.clone()).or_default().insert(id);
        self.all.insert(id);

        debug!(id = %id, owner = %owner, "minted record");
        Ok(id)
    }

    /// Remove `id` from both indices and the owner map. Returns the former owner.
    pub fn remove(&mut self, id: TokenId) -> RegistryResult<Address> {
        let owner = self
            .owners
            .remove(&id)
            .ok_or_else(|| not_found(id))?;

        self.detach(&owner, id);
        self.all.remove(id);
        self.uris.remove(&id);

        debug!(id = %id, owner = %owner, "removed record");
        Ok(owner)
    }

    /// Move `id` from `from` to `to`.
    pub fn reassign(&mut self, from: &Address, to: &Address, id: TokenId) -> RegistryResult<()> {
        require_participant(to, "recipient")?;
        let current = self.owner_of(id)?;
        ensure!(
            current == from,
            RegistryError::OwnershipMismatch(format!("{} does not own token {}", from, id))
        );

        self.detach(from, id);
        self.owners.insert(id, to.clone());
        self.owned.entry(to.clone()).or_default().insert(id);

        debug!(id = %id, from = %from, to = %to, "reassigned record");
        Ok(())
    }

    fn detach(&mut self, owner: &Address, id: TokenId) {
        if let Some(set) = self.owned.get_mut(owner) {
            set.remove(id);
            if set.is_empty() {
                self.owned.remove(owner);
            }
        }
    }

    /// Number of records held by `owner`
    pub fn balance_of(&self, owner: &Address) -> RegistryResult<usize> {
        require_participant(owner, "owner")?;
        Ok(self.owned.get(owner).map_or(0, IndexedSet::len))
    }

    /// Current owner of `id`
    pub fn owner_of(&self, id: TokenId) -> RegistryResult<&Address> {
        self.owners.get(&id).ok_or_else(|| not_found(id))
    }

    /// Whether `id` currently exists
    pub fn exists(&self, id: TokenId) -> bool {
        self.owners.contains_key(&id)
    }

    /// Whether `id` was ever issued, including burned records
    pub fn was_issued(&self, id: TokenId) -> bool {
        id.value() >= 1 && id.value() <= self.last_issued
    }

    /// Number of existing records
    pub fn total_supply(&self) -> usize {
        self.all.len()
    }

    /// The `index`-th record held by `owner`
    pub fn token_of_owner_by_index(&self, owner: &Address, index: usize) -> RegistryResult<TokenId> {
        require_participant(owner, "owner")?;
        let set = self.owned.get(owner);
        let len = set.map_or(0, IndexedSet::len);
        set.and_then(|set| set.get(index))
            .ok_or(RegistryError::IndexOutOfRange { index, len })
    }

    /// The `index`-th existing record
    pub fn token_by_index(&self, index: usize) -> RegistryResult<TokenId> {
        self.all.get(index).ok_or(RegistryError::IndexOutOfRange {
            index,
            len: self.all.len(),
        })
    }

    /// Metadata URI of `id`, empty by default
    pub fn token_uri(&self, id: TokenId) -> RegistryResult<&str> {
        ensure!(self.exists(id), not_found(id));
        Ok(self.uris.get(&id).map_or("", String::as_str))
    }

    /// Set the metadata URI of `id`
    pub fn set_token_uri(&mut self, id: TokenId, uri: impl Into<String>) -> RegistryResult<()> {
        ensure!(self.exists(id), not_found(id));
        self.uris.insert(id, uri.into());
        Ok(())
    }

    /// Every existing record in global enumeration order
    pub fn all_tokens(&self) -> &[TokenId] {
        self.all.as_slice()
    }

    /// Per-owner indices, for invariant checks
    pub(crate) fn owner_indices(&self) -> impl Iterator<Item = (&Address, &IndexedSet)> {
        self.owned.iter()
    }

    pub(crate) fn global_index(&self) -> &IndexedSet {
        &self.all
    }

    pub(crate) fn owner_entries(&self) -> impl Iterator<Item = (&TokenId, &Address)> {
        self.owners.iter()
    }
}

fn not_found(id: TokenId) -> RegistryError {
    RegistryError::NotFound(format!("token {} does not exist", id))
}
