// Approval subsystem
//
// Two independent lookup tables: a single approved spender per record, and
// blanket owner -> operator grants. Whether someone may spend a record is
// derived from these and the owner map on every call, never stored.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use certchain_types::{Address, TokenId};

/// The capacity in which an identity may move or burn a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpenderRole {
    /// Current owner of the record
    Owner,
    /// Holder of the record's single-spender approval
    ApprovedSpender,
    /// Blanket operator of the record's owner
    Operator,
}

/// Single-spender and operator approval tables
#[derive(Debug, Clone, Default)]
pub struct Approvals {
    token_approvals: HashMap<TokenId, Address>,
    operators: HashMap<Address, HashSet<Address>>,
}

impl Approvals {
    /// Create empty approval tables
    pub fn new() -> Self {
        Self::default()
    }

    /// Approved spender of `id`, if any
    pub fn approved(&self, id: TokenId) -> Option<&Address> {
        self.token_approvals.get(&id)
    }

    /// Set the approved spender of `id`, replacing any previous one
    pub fn approve(&mut self, id: TokenId, spender: Address) {
        self.token_approvals.insert(id, spender);
    }

    /// Clear the approval of `id`. Returns the previous spender, if there was one.
    pub fn clear(&mut self, id: TokenId) -> Option<Address> {
        self.token_approvals.remove(&id)
    }

    /// Grant or revoke `operator` over every record of `owner`
    pub fn set_operator(&mut self, owner: &Address, operator: &Address, approved: bool) {
        if approved {
            self.operators
                .entry(owner.clone())
                .or_default()
                .insert(operator.clone());
        } else if let Some(granted) = self.operators.get_mut(owner) {
            granted.remove(operator);
            if granted.is_empty() {
                self.operators.remove(owner);
            }
        }
    }

    /// Whether `operator` holds a blanket grant from `owner`
    pub fn is_operator(&self, owner: &Address, operator: &Address) -> bool {
        self.operators
            .get(owner)
            .map_or(false, |granted| granted.contains(operator))
    }

    /// The strongest role `who` holds over `id`, whose owner is `owner`
    pub fn role_of(&self, who: &Address, owner: &Address, id: TokenId) -> Option<SpenderRole> {
        if who == owner {
            Some(SpenderRole::Owner)
        } else if self.approved(id) == Some(who) {
            Some(SpenderRole::ApprovedSpender)
        } else if self.is_operator(owner, who) {
            Some(SpenderRole::Operator)
        } else {
            None
        }
    }

    pub(crate) fn approved_entries(&self) -> impl Iterator<Item = (&TokenId, &Address)> {
        self.token_approvals.iter()
    }
}
