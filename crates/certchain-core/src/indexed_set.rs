// Enumerable id sets
//
// An ordered sequence of record ids paired with an id -> position lookup.
// Insertion appends; removal swaps the last element into the vacated slot
// and pops, so both are O(1). Order is not preserved across removals.

use std::collections::HashMap;

use certchain_types::TokenId;

/// Ordered set of record ids with O(1) insert, remove and positional lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexedSet {
    /// Ids in enumeration order
    items: Vec<TokenId>,
    /// Position of each id in `items`
    positions: HashMap<TokenId, usize>,
}

impl IndexedSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ids in the set
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the set contains `id`
    pub fn contains(&self, id: TokenId) -> bool {
        self.positions.contains_key(&id)
    }

    /// The id at position `index`, if any
    pub fn get(&self, index: usize) -> Option<TokenId> {
        self.items.get(index).copied()
    }

    /// Position of `id` in enumeration order
    pub fn position(&self, id: TokenId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// Append `id`. Returns false, leaving the set unchanged, if it is already present.
    pub fn insert(&mut self, id: TokenId) -> bool {
        if self.positions.contains_key(&id) {
            return false;
        }
        self.positions.insert(id, self.items.len());
        self.items.push(id);
        true
    }

    /// Remove `id` by swap-and-pop. Returns false if it was not present.
    pub fn remove(&mut self, id: TokenId) -> bool {
        let position = match self.positions.remove(&id) {
            Some(position) => position,
            None => return false,
        };

        let last = self.items.len() - 1;
        if position != last {
            let moved = self.items[last];
            self.items[position] = moved;
            self.positions.insert(moved, position);
        }
        self.items.pop();
        true
    }

    /// Iterate ids in enumeration order
    pub fn iter(&self) -> impl Iterator<Item = TokenId> + '_ {
        self.items.iter().copied()
    }

    /// Ids in enumeration order
    pub fn as_slice(&self) -> &[TokenId] {
        &self.items
    }

    /// Whether the lookup table agrees with the sequence
    pub fn is_consistent(&self) -> bool {
        self.items.len() == self.positions.len()
            && self
                .items
                .iter()
                .enumerate()
                .all(|(i, id)| self.positions.get(id) == Some(&i))
    }
}
