/*
 * Crab, a UCI-compatible chess engine
 * Copyright (C) 2024 Jasper Shovelton
 *
 * Crab is free software: you can redistribute it and/or modify it under the
 * terms of the GNU General Public License as published by the Free Software
 * Foundation, either version 3 of the License, or (at your option) any later
 * version.
 *
 * Crab is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
 * FOR A PARTICULAR PURPOSE. See the GNU General Public License for more
 * details.
 *
 * You should have received a copy of the GNU General Public License along with
 * Crab. If not, see <https://www.gnu.org/licenses/>.
 */

use std::collections::HashMap;

use crate::{board::PositionKey, defs::Move, evaluation::Score};

/// A single entry in a [`TranspositionTable`]: the result of having searched
/// one position to at least `depth_searched` ply.
#[derive(Clone, Debug)]
pub struct TranspositionEntry {
    /// The score of the position, from the side-to-move's perspective.
    pub score: Score,
    /// The principal variation found from this position.
    pub principal_variation: Vec<Move>,
    /// The depth this entry's score was searched to.
    pub depth_searched: u32,
}

/// A table of previously searched positions, keyed by [`PositionKey`].
///
/// This is a plain `HashMap`: a single search owns its table exclusively,
/// with no concurrent access to a `Board` and therefore nothing here for
/// atomics or a lock-free replacement scheme to protect.
#[derive(Default)]
pub struct TranspositionTable {
    entries: HashMap<PositionKey, TranspositionEntry>,
}

impl TranspositionTable {
    /// Creates a new, empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Returns the stored entry for `key`, if one exists and was searched to
    /// at least `minimum_depth`.
    ///
    /// A shallower stored entry cannot stand in for a deeper search, so it
    /// is not returned even though the key matches.
    #[must_use]
    pub fn get(&self, key: &PositionKey, minimum_depth: u32) -> Option<&TranspositionEntry> {
        self.entries
            .get(key)
            .filter(|entry| entry.depth_searched >= minimum_depth)
    }

    /// Returns the stored entry for `key` regardless of its depth.
    ///
    /// Used by the move-ordering key, which only wants a previously seen
    /// score as a hint and does not care whether it came from a shallower
    /// search.
    #[must_use]
    pub fn peek(&self, key: &PositionKey) -> Option<&TranspositionEntry> {
        self.entries.get(key)
    }

    /// Records the result of searching `key` to `entry.depth_searched`,
    /// replacing whatever was previously stored there.
    pub fn insert(&mut self, key: PositionKey, entry: TranspositionEntry) {
        self.entries.insert(key, entry);
    }

    /// Returns the number of stored positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the table holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shallow_entry_is_not_returned_for_a_deeper_request() {
        let mut table = TranspositionTable::new();
        let key = [0u8; 33];
        table.insert(
            key,
            TranspositionEntry {
                score: 0.0,
                principal_variation: Vec::new(),
                depth_searched: 2,
            },
        );
        assert!(table.get(&key, 4).is_none());
        assert!(table.get(&key, 2).is_some());
        assert!(table.peek(&key).is_some());
    }
}
