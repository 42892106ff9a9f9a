//! Per-player resource ledger.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::resource::{ResourceKind, ResourceVector};

/// Read-only copy of the ledger, players in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    pub players: Vec<PlayerHoldings>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerHoldings {
    pub player: String,
    pub holdings: ResourceVector,
}

impl LedgerState {
    #[must_use]
    pub fn get(&self, player: &str) -> Option<&ResourceVector> {
        self.players
            .iter()
            .find(|entry| entry.player == player)
            .map(|entry| &entry.holdings)
    }

    #[must_use]
    pub fn is_non_negative(&self) -> bool {
        self.players
            .iter()
            .all(|entry| entry.holdings.is_non_negative())
    }
}

/// Mapping from player name to holdings.
///
/// Rows are kept in first-seen order; a player's index is stable until
/// [`LedgerStore::reset`], which is what candidate matrices key on. No
/// mutation checks for negative results.
#[derive(Debug, Clone, Default)]
pub struct LedgerStore {
    names: Vec<String>,
    rows: Vec<ResourceVector>,
    index: HashMap<String, usize>,
}

impl LedgerStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Holdings of `player`, the zero vector when unknown.
    #[must_use]
    pub fn get(&self, player: &str) -> ResourceVector {
        self.index_of(player)
            .map_or(ResourceVector::ZERO, |idx| self.rows[idx])
    }

    /// Create a zero row for `player` if absent. Returns whether it was created.
    pub fn ensure(&mut self, player: &str) -> bool {
        if self.index.contains_key(player) {
            return false;
        }
        self.index.insert(player.to_string(), self.names.len());
        self.names.push(player.to_string());
        self.rows.push(ResourceVector::ZERO);
        true
    }

    /// Add `amount` of `kind` to a known player. Returns false for unknown players.
    pub fn apply_delta(&mut self, player: &str, kind: ResourceKind, amount: i32) -> bool {
        self.row_mut(player)
            .map(|row| row.adjust(kind, amount))
            .is_some()
    }

    /// Add a whole vector to a known player. Returns false for unknown players.
    pub fn apply_vector(&mut self, player: &str, vector: ResourceVector) -> bool {
        self.row_mut(player)
            .map(|row| *row = *row + vector)
            .is_some()
    }

    /// Move `amount` of `kind` from one known player to another.
    pub fn transfer(&mut self, from: &str, to: &str, kind: ResourceKind, amount: i32) -> bool {
        if !self.contains(from) || !self.contains(to) {
            return false;
        }
        self.apply_delta(from, kind, -amount);
        self.apply_delta(to, kind, amount);
        true
    }

    /// Zero every other player's `kind` and credit the sum to `actor`.
    /// Returns the amount seized.
    pub fn seize_all(&mut self, actor: &str, kind: ResourceKind) -> i32 {
        let Some(actor_idx) = self.index_of(actor) else {
            return 0;
        };
        let mut seized = 0;
        for (idx, row) in self.rows.iter_mut().enumerate() {
            if idx != actor_idx {
                seized += row[kind];
                row[kind] = 0;
            }
        }
        self.rows[actor_idx].adjust(kind, seized);
        seized
    }

    /// Rows by player index.
    #[must_use]
    pub fn rows(&self) -> &[ResourceVector] {
        &self.rows
    }

    /// Overwrite every row at once. Extra rows are ignored and missing rows
    /// keep their value.
    pub fn replace_rows(&mut self, rows: &[ResourceVector]) {
        for (slot, row) in self.rows.iter_mut().zip(rows) {
            *slot = *row;
        }
    }

    #[must_use]
    pub fn index_of(&self, player: &str) -> Option<usize> {
        self.index.get(player).copied()
    }

    #[must_use]
    pub fn contains(&self, player: &str) -> bool {
        self.index.contains_key(player)
    }

    #[must_use]
    pub fn players(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.names.len()
    }

    /// First negative cell in player order, if any.
    #[must_use]
    pub fn first_negative(&self) -> Option<(&str, ResourceKind, i32)> {
        self.names.iter().zip(&self.rows).find_map(|(name, row)| {
            row.first_negative()
                .map(|(kind, amount)| (name.as_str(), kind, amount))
        })
    }

    #[must_use]
    pub fn snapshot(&self) -> LedgerState {
        LedgerState {
            players: self
                .names
                .iter()
                .zip(&self.rows)
                .map(|(player, holdings)| PlayerHoldings {
                    player: player.clone(),
                    holdings: *holdings,
                })
                .collect(),
        }
    }

    pub fn reset(&mut self) {
        self.names.clear();
        self.rows.clear();
        self.index.clear();
    }

    fn row_mut(&mut self, player: &str) -> Option<&mut ResourceVector> {
        let idx = self.index_of(player)?;
        self.rows.get_mut(idx)
    }
}
