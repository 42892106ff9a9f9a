//! Ambiguous-steal resolution.
//!
//! Every steal whose resource is hidden contributes one unit moving from the
//! victim to the thief, in one of five possible kinds. The resolver keeps the
//! set of all combined hypotheses ([`CandidateDelta`]) that are still
//! consistent with the ledger and commits the survivor once only one is left.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::ledger::LedgerStore;
use crate::resource::{ResourceKind, ResourceVector};

/// One hypothesis about the unresolved transfers: a signed adjustment per
/// player row, indexed by ledger position.
///
/// Trailing zero rows are trimmed so that equal hypotheses compare equal no
/// matter how many players were known when each was built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateDelta {
    rows: Vec<ResourceVector>,
}

impl CandidateDelta {
    /// The all-zero hypothesis.
    #[must_use]
    pub const fn identity() -> Self {
        Self { rows: Vec::new() }
    }

    /// One unit of `kind` moving from row `from` to row `to`.
    #[must_use]
    pub fn transfer(to: usize, from: usize, kind: ResourceKind) -> Self {
        let mut rows = vec![ResourceVector::ZERO; to.max(from) + 1];
        rows[to].adjust(kind, 1);
        rows[from].adjust(kind, -1);
        Self::from_rows(rows)
    }

    #[must_use]
    pub fn from_rows(mut rows: Vec<ResourceVector>) -> Self {
        while rows.last().is_some_and(ResourceVector::is_zero) {
            rows.pop();
        }
        Self { rows }
    }

    /// Row for `player`, zero past the stored rows.
    #[must_use]
    pub fn row(&self, player: usize) -> ResourceVector {
        self.rows.get(player).copied().unwrap_or(ResourceVector::ZERO)
    }

    #[must_use]
    pub fn rows(&self) -> &[ResourceVector] {
        &self.rows
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.rows.is_empty()
    }

    /// Element-wise sum of two hypotheses.
    #[must_use]
    pub fn combine(&self, other: &Self) -> Self {
        let len = self.rows.len().max(other.rows.len());
        Self::from_rows((0..len).map(|idx| self.row(idx) + other.row(idx)).collect())
    }

    /// Ledger rows with this hypothesis added.
    #[must_use]
    pub fn apply_to(&self, ledger: &[ResourceVector]) -> Vec<ResourceVector> {
        let len = ledger.len().max(self.rows.len());
        (0..len)
            .map(|idx| ledger.get(idx).copied().unwrap_or_default() + self.row(idx))
            .collect()
    }

    /// Whether adding this hypothesis keeps every ledger cell at zero or above.
    #[must_use]
    pub fn is_feasible(&self, ledger: &[ResourceVector]) -> bool {
        self.apply_to(ledger)
            .iter()
            .all(ResourceVector::is_non_negative)
    }
}

/// Outstanding hypotheses, deduplicated, in the order they were produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CandidateSet {
    candidates: Vec<CandidateDelta>,
}

impl CandidateSet {
    fn from_candidates(candidates: impl IntoIterator<Item = CandidateDelta>) -> Self {
        let mut seen = HashSet::new();
        Self {
            candidates: candidates
                .into_iter()
                .filter(|candidate| seen.insert(candidate.clone()))
                .collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CandidateDelta> {
        self.candidates.iter()
    }

    #[must_use]
    pub fn contains(&self, candidate: &CandidateDelta) -> bool {
        self.candidates.contains(candidate)
    }
}

/// A uniquely determined hypothesis that still left a negative cell.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("resolved steal leaves {player} holding {amount} {kind}")]
pub struct CollapseViolation {
    pub player: String,
    pub kind: ResourceKind,
    pub amount: i32,
}

/// Outcome of one resolver pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Resolution {
    /// No ambiguity outstanding.
    Idle,
    Pending { remaining: usize },
    Committed { delta: CandidateDelta },
    /// Every hypothesis was ruled out; the ledger was left as it was.
    Infeasible { dropped: usize },
    Fatal(CollapseViolation),
}

impl Resolution {
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

/// Possible net gains and losses for one player across the outstanding
/// hypotheses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HypothesisSummary {
    pub gained: Vec<i32>,
    pub lost: Vec<i32>,
}

impl HypothesisSummary {
    fn settled() -> Self {
        Self {
            gained: vec![0],
            lost: vec![0],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AmbiguityResolver {
    candidates: CandidateSet,
}

impl AmbiguityResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn candidates(&self) -> &CandidateSet {
        &self.candidates
    }

    /// Fold a hidden one-unit steal into every outstanding hypothesis.
    /// Returns the number of hypotheses before filtering.
    pub fn register_steal(&mut self, thief: usize, victim: usize) -> usize {
        let seed;
        let existing: &[CandidateDelta] = if self.candidates.is_empty() {
            seed = [CandidateDelta::identity()];
            &seed
        } else {
            &self.candidates.candidates
        };
        let combined: Vec<CandidateDelta> = existing
            .iter()
            .flat_map(|candidate| {
                ResourceKind::ALL.into_iter().map(move |kind| {
                    candidate.combine(&CandidateDelta::transfer(thief, victim, kind))
                })
            })
            .collect();
        self.candidates = CandidateSet::from_candidates(combined);
        self.candidates.len()
    }

    /// Filter the hypotheses against the live ledger and commit a sole survivor.
    pub fn review(&mut self, ledger: &mut LedgerStore) -> Resolution {
        if self.candidates.is_empty() {
            return Resolution::Idle;
        }
        let before = self.candidates.len();
        let kept: Vec<CandidateDelta> = self
            .candidates
            .iter()
            .filter(|candidate| !candidate.is_identity() && candidate.is_feasible(ledger.rows()))
            .cloned()
            .collect();
        match kept.len() {
            0 => {
                self.clear();
                Resolution::Infeasible { dropped: before }
            }
            1 => {
                let delta = kept.into_iter().next().unwrap_or_default();
                self.commit(ledger, delta)
            }
            remaining => {
                self.candidates = CandidateSet { candidates: kept };
                Resolution::Pending { remaining }
            }
        }
    }

    /// Apply `delta` to the ledger and drop every hypothesis. A negative
    /// result is refused and reported instead of written.
    pub(crate) fn commit(&mut self, ledger: &mut LedgerStore, delta: CandidateDelta) -> Resolution {
        self.clear();
        let result = delta.apply_to(ledger.rows());
        let negative = result.iter().enumerate().find_map(|(idx, row)| {
            row.first_negative().map(|(kind, amount)| (idx, kind, amount))
        });
        if let Some((idx, kind, amount)) = negative {
            let player = ledger
                .players()
                .get(idx)
                .cloned()
                .unwrap_or_else(|| format!("player #{idx}"));
            return Resolution::Fatal(CollapseViolation {
                player,
                kind,
                amount,
            });
        }
        ledger.replace_rows(&result);
        Resolution::Committed { delta }
    }

    #[must_use]
    pub fn summary(&self, player: usize) -> HypothesisSummary {
        if self.candidates.is_empty() {
            return HypothesisSummary::settled();
        }
        let mut gained = Vec::new();
        let mut lost = Vec::new();
        for candidate in self.candidates.iter() {
            let row = candidate.row(player);
            push_distinct(&mut gained, row.gained());
            push_distinct(&mut lost, row.lost());
        }
        HypothesisSummary { gained, lost }
    }

    /// Distinct nonzero adjustments the hypotheses make to one cell.
    #[must_use]
    pub fn possible_adjustments(&self, player: usize, kind: ResourceKind) -> Vec<i32> {
        let mut values = Vec::new();
        for candidate in self.candidates.iter() {
            let value = candidate.row(player)[kind];
            if value != 0 {
                push_distinct(&mut values, value);
            }
        }
        values
    }

    /// Lowest and highest holding of one cell across the hypotheses.
    #[must_use]
    pub fn bounds(&self, player: usize, kind: ResourceKind, committed: i32) -> (i32, i32) {
        self.candidates
            .iter()
            .map(|candidate| committed + candidate.row(player)[kind])
            .fold(None, |acc: Option<(i32, i32)>, value| {
                Some(acc.map_or((value, value), |(lo, hi)| (lo.min(value), hi.max(value))))
            })
            .unwrap_or((committed, committed))
    }

    pub fn clear(&mut self) {
        self.candidates = CandidateSet::default();
    }
}

fn push_distinct(values: &mut Vec<i32>, value: i32) {
    if !values.contains(&value) {
        values.push(value);
    }
}
