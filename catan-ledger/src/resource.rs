//! Resource kinds, fixed-arity resource vectors and structure costs.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::ops::{Add, Index, IndexMut, Neg, Sub};

/// Number of tradeable resource kinds.
pub const RESOURCE_COUNT: usize = 5;

/// Inline list of resource kinds, one entry per unit.
pub type ResourceList = SmallVec<[ResourceKind; 4]>;

/// One of the five tradeable commodities. Declaration order is the index basis
/// for every vector and candidate matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Wood,
    Brick,
    Sheep,
    Wheat,
    Ore,
}

impl ResourceKind {
    pub const ALL: [Self; RESOURCE_COUNT] =
        [Self::Wood, Self::Brick, Self::Sheep, Self::Wheat, Self::Ore];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Name the host game uses for this resource.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Wood => "lumber",
            Self::Brick => "brick",
            Self::Sheep => "wool",
            Self::Wheat => "grain",
            Self::Ore => "ore",
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Wood => "🪵",
            Self::Brick => "🧱",
            Self::Sheep => "🐑",
            Self::Wheat => "🌾",
            Self::Ore => "⛏️",
        }
    }

    /// Match a free-text word against the kind names and their synonyms.
    ///
    /// Surrounding punctuation and letter case are ignored, so `"Wool,"` and
    /// `"sheep"` both resolve to [`ResourceKind::Sheep`].
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        let word = token
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_ascii_lowercase();
        match word.as_str() {
            "lumber" | "wood" | "woods" => Some(Self::Wood),
            "brick" | "bricks" => Some(Self::Brick),
            "wool" | "sheep" => Some(Self::Sheep),
            "grain" | "grains" | "wheat" => Some(Self::Wheat),
            "ore" | "ores" => Some(Self::Ore),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Presentation descriptor for a resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceKindInfo {
    pub kind: ResourceKind,
    pub key: &'static str,
    pub symbol: &'static str,
}

/// Ordered list of every resource kind with its display symbol.
#[must_use]
pub fn resource_kinds() -> [ResourceKindInfo; RESOURCE_COUNT] {
    ResourceKind::ALL.map(|kind| ResourceKindInfo {
        kind,
        key: kind.key(),
        symbol: kind.symbol(),
    })
}

/// Scan free text for resource keywords, one entry per matching word.
#[must_use]
pub fn scan_keywords(text: &str) -> ResourceList {
    text.split_whitespace()
        .filter_map(ResourceKind::from_token)
        .collect()
}

/// Signed count per resource kind.
///
/// Committed ledger rows are non-negative; candidate deltas and intermediate
/// arithmetic may go below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceVector([i32; RESOURCE_COUNT]);

impl ResourceVector {
    pub const ZERO: Self = Self([0; RESOURCE_COUNT]);

    #[must_use]
    pub const fn new(counts: [i32; RESOURCE_COUNT]) -> Self {
        Self(counts)
    }

    /// Vector holding `amount` of a single kind.
    #[must_use]
    pub const fn single(kind: ResourceKind, amount: i32) -> Self {
        let mut counts = [0; RESOURCE_COUNT];
        counts[kind.index()] = amount;
        Self(counts)
    }

    /// Tally a list of resource units into a vector.
    #[must_use]
    pub fn from_resources(resources: &[ResourceKind]) -> Self {
        let mut vector = Self::ZERO;
        for &kind in resources {
            vector.adjust(kind, 1);
        }
        vector
    }

    #[must_use]
    pub const fn get(&self, kind: ResourceKind) -> i32 {
        self.0[kind.index()]
    }

    pub const fn set(&mut self, kind: ResourceKind, amount: i32) {
        self.0[kind.index()] = amount;
    }

    pub const fn adjust(&mut self, kind: ResourceKind, amount: i32) {
        self.0[kind.index()] += amount;
    }

    #[must_use]
    pub const fn counts(&self) -> [i32; RESOURCE_COUNT] {
        self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, i32)> + '_ {
        ResourceKind::ALL.into_iter().map(|kind| (kind, self.get(kind)))
    }

    #[must_use]
    pub fn total(&self) -> i32 {
        self.0.iter().sum()
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&value| value == 0)
    }

    /// First kind holding a negative count, in kind order.
    #[must_use]
    pub fn first_negative(&self) -> Option<(ResourceKind, i32)> {
        self.iter().find(|&(_, value)| value < 0)
    }

    #[must_use]
    pub fn is_non_negative(&self) -> bool {
        self.first_negative().is_none()
    }

    /// Sum of the positive entries.
    #[must_use]
    pub fn gained(&self) -> i32 {
        self.0.iter().filter(|&&value| value > 0).sum()
    }

    /// Sum of the negative entries (zero or below).
    #[must_use]
    pub fn lost(&self) -> i32 {
        self.0.iter().filter(|&&value| value < 0).sum()
    }
}

impl Index<ResourceKind> for ResourceVector {
    type Output = i32;

    fn index(&self, kind: ResourceKind) -> &Self::Output {
        &self.0[kind.index()]
    }
}

impl IndexMut<ResourceKind> for ResourceVector {
    fn index_mut(&mut self, kind: ResourceKind) -> &mut Self::Output {
        &mut self.0[kind.index()]
    }
}

impl Add for ResourceVector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        let mut out = self;
        for kind in ResourceKind::ALL {
            out[kind] += rhs[kind];
        }
        out
    }
}

impl Sub for ResourceVector {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self + (-rhs)
    }
}

impl Neg for ResourceVector {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(self.0.map(|value| -value))
    }
}

impl fmt::Display for ResourceVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(kind, value)| format!("{}:{value}", kind.key()))
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

/// Buildable structures with a fixed resource cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureKind {
    Road,
    Settlement,
    City,
}

impl StructureKind {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Road => "road",
            Self::Settlement => "settlement",
            Self::City => "city",
        }
    }

    #[must_use]
    pub const fn cost(self) -> ResourceVector {
        match self {
            Self::Road => ResourceVector::new([1, 1, 0, 0, 0]),
            Self::Settlement => ResourceVector::new([1, 1, 1, 1, 0]),
            Self::City => ResourceVector::new([0, 0, 0, 2, 3]),
        }
    }

    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        let word = token
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_ascii_lowercase();
        match word.as_str() {
            "road" | "roads" => Some(Self::Road),
            "settlement" | "settlements" => Some(Self::Settlement),
            "city" | "cities" => Some(Self::City),
            _ => None,
        }
    }
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Cost of one development card.
pub const DEVELOPMENT_CARD_COST: ResourceVector = ResourceVector::new([0, 0, 1, 1, 1]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synonyms_resolve_to_kinds() {
        assert_eq!(ResourceKind::from_token("Wool,"), Some(ResourceKind::Sheep));
        assert_eq!(ResourceKind::from_token("sheep"), Some(ResourceKind::Sheep));
        assert_eq!(ResourceKind::from_token("lumber"), Some(ResourceKind::Wood));
        assert_eq!(ResourceKind::from_token("WHEAT"), Some(ResourceKind::Wheat));
        assert_eq!(ResourceKind::from_token("bricks"), Some(ResourceKind::Brick));
        assert_eq!(ResourceKind::from_token("road"), None);
    }

    #[test]
    fn keyword_scan_counts_every_unit() {
        let found = scan_keywords("got brick wool and brick");
        assert_eq!(
            found.as_slice(),
            &[ResourceKind::Brick, ResourceKind::Sheep, ResourceKind::Brick]
        );
    }

    #[test]
    fn structure_costs_match_rulebook() {
        let road = StructureKind::Road.cost();
        assert_eq!(road[ResourceKind::Wood], 1);
        assert_eq!(road[ResourceKind::Brick], 1);
        assert_eq!(road.total(), 2);

        let city = StructureKind::City.cost();
        assert_eq!(city[ResourceKind::Ore], 3);
        assert_eq!(city[ResourceKind::Wheat], 2);
        assert_eq!(StructureKind::Settlement.cost().total(), 4);
        assert_eq!(DEVELOPMENT_CARD_COST.total(), 3);
    }

    #[test]
    fn vector_arithmetic_tracks_gains_and_losses() {
        let mut vector = ResourceVector::from_resources(&[ResourceKind::Ore, ResourceKind::Ore]);
        vector.adjust(ResourceKind::Wood, -1);
        assert_eq!(vector.gained(), 2);
        assert_eq!(vector.lost(), -1);
        assert_eq!(vector.first_negative(), Some((ResourceKind::Wood, -1)));

        let cleared = vector - vector;
        assert!(cleared.is_zero());
        assert_eq!(
            ResourceVector::single(ResourceKind::Brick, 2).to_string(),
            "{lumber:0, brick:2, wool:0, grain:0, ore:0}"
        );
    }

    #[test]
    fn resource_kinds_are_ordered_with_symbols() {
        let kinds = resource_kinds();
        assert_eq!(kinds[0].kind, ResourceKind::Wood);
        assert_eq!(kinds[4].key, "ore");
        assert!(kinds.iter().all(|info| !info.symbol.is_empty()));
    }
}
