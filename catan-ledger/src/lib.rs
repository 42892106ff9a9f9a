//! Catan Ledger Engine
//!
//! Platform-agnostic resource tracking for Catan game logs. Feed log records
//! into a [`Tracker`] in order; it keeps a per-player resource ledger and the
//! set of hypotheses for steals whose resource was hidden, committing them as
//! soon as the ledger leaves only one possibility.

pub mod alias;
pub mod classifier;
pub mod config;
pub mod constants;
pub mod ledger;
pub mod narrator;
pub mod record;
pub mod resolver;
pub mod resource;
pub mod tracker;

// Re-export commonly used types
pub use alias::{AliasPath, AliasResolver, AliasUpdate};
pub use classifier::{Classification, EventClassifier, Operation, OperationFamily, PlayerRef};
pub use config::{ConfigError, FatalPolicy, TrackerConfig};
pub use ledger::{LedgerState, LedgerStore, PlayerHoldings};
pub use narrator::{AuditEntry, EventNarrator, Severity};
pub use record::{Fragment, Icon, LogRecord, RecordLayout};
pub use resolver::{
    AmbiguityResolver, CandidateDelta, CandidateSet, CollapseViolation, HypothesisSummary,
    Resolution,
};
pub use resource::{
    DEVELOPMENT_CARD_COST, RESOURCE_COUNT, ResourceKind, ResourceKindInfo, ResourceList,
    ResourceVector, StructureKind, resource_kinds,
};
pub use tracker::{BatchReport, RecordOutcome, RecordStatus, Tracker, TrackerError};

/// Source of the current player's identity when the log only says "you".
/// Platform-specific implementations read it from whatever surrounds the log.
pub trait PlayerContext {
    /// Name of the viewing player among `known_players`, if it can be told.
    fn current_player(&self, known_players: &[String]) -> Option<String>;
}

/// Context that never knows who "you" is.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoContext;

impl PlayerContext for NoContext {
    fn current_player(&self, _known_players: &[String]) -> Option<String> {
        None
    }
}
