//! The tracker context object.
//!
//! [`Tracker`] owns every piece of mutable state (ledger, hypotheses, audit
//! trail and alias cache) and drives one record at a time through the same
//! three steps: classify, apply, review. Nothing here is global; callers hold
//! the tracker and pass records in arrival order.

use serde::Serialize;
use thiserror::Error;

use crate::alias::{AliasPath, AliasResolver, AliasUpdate};
use crate::classifier::{Classification, EventClassifier, Operation, OperationFamily, PlayerRef};
use crate::config::{ConfigError, FatalPolicy, TrackerConfig};
use crate::ledger::{LedgerState, LedgerStore};
use crate::narrator::{AuditEntry, EventNarrator};
use crate::record::LogRecord;
use crate::resolver::{
    AmbiguityResolver, CandidateSet, CollapseViolation, HypothesisSummary, Resolution,
};
use crate::resource::{
    DEVELOPMENT_CARD_COST, ResourceKind, ResourceKindInfo, ResourceVector, resource_kinds,
};
use crate::{NoContext, PlayerContext};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error(transparent)]
    Collapse(#[from] CollapseViolation),
    #[error("unknown player '{0}'")]
    UnknownPlayer(String),
    #[error("processing halted at record {position}: {violation}")]
    Halted {
        position: usize,
        violation: CollapseViolation,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// What happened to one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordStatus {
    /// A ledger mutation was applied directly.
    Applied,
    /// A hidden steal was added to the hypotheses.
    Deferred,
    NotAnEvent,
    Incomplete { reason: String },
    /// The record named a player the ledger does not know yet.
    Skipped { player: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordOutcome {
    pub family: Option<OperationFamily>,
    pub status: RecordStatus,
    /// Resolver pass that followed the record.
    pub resolution: Resolution,
}

/// Tally of a [`Tracker::process_batch`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub processed: usize,
    pub applied: usize,
    pub deferred: usize,
    pub skipped: usize,
    pub incomplete: usize,
    pub ignored: usize,
    pub commits: usize,
    pub infeasible: usize,
    pub fatal: Vec<CollapseViolation>,
}

impl BatchReport {
    fn tally(&mut self, outcome: &RecordOutcome) {
        self.processed += 1;
        match outcome.status {
            RecordStatus::Applied => self.applied += 1,
            RecordStatus::Deferred => self.deferred += 1,
            RecordStatus::NotAnEvent => self.ignored += 1,
            RecordStatus::Incomplete { .. } => self.incomplete += 1,
            RecordStatus::Skipped { .. } => self.skipped += 1,
        }
        match &outcome.resolution {
            Resolution::Committed { .. } => self.commits += 1,
            Resolution::Infeasible { .. } => self.infeasible += 1,
            Resolution::Fatal(violation) => self.fatal.push(violation.clone()),
            Resolution::Idle | Resolution::Pending { .. } => {}
        }
    }
}

/// Resource ledger with ambiguous-steal tracking.
#[derive(Debug)]
pub struct Tracker<C: PlayerContext = NoContext> {
    config: TrackerConfig,
    classifier: EventClassifier,
    ledger: LedgerStore,
    resolver: AmbiguityResolver,
    narrator: EventNarrator,
    aliases: AliasResolver,
    context: C,
}

impl Tracker<NoContext> {
    /// Tracker without a context collaborator for the "you" alias.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the configuration does not validate.
    pub fn new(config: TrackerConfig) -> Result<Self, ConfigError> {
        Self::with_context(config, NoContext)
    }
}

impl<C: PlayerContext> Tracker<C> {
    /// # Errors
    ///
    /// Returns `ConfigError` when the configuration does not validate.
    pub fn with_context(config: TrackerConfig, context: C) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut tracker = Self {
            narrator: EventNarrator::with_capacity(config.audit_capacity),
            config,
            classifier: EventClassifier::new(),
            ledger: LedgerStore::new(),
            resolver: AmbiguityResolver::new(),
            aliases: AliasResolver::new(),
            context,
        };
        if let Some(username) = tracker.config.username.clone() {
            tracker.set_current_player_alias(&username);
        }
        Ok(tracker)
    }

    #[must_use]
    pub const fn config(&self) -> &TrackerConfig {
        &self.config
    }

    #[must_use]
    pub const fn context(&self) -> &C {
        &self.context
    }

    pub const fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    #[must_use]
    pub const fn narrator(&self) -> &EventNarrator {
        &self.narrator
    }

    /// Process one record. `previous` must be the record that preceded it in
    /// the log, or `None` for the first one.
    pub fn process(&mut self, record: &LogRecord, previous: Option<&LogRecord>) -> RecordOutcome {
        self.observe_player(record);
        let (family, status) = match self.classifier.classify(record, previous) {
            Classification::NotAnEvent => (None, RecordStatus::NotAnEvent),
            Classification::Incomplete { family, reason } => {
                self.narrator
                    .debug(format!("Ignored {} entry: {reason}", family.label()));
                (Some(family), RecordStatus::Incomplete { reason })
            }
            Classification::Operation(operation) => {
                let family = operation.family();
                (Some(family), self.apply(operation))
            }
        };
        let resolution = self.review();
        if status == RecordStatus::Applied && self.resolver.candidates().is_empty() {
            if let Some((player, kind, amount)) = self.ledger.first_negative() {
                self.narrator.warning(format!(
                    "Negative holding: {player} has {amount} {kind}, an earlier entry was probably misread"
                ));
            }
        }
        RecordOutcome {
            family,
            status,
            resolution,
        }
    }

    /// Like [`Tracker::process`] but turns a fatal resolution into an error,
    /// whatever the configured policy.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Collapse`] when the resolver refused a commit.
    pub fn process_strict(
        &mut self,
        record: &LogRecord,
        previous: Option<&LogRecord>,
    ) -> Result<RecordOutcome, TrackerError> {
        let outcome = self.process(record, previous);
        match outcome.resolution {
            Resolution::Fatal(violation) => Err(TrackerError::Collapse(violation)),
            _ => Ok(outcome),
        }
    }

    /// Process records in order, pairing each with its predecessor.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Halted`] at the first fatal resolution when the
    /// policy is [`FatalPolicy::Halt`].
    pub fn process_batch<'a, I>(&mut self, records: I) -> Result<BatchReport, TrackerError>
    where
        I: IntoIterator<Item = &'a LogRecord>,
    {
        let mut report = BatchReport::default();
        let mut previous: Option<&LogRecord> = None;
        for (position, record) in records.into_iter().enumerate() {
            let outcome = self.process(record, previous);
            self.settle(position, outcome, &mut report)?;
            previous = Some(record);
        }
        Ok(report)
    }

    fn settle(
        &self,
        position: usize,
        outcome: RecordOutcome,
        report: &mut BatchReport,
    ) -> Result<(), TrackerError> {
        report.tally(&outcome);
        match outcome.resolution {
            Resolution::Fatal(violation) if self.config.fatal_policy == FatalPolicy::Halt => {
                Err(TrackerError::Halted {
                    position,
                    violation,
                })
            }
            _ => Ok(()),
        }
    }

    /// Set who "you" is. Applies now if the player is known, otherwise when
    /// the player first appears.
    pub fn set_current_player_alias(&mut self, name: &str) -> AliasUpdate {
        let update = self.aliases.set_preferred(name, self.ledger.players());
        let name = name.trim();
        match update {
            AliasUpdate::Applied => self
                .narrator
                .debug(format!("Set current player to '{name}'")),
            AliasUpdate::Pending => self.narrator.debug(format!(
                "Will set current player to '{name}' as soon as they appear in the game log"
            )),
        }
        update
    }

    #[must_use]
    pub fn current_player(&self) -> Option<&str> {
        self.aliases.current()
    }

    #[must_use]
    pub fn players(&self) -> &[String] {
        self.ledger.players()
    }

    #[must_use]
    pub fn ledger_snapshot(&self) -> LedgerState {
        self.ledger.snapshot()
    }

    #[must_use]
    pub fn resource_kinds(&self) -> [ResourceKindInfo; 5] {
        resource_kinds()
    }

    /// Audit entries oldest first, debug notes included only in debug mode.
    #[must_use]
    pub fn audit_trail(&self) -> Vec<AuditEntry> {
        self.narrator.visible(self.config.debug_mode)
    }

    #[must_use]
    pub const fn outstanding_hypotheses(&self) -> &CandidateSet {
        self.resolver.candidates()
    }

    /// Possible net gains and losses of `player`; `([0], [0])` when nothing
    /// is outstanding or the player is unknown.
    #[must_use]
    pub fn player_hypothesis_summary(&self, player: &str) -> HypothesisSummary {
        match self.ledger.index_of(player) {
            Some(idx) => self.resolver.summary(idx),
            None => AmbiguityResolver::new().summary(0),
        }
    }

    /// Distinct nonzero amounts the hypotheses could still add to one cell.
    #[must_use]
    pub fn possible_adjustments(&self, player: &str, kind: ResourceKind) -> Vec<i32> {
        self.ledger
            .index_of(player)
            .map(|idx| self.resolver.possible_adjustments(idx, kind))
            .unwrap_or_default()
    }

    /// Lowest and highest possible holding of one cell.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::UnknownPlayer`] for a player never seen.
    pub fn holding_bounds(&self, player: &str, kind: ResourceKind) -> Result<(i32, i32), TrackerError> {
        let idx = self
            .ledger
            .index_of(player)
            .ok_or_else(|| TrackerError::UnknownPlayer(player.to_string()))?;
        Ok(self
            .resolver
            .bounds(idx, kind, self.ledger.get(player)[kind]))
    }

    /// Clear ledger, players, hypotheses and audit trail. A preferred alias
    /// goes back to pending.
    pub fn reset(&mut self) {
        self.ledger.reset();
        self.resolver.clear();
        self.narrator.clear();
        self.aliases.reset();
    }

    fn observe_player(&mut self, record: &LogRecord) {
        let Some(name) = record.player.as_deref().map(str::trim) else {
            return;
        };
        if name.is_empty() || PlayerRef::parse(name).is_you() {
            return;
        }
        if self.ledger.ensure(name) {
            if let Some(activated) = self.aliases.activate_pending(self.ledger.players()) {
                let message = format!("Activated pending username '{activated}' as current player");
                self.narrator.debug(message);
            }
        }
    }

    fn resolve_player(&mut self, player: PlayerRef) -> Result<String, String> {
        match player {
            PlayerRef::Named(name) if self.ledger.contains(&name) => Ok(name),
            PlayerRef::Named(name) => Err(name),
            PlayerRef::You => {
                let (name, path) = self
                    .aliases
                    .resolve(self.ledger.players(), &self.context)
                    .ok_or_else(|| String::from("You"))?;
                if path != AliasPath::Cached {
                    self.narrator.debug(format!(
                        "Resolved 'You' to '{name}' ({})",
                        path.describe()
                    ));
                }
                Ok(name)
            }
        }
    }

    fn apply(&mut self, operation: Operation) -> RecordStatus {
        let family = operation.family();
        if let Operation::StartingResources {
            player: PlayerRef::Named(name),
            ..
        } = &operation
        {
            self.ledger.ensure(name);
        }
        let operation = match operation.try_map_players(|player| self.resolve_player(player)) {
            Ok(operation) => operation,
            Err(player) => {
                self.narrator.debug(format!(
                    "Skipped {}: unknown player '{player}'",
                    family.label()
                ));
                return RecordStatus::Skipped { player };
            }
        };
        match operation {
            Operation::StartingResources { player, resources } => {
                self.credit(&player, &resources);
                if resources.is_empty() {
                    self.narrator.info(format!(
                        "{player} received starting resources (details not available)"
                    ));
                } else {
                    self.narrator.info(format!(
                        "{player} received starting resources: {}",
                        describe(&resources)
                    ));
                }
            }
            Operation::Produce { player, resources } => {
                self.credit(&player, &resources);
                self.narrator
                    .info(format!("{player} got {}", describe(&resources)));
            }
            Operation::Build { player, structure } => {
                self.ledger.apply_vector(&player, -structure.cost());
                self.narrator.info(format!("{player} built a {structure}"));
            }
            Operation::BuyDevelopmentCard { player } => {
                self.ledger.apply_vector(&player, -DEVELOPMENT_CARD_COST);
                self.narrator
                    .info(format!("{player} bought a development card"));
            }
            Operation::YearOfPlenty { player, resources } => {
                self.credit(&player, &resources);
                self.narrator.info(format!(
                    "{player} used Year of Plenty: {}",
                    describe(&resources)
                ));
            }
            Operation::BankTrade { player, gave, took } => {
                let change =
                    ResourceVector::from_resources(&took) - ResourceVector::from_resources(&gave);
                self.ledger.apply_vector(&player, change);
                self.narrator.info(format!(
                    "{player} traded with bank: gave {}, took {}",
                    describe(&gave),
                    describe(&took)
                ));
            }
            Operation::Monopoly {
                player,
                resource,
                announced,
            } => {
                let seized = self.ledger.seize_all(&player, resource);
                self.narrator.info(format!(
                    "{player} used Monopoly card: took {seized} {resource}"
                ));
                if i64::from(seized) != i64::from(announced) {
                    self.narrator.warning(format!(
                        "Monopoly by {player} announced {announced} {resource} but the ledger held {seized}"
                    ));
                }
            }
            Operation::Discard { player, resources } => {
                self.ledger
                    .apply_vector(&player, -ResourceVector::from_resources(&resources));
                self.narrator.info(format!(
                    "{player} discarded resources: {}",
                    describe(&resources)
                ));
            }
            Operation::PlayerTrade {
                initiator,
                counterpart,
                offered,
                requested,
            } => {
                if initiator == counterpart {
                    return self.incomplete(family, "trade with self");
                }
                let change = ResourceVector::from_resources(&requested)
                    - ResourceVector::from_resources(&offered);
                self.ledger.apply_vector(&initiator, change);
                self.ledger.apply_vector(&counterpart, -change);
                self.narrator.info(format!(
                    "{initiator} traded with {counterpart}: gave {}, took {}",
                    describe(&offered),
                    describe(&requested)
                ));
            }
            Operation::KnownSteal {
                thief,
                victim,
                resource,
            } => {
                if thief == victim {
                    return self.incomplete(family, "steal from self");
                }
                self.ledger.transfer(&victim, &thief, resource, 1);
                self.narrator
                    .info(format!("{thief} stole from {victim} ({resource})"));
            }
            Operation::UnknownSteal {
                thief,
                victim,
                visible,
            } => {
                if thief == victim {
                    return self.incomplete(family, "steal from self");
                }
                return self.unknown_steal(&thief, &victim, visible.first().copied());
            }
        }
        RecordStatus::Applied
    }

    fn unknown_steal(
        &mut self,
        thief: &str,
        victim: &str,
        visible: Option<ResourceKind>,
    ) -> RecordStatus {
        if let (2, Some(resource)) = (self.ledger.player_count(), visible) {
            self.ledger.transfer(victim, thief, resource, 1);
            self.narrator.debug(format!(
                "1v1 direct steal: {thief} stole {resource} from {victim}"
            ));
            self.narrator
                .info(format!("{thief} stole from {victim} ({resource})"));
            return RecordStatus::Applied;
        }
        let (Some(thief_idx), Some(victim_idx)) =
            (self.ledger.index_of(thief), self.ledger.index_of(victim))
        else {
            return RecordStatus::Skipped {
                player: thief.to_string(),
            };
        };
        let total = self.resolver.register_steal(thief_idx, victim_idx);
        self.narrator
            .info(format!("{thief} stole from {victim} (unknown resource)"));
        self.narrator.debug(format!(
            "Added potential deltas for unknown steal. Total deltas: {total}"
        ));
        RecordStatus::Deferred
    }

    fn credit(&mut self, player: &str, resources: &[ResourceKind]) {
        self.ledger
            .apply_vector(player, ResourceVector::from_resources(resources));
    }

    fn incomplete(&mut self, family: OperationFamily, reason: &str) -> RecordStatus {
        self.narrator
            .debug(format!("Ignored {} entry: {reason}", family.label()));
        RecordStatus::Incomplete {
            reason: reason.to_string(),
        }
    }

    fn review(&mut self) -> Resolution {
        let resolution = self.resolver.review(&mut self.ledger);
        match &resolution {
            Resolution::Idle => {}
            Resolution::Pending { remaining } => self
                .narrator
                .debug(format!("{remaining} potential theft deltas remaining")),
            Resolution::Committed { .. } => {
                self.narrator.info("Resolved ambiguous theft - applied delta");
            }
            Resolution::Infeasible { dropped } => self.narrator.critical(format!(
                "Couldn't resolve thefts: all {dropped} potential deltas ruled out, an earlier entry was probably misread"
            )),
            Resolution::Fatal(violation) => self
                .narrator
                .critical(format!("Couldn't resolve thefts correctly: {violation}")),
        }
        resolution
    }
}

fn describe(resources: &[ResourceKind]) -> String {
    if resources.is_empty() {
        return String::from("nothing");
    }
    resources
        .iter()
        .map(|kind| kind.key())
        .collect::<Vec<_>>()
        .join(", ")
}
