use catan_ledger::{
    AliasUpdate, AmbiguityResolver, FatalPolicy, Icon, LedgerStore, LogRecord, PlayerContext,
    RecordStatus, Resolution, ResourceKind, ResourceVector, Tracker, TrackerConfig,
};

fn with_icons(mut record: LogRecord, kinds: &[ResourceKind]) -> LogRecord {
    for &kind in kinds {
        record = record.with_icon(kind);
    }
    record
}

fn gain(player: &str, kinds: &[ResourceKind]) -> LogRecord {
    with_icons(LogRecord::by(player).with_text("got:"), kinds)
}

fn hidden_steal(thief: &str, victim: &str) -> LogRecord {
    LogRecord::by(thief)
        .with_text("stole:")
        .with_icon(Icon::parse("card_rescardback"))
        .with_text(format!("from {victim}"))
}

/// A short game with several overlapping hidden steals.
fn noisy_game() -> Vec<LogRecord> {
    vec![
        gain("Ann", &[ResourceKind::Wood, ResourceKind::Ore]),
        gain("Ben", &[ResourceKind::Brick, ResourceKind::Sheep, ResourceKind::Sheep]),
        gain("Cat", &[ResourceKind::Wheat, ResourceKind::Wheat]),
        hidden_steal("Ann", "Ben"),
        hidden_steal("Cat", "Ben"),
        gain("Ann", &[ResourceKind::Brick]),
        hidden_steal("Ben", "Ann"),
        LogRecord::by("Cat").with_text("rolled a 9"),
        hidden_steal("Ann", "Cat"),
        with_icons(LogRecord::by("Cat").with_text("discarded:"), &[ResourceKind::Wheat]),
    ]
}

fn rows(tracker: &Tracker) -> Vec<ResourceVector> {
    tracker
        .ledger_snapshot()
        .players
        .into_iter()
        .map(|entry| entry.holdings)
        .collect()
}

#[test]
fn committed_ledger_never_goes_negative() {
    let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();
    let records = noisy_game();
    let mut previous = None;
    for record in &records {
        let outcome = tracker.process(record, previous);
        if matches!(outcome.resolution, Resolution::Committed { .. }) {
            assert!(tracker.ledger_snapshot().is_non_negative());
        }
        previous = Some(record);
    }
}

#[test]
fn retained_candidates_are_always_feasible() {
    let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();
    let records = noisy_game();
    let mut previous = None;
    let mut saw_pending = false;
    for record in &records {
        let outcome = tracker.process(record, previous);
        saw_pending |= matches!(outcome.resolution, Resolution::Pending { .. });
        let ledger = rows(&tracker);
        assert!(
            tracker
                .outstanding_hypotheses()
                .iter()
                .all(|candidate| candidate.is_feasible(&ledger) && !candidate.is_identity())
        );
        previous = Some(record);
    }
    assert!(saw_pending);
}

#[test]
fn review_is_idempotent() {
    let mut ledger = LedgerStore::new();
    for player in ["A", "B", "C"] {
        ledger.ensure(player);
    }
    ledger.apply_vector("B", ResourceVector::new([1, 1, 1, 0, 0]));
    ledger.apply_vector("C", ResourceVector::new([0, 0, 0, 2, 1]));

    let mut resolver = AmbiguityResolver::new();
    resolver.register_steal(0, 1);
    resolver.register_steal(0, 2);
    let first = resolver.review(&mut ledger);
    let after_first = resolver.candidates().clone();
    let second = resolver.review(&mut ledger);
    assert_eq!(first, second);
    assert_eq!(resolver.candidates(), &after_first);
    assert_eq!(first, Resolution::Pending { remaining: 6 });
}

#[test]
fn collapse_is_final_until_a_new_hint() {
    let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();
    let records = [
        gain("Ann", &[]),
        gain("Ben", &[ResourceKind::Ore]),
        gain("Cat", &[]),
        hidden_steal("Ann", "Ben"),
        LogRecord::by("Cat").with_text("rolled a 3"),
        gain("Cat", &[ResourceKind::Wood]),
    ];
    let report = tracker.process_batch(&records).unwrap();
    assert_eq!(report.commits, 1);
    assert_eq!(report.deferred, 1);
    assert!(tracker.outstanding_hypotheses().is_empty());

    let idle = tracker.process(&LogRecord::by("Ann").with_text("rolled a 8"), records.last());
    assert_eq!(idle.resolution, Resolution::Idle);
    assert!(tracker.outstanding_hypotheses().is_empty());
}

#[test]
fn halt_policy_does_not_stop_on_infeasible_sets() {
    let mut tracker = Tracker::new(TrackerConfig {
        fatal_policy: FatalPolicy::Halt,
        ..TrackerConfig::default()
    })
    .unwrap();
    let records = [
        gain("Ann", &[]),
        gain("Ben", &[]),
        gain("Cat", &[]),
        hidden_steal("Ann", "Ben"),
        gain("Ben", &[ResourceKind::Sheep]),
    ];
    let report = tracker.process_batch(&records).unwrap();
    assert_eq!(report.infeasible, 1);
    assert_eq!(report.processed, 5);
    assert_eq!(
        tracker.ledger_snapshot().get("Ben"),
        Some(&ResourceVector::single(ResourceKind::Sheep, 1))
    );
}

struct Highlighted(&'static str);

impl PlayerContext for Highlighted {
    fn current_player(&self, known_players: &[String]) -> Option<String> {
        known_players
            .iter()
            .find(|name| name.as_str() == self.0)
            .cloned()
    }
}

#[test]
fn you_prefers_configured_name_over_context() {
    let config = TrackerConfig {
        username: Some(String::from("Ben")),
        ..TrackerConfig::default()
    };
    let mut tracker = Tracker::with_context(config, Highlighted("Ann")).unwrap();
    let records = [
        gain("Ann", &[]),
        gain("Ben", &[]),
        with_icons(LogRecord::new(None).with_text("You got:"), &[ResourceKind::Ore]),
    ];
    tracker.process_batch(&records).unwrap();
    assert_eq!(tracker.current_player(), Some("Ben"));
    assert_eq!(
        tracker.ledger_snapshot().get("Ben").map(|row| row[ResourceKind::Ore]),
        Some(1)
    );
}

#[test]
fn you_uses_context_before_fallback() {
    let mut tracker =
        Tracker::with_context(TrackerConfig::default(), Highlighted("Ben")).unwrap();
    let records = [
        gain("Ann", &[]),
        gain("Ben", &[]),
        with_icons(LogRecord::new(None).with_text("You got:"), &[ResourceKind::Wood]),
    ];
    tracker.process_batch(&records).unwrap();
    assert_eq!(tracker.current_player(), Some("Ben"));
    assert!(
        tracker
            .audit_trail()
            .iter()
            .any(|entry| entry.message == "Resolved 'You' to 'Ben' (game context)")
    );
}

#[test]
fn you_before_any_player_is_skipped() {
    let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();
    let outcome = tracker.process(
        &with_icons(LogRecord::new(None).with_text("You got:"), &[ResourceKind::Wood]),
        None,
    );
    assert!(matches!(outcome.status, RecordStatus::Skipped { .. }));
    assert_eq!(tracker.current_player(), None);
}

#[test]
fn alias_set_mid_game_applies_immediately() {
    let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();
    tracker.process(&gain("Ann", &[]), None);
    assert_eq!(tracker.set_current_player_alias("Ann"), AliasUpdate::Applied);
    assert_eq!(tracker.set_current_player_alias("Zed"), AliasUpdate::Pending);
    assert_eq!(tracker.current_player(), Some("Ann"));
    tracker.process(&gain("Zed", &[]), None);
    assert_eq!(tracker.current_player(), Some("Zed"));
}

#[test]
fn reset_clears_state_but_keeps_pending_alias() {
    let config = TrackerConfig {
        username: Some(String::from("Ben")),
        ..TrackerConfig::default()
    };
    let mut tracker = Tracker::new(config).unwrap();
    let records = [
        gain("Ann", &[ResourceKind::Wood]),
        gain("Ben", &[ResourceKind::Ore, ResourceKind::Wood]),
        gain("Cat", &[]),
        hidden_steal("Ann", "Ben"),
    ];
    tracker.process_batch(&records).unwrap();
    assert!(!tracker.outstanding_hypotheses().is_empty());
    assert_eq!(tracker.current_player(), Some("Ben"));

    tracker.reset();
    assert!(tracker.players().is_empty());
    assert!(tracker.outstanding_hypotheses().is_empty());
    assert!(tracker.audit_trail().is_empty());
    assert_eq!(tracker.current_player(), None);

    tracker.process(&gain("Ben", &[]), None);
    assert_eq!(tracker.current_player(), Some("Ben"));
}

#[test]
fn resource_kinds_and_snapshot_serialize() {
    let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();
    tracker.process(&gain("Ann", &[ResourceKind::Sheep]), None);
    let kinds = tracker.resource_kinds();
    assert_eq!(
        kinds.iter().map(|info| info.key).collect::<Vec<_>>(),
        ["lumber", "brick", "wool", "grain", "ore"]
    );
    let json = serde_json::to_value(tracker.ledger_snapshot()).unwrap();
    assert_eq!(json["players"][0]["player"], "Ann");
    assert_eq!(json["players"][0]["holdings"][2], 1);
    assert!(tracker.holding_bounds("Nobody", ResourceKind::Ore).is_err());
    assert_eq!(
        tracker.player_hypothesis_summary("Nobody").gained,
        vec![0]
    );
}
