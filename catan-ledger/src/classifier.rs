//! Log-record classification.
//!
//! Classification is a fixed-priority table of matchers. Each matcher pairs a
//! cheap shape predicate with an extractor that builds a typed [`Operation`].
//! The first matcher whose predicate accepts the record decides the outcome,
//! even when its extractor comes back empty; later matchers are not consulted.

pub mod operation;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub use operation::{Operation, OperationFamily, PlayerRef};

use crate::constants::{
    BANK_GAVE_SNIPPET, BANK_TOOK_SNIPPET, BOUGHT_SNIPPET, BUILT_SNIPPET, DEVELOPMENT_CARD_KEYWORD,
    DISCARDED_SNIPPET, STARTING_RESOURCES_SNIPPET, TRADED_SNIPPET, TRADE_FOR_SNIPPET,
    TRADE_WITH_SNIPPET, YEAR_OF_PLENTY_SNIPPET,
};
use crate::record::{LogRecord, RecordLayout};
use crate::resource::{ResourceList, StructureKind, scan_keywords};

static MONOPOLY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<actor>.+?) stole (?P<count>\d+)(?:\s|$)").expect("monopoly pattern")
});
static STEAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<thief>.+?) stole\b(?P<middle>.*?)\bfrom:?\s+(?P<victim>.+)$")
        .expect("steal pattern")
});
static GOT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<actor>.+?) got\b:?").expect("got pattern"));

/// Result of classifying one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classification {
    Operation(Operation),
    /// The record has the shape of a known family but lacks a required detail.
    Incomplete {
        family: OperationFamily,
        reason: String,
    },
    NotAnEvent,
}

type Extractor = fn(&RecordLayout) -> Result<Operation, &'static str>;

#[derive(Clone, Copy)]
struct Matcher {
    family: OperationFamily,
    /// Families that pair a record with its predecessor only fire when one exists.
    needs_previous: bool,
    accepts: fn(&RecordLayout) -> bool,
    extract: Extractor,
}

const MATCHERS: [Matcher; 11] = [
    Matcher {
        family: OperationFamily::StartingResources,
        needs_previous: false,
        accepts: |layout| layout.text.contains(STARTING_RESOURCES_SNIPPET),
        extract: extract_starting_resources,
    },
    Matcher {
        family: OperationFamily::Monopoly,
        needs_previous: false,
        accepts: |layout| MONOPOLY_RE.is_match(&strip_colons(&layout.text)),
        extract: extract_monopoly,
    },
    Matcher {
        family: OperationFamily::BankTrade,
        needs_previous: false,
        accepts: |layout| {
            layout.text.contains(BANK_GAVE_SNIPPET) && layout.text.contains(BANK_TOOK_SNIPPET)
        },
        extract: extract_bank_trade,
    },
    Matcher {
        family: OperationFamily::YearOfPlenty,
        needs_previous: false,
        accepts: |layout| layout.text.contains(YEAR_OF_PLENTY_SNIPPET),
        extract: extract_year_of_plenty,
    },
    Matcher {
        family: OperationFamily::Build,
        needs_previous: false,
        accepts: |layout| layout.text.contains(BUILT_SNIPPET),
        extract: extract_build,
    },
    Matcher {
        family: OperationFamily::BuyDevelopmentCard,
        needs_previous: false,
        accepts: |layout| layout.text.contains(BOUGHT_SNIPPET) || layout.text.ends_with(" bought"),
        extract: extract_development_card,
    },
    Matcher {
        family: OperationFamily::Discard,
        needs_previous: false,
        accepts: |layout| layout.text.contains(DISCARDED_SNIPPET),
        extract: extract_discard,
    },
    Matcher {
        family: OperationFamily::Produce,
        needs_previous: false,
        accepts: |layout| GOT_RE.is_match(&layout.text),
        extract: extract_produce,
    },
    Matcher {
        family: OperationFamily::PlayerTrade,
        needs_previous: true,
        accepts: |layout| {
            layout.text.contains(TRADED_SNIPPET)
                && layout.text.contains(TRADE_FOR_SNIPPET)
                && layout.text.contains(TRADE_WITH_SNIPPET)
        },
        extract: extract_player_trade,
    },
    Matcher {
        family: OperationFamily::KnownSteal,
        needs_previous: true,
        accepts: accepts_known_steal,
        extract: extract_known_steal,
    },
    Matcher {
        family: OperationFamily::UnknownSteal,
        needs_previous: true,
        accepts: |layout| STEAL_RE.is_match(&layout.text),
        extract: extract_unknown_steal,
    },
];

/// Pure classifier over the fixed matcher table.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventClassifier;

impl EventClassifier {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Classify `record`, using `previous` only to gate the families that
    /// describe a second half of a multi-record exchange.
    #[must_use]
    pub fn classify(&self, record: &LogRecord, previous: Option<&LogRecord>) -> Classification {
        let layout = record.layout();
        if layout.text.is_empty() {
            return Classification::NotAnEvent;
        }
        let Some(matcher) = MATCHERS
            .iter()
            .filter(|matcher| !matcher.needs_previous || previous.is_some())
            .find(|matcher| (matcher.accepts)(&layout))
        else {
            return Classification::NotAnEvent;
        };
        match (matcher.extract)(&layout) {
            Ok(operation) => Classification::Operation(operation),
            Err(reason) => Classification::Incomplete {
                family: matcher.family,
                reason: reason.to_string(),
            },
        }
    }

    /// Families in the order they are tried.
    #[must_use]
    pub fn priority() -> Vec<OperationFamily> {
        MATCHERS.iter().map(|matcher| matcher.family).collect()
    }
}

fn strip_colons(text: &str) -> String {
    text.replace(':', "")
}

/// Name written before `snippet`, or an error when the line starts with it.
fn actor_before(layout: &RecordLayout, snippet: &str) -> Result<PlayerRef, &'static str> {
    let (start, _) = layout.find(snippet).ok_or("snippet not found")?;
    let name = layout.text[..start].trim();
    if name.is_empty() {
        Err("no acting player")
    } else {
        Ok(PlayerRef::parse(name))
    }
}

fn extract_starting_resources(layout: &RecordLayout) -> Result<Operation, &'static str> {
    let player = actor_before(layout, STARTING_RESOURCES_SNIPPET)?;
    let (_, end) = layout
        .find(STARTING_RESOURCES_SNIPPET)
        .ok_or("snippet not found")?;
    Ok(Operation::StartingResources {
        player,
        resources: layout.resources_or_keywords(end, usize::MAX),
    })
}

fn extract_monopoly(layout: &RecordLayout) -> Result<Operation, &'static str> {
    let stripped = strip_colons(&layout.text);
    let captures = MONOPOLY_RE.captures(&stripped).ok_or("not a monopoly")?;
    let player = PlayerRef::parse(&captures["actor"]);
    let announced = captures["count"].parse::<u32>().unwrap_or(0);
    let rest_start = captures.get(0).map_or(stripped.len(), |m| m.end());
    let resource = layout
        .resources()
        .first()
        .copied()
        .or_else(|| scan_keywords(&stripped[rest_start..]).first().copied())
        .ok_or("monopoly resource not visible")?;
    Ok(Operation::Monopoly {
        player,
        resource,
        announced,
    })
}

fn extract_bank_trade(layout: &RecordLayout) -> Result<Operation, &'static str> {
    let player = actor_before(layout, BANK_GAVE_SNIPPET)?;
    let (_, gave_end) = layout.find(BANK_GAVE_SNIPPET).ok_or("snippet not found")?;
    let (took_start, took_end) = layout.rfind(BANK_TOOK_SNIPPET).ok_or("snippet not found")?;
    Ok(Operation::BankTrade {
        player,
        gave: layout.resources_or_keywords(gave_end, took_start),
        took: layout.resources_or_keywords(took_end, usize::MAX),
    })
}

fn extract_year_of_plenty(layout: &RecordLayout) -> Result<Operation, &'static str> {
    let player = actor_before(layout, YEAR_OF_PLENTY_SNIPPET)?;
    let (_, end) = layout
        .find(YEAR_OF_PLENTY_SNIPPET)
        .ok_or("snippet not found")?;
    Ok(Operation::YearOfPlenty {
        player,
        resources: layout.resources_or_keywords(end, usize::MAX),
    })
}

fn extract_build(layout: &RecordLayout) -> Result<Operation, &'static str> {
    let player = actor_before(layout, BUILT_SNIPPET)?;
    let (_, end) = layout.find(BUILT_SNIPPET).ok_or("snippet not found")?;
    let structure = layout
        .structure()
        .or_else(|| {
            layout.text[end..]
                .split_whitespace()
                .find_map(StructureKind::from_token)
        })
        .ok_or("structure not visible")?;
    Ok(Operation::Build { player, structure })
}

fn extract_development_card(layout: &RecordLayout) -> Result<Operation, &'static str> {
    let player = actor_before(layout, " bought")?;
    let named = layout
        .text
        .to_ascii_lowercase()
        .contains(DEVELOPMENT_CARD_KEYWORD);
    if layout.has_development_card() || named {
        Ok(Operation::BuyDevelopmentCard { player })
    } else {
        Err("purchase icon not visible")
    }
}

fn extract_discard(layout: &RecordLayout) -> Result<Operation, &'static str> {
    let player = actor_before(layout, DISCARDED_SNIPPET)?;
    let (_, end) = layout.find(DISCARDED_SNIPPET).ok_or("snippet not found")?;
    Ok(Operation::Discard {
        player,
        resources: layout.resources_or_keywords(end, usize::MAX),
    })
}

fn extract_produce(layout: &RecordLayout) -> Result<Operation, &'static str> {
    let captures = GOT_RE.captures(&layout.text).ok_or("not a dice gain")?;
    let player = PlayerRef::parse(&captures["actor"]);
    let end = captures.get(0).map_or(layout.text.len(), |m| m.end());
    Ok(Operation::Produce {
        player,
        resources: layout.resources_or_keywords(end, usize::MAX),
    })
}

fn extract_player_trade(layout: &RecordLayout) -> Result<Operation, &'static str> {
    let initiator = actor_before(layout, TRADED_SNIPPET)?;
    let (_, traded_end) = layout.find(TRADED_SNIPPET).ok_or("snippet not found")?;
    let (for_start, for_end) = layout.find(TRADE_FOR_SNIPPET).ok_or("snippet not found")?;
    let (with_start, with_end) = layout.rfind(TRADE_WITH_SNIPPET).ok_or("snippet not found")?;
    let counterpart = layout.text[with_end..].trim();
    if counterpart.is_empty() {
        return Err("no counterpart");
    }
    Ok(Operation::PlayerTrade {
        initiator,
        counterpart: PlayerRef::parse(counterpart),
        offered: layout.resources_or_keywords(traded_end, for_start),
        requested: layout.resources_or_keywords(for_end, with_start),
    })
}

struct StealShape {
    thief: PlayerRef,
    victim: PlayerRef,
    middle_start: usize,
    middle_end: usize,
}

fn steal_shape(layout: &RecordLayout) -> Option<StealShape> {
    let captures = STEAL_RE.captures(&layout.text)?;
    let middle = captures.name("middle")?;
    Some(StealShape {
        thief: PlayerRef::parse(&captures["thief"]),
        victim: PlayerRef::parse(&captures["victim"]),
        middle_start: middle.start(),
        middle_end: middle.end(),
    })
}

/// Resources shown in a steal line: icons anywhere, else keywords between
/// "stole" and "from".
fn steal_resources(layout: &RecordLayout, shape: &StealShape) -> ResourceList {
    if layout.has_resource_icons() {
        layout.resources()
    } else {
        scan_keywords(&layout.text[shape.middle_start..shape.middle_end])
    }
}

fn accepts_known_steal(layout: &RecordLayout) -> bool {
    steal_shape(layout).is_some_and(|shape| {
        (shape.thief.is_you() || shape.victim.is_you())
            && !steal_resources(layout, &shape).is_empty()
    })
}

fn extract_known_steal(layout: &RecordLayout) -> Result<Operation, &'static str> {
    let shape = steal_shape(layout).ok_or("not a steal")?;
    let resource = steal_resources(layout, &shape)
        .first()
        .copied()
        .ok_or("stolen resource not visible")?;
    Ok(Operation::KnownSteal {
        thief: shape.thief,
        victim: shape.victim,
        resource,
    })
}

fn extract_unknown_steal(layout: &RecordLayout) -> Result<Operation, &'static str> {
    let shape = steal_shape(layout).ok_or("not a steal")?;
    let visible = steal_resources(layout, &shape);
    Ok(Operation::UnknownSteal {
        thief: shape.thief,
        victim: shape.victim,
        visible,
    })
}
