//! Identity of the viewing player as recorded alongside the log.
//!
//! Exported logs keep the host's highlighted player name on lines the viewer
//! wrote in the second person ("You rolled", "Your turn"). Those are the only
//! lines that tie "you" to a name.

use once_cell::sync::Lazy;
use regex::Regex;

use catan_ledger::{LogRecord, PlayerContext};

static SECOND_PERSON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:you\s+(?:rolled|built|bought|traded|stole)\b|your\s+turn\b)")
        .expect("second person pattern")
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogContext {
    highlighted: Vec<String>,
}

impl LogContext {
    pub fn from_records(records: &[LogRecord]) -> Self {
        let mut highlighted: Vec<String> = Vec::new();
        for record in records {
            let Some(player) = record.player.as_deref() else {
                continue;
            };
            if SECOND_PERSON.is_match(&record.text()) && !highlighted.iter().any(|h| h == player) {
                log::debug!("log highlights '{player}' on a second-person line");
                highlighted.push(player.to_string());
            }
        }
        Self { highlighted }
    }

    pub fn highlighted(&self) -> &[String] {
        &self.highlighted
    }
}

impl PlayerContext for LogContext {
    fn current_player(&self, known_players: &[String]) -> Option<String> {
        self.highlighted
            .iter()
            .find(|name| known_players.contains(name))
            .cloned()
    }
}
