//! Recorded game logs on disk.
//!
//! Two layouts are accepted: JSON Lines, one serialized [`LogRecord`] per
//! line, and plain text where icons are written in brackets, e.g.
//! `Alice got: [lumber] [brick]`.

use anyhow::{Context, Result};
use clap::ValueEnum;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use thiserror::Error;

use catan_ledger::{Icon, LogRecord, PlayerRef};

static ICON_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(?P<icon>[A-Za-z_]+)\]").expect("icon token pattern"));

/// What follows a player's name on a line that player acted on.
static PLAYER_ACTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:got|built|bought|traded|stole|discarded|received|gave\s+bank|took\s+from\s+bank|rolled|placed|used)\b",
    )
    .expect("player action pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Pick by file extension, then by content
    Auto,
    /// One JSON record per line
    Jsonl,
    /// Plain text with [icon] tokens
    Text,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("line {line}: invalid log record")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Read and parse a log file.
pub fn load_records(path: &Path, format: LogFormat) -> Result<Vec<LogRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let format = resolve_format(path, &content, format);
    log::debug!("parsing {} as {format:?}", path.display());
    let records = match format {
        LogFormat::Jsonl | LogFormat::Auto => parse_jsonl(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?,
        LogFormat::Text => parse_text(&content),
    };
    log::info!("loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

fn resolve_format(path: &Path, content: &str, requested: LogFormat) -> LogFormat {
    if requested != LogFormat::Auto {
        return requested;
    }
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("jsonl" | "json" | "ndjson") => LogFormat::Jsonl,
        Some("txt" | "log") => LogFormat::Text,
        _ if content_lines(content).next().is_some_and(|line| line.starts_with('{')) => {
            LogFormat::Jsonl
        }
        _ => LogFormat::Text,
    }
}

/// Trimmed lines that are neither blank nor `#` comments.
fn content_lines(content: &str) -> impl Iterator<Item = &str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

pub fn parse_jsonl(content: &str) -> Result<Vec<LogRecord>, SourceError> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|source| SourceError::Json {
                line: idx + 1,
                source,
            })
        })
        .collect()
}

pub fn parse_text(content: &str) -> Vec<LogRecord> {
    content_lines(content).map(parse_text_line).collect()
}

/// First word of a line that reads "<player> <action> ...". Host lines such
/// as "Giving out starting resources" and "You ..." lines have none.
fn highlighted_player(line: &str) -> Option<&str> {
    let (word, rest) = line.split_once(char::is_whitespace)?;
    let word = word.trim_end_matches(':');
    if word.is_empty() || word.starts_with('[') || PlayerRef::parse(word).is_you() {
        return None;
    }
    PLAYER_ACTION.is_match(rest.trim_start()).then_some(word)
}

/// Parse one text line, taking the highlighted player from its first word.
pub fn parse_text_line(line: &str) -> LogRecord {
    let mut record = LogRecord::new(highlighted_player(line));
    let mut cursor = 0;
    for token in ICON_TOKEN.captures_iter(line) {
        let (Some(whole), Some(icon)) = (token.get(0), token.name("icon")) else {
            continue;
        };
        let text = &line[cursor..whole.start()];
        if !text.trim().is_empty() {
            record = record.with_text(text);
        }
        record = record.with_icon(Icon::parse(icon.as_str()));
        cursor = whole.end();
    }
    let rest = &line[cursor..];
    if !rest.trim().is_empty() {
        record = record.with_text(rest);
    }
    record
}
