use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::{ColoredString, Colorize};
use serde::Serialize;
use std::io::Write;

use catan_ledger::{
    AuditEntry, BatchReport, HypothesisSummary, PlayerContext, ResourceKind, ResourceVector,
    Severity, Tracker,
};

/// Everything a replay produced, in report order.
#[derive(Debug, Clone, Serialize)]
pub struct ReplaySummary {
    pub source: String,
    pub generated_at: DateTime<Utc>,
    pub current_player: Option<String>,
    pub players: Vec<PlayerReport>,
    pub outstanding_hypotheses: usize,
    pub batch: BatchReport,
    pub audit: Vec<AuditEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerReport {
    pub player: String,
    pub holdings: ResourceVector,
    pub ranges: Vec<HoldingRange>,
    pub hypotheses: HypothesisSummary,
}

/// Lowest and highest count a player can hold across the open hypotheses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HoldingRange {
    pub kind: ResourceKind,
    pub min: i32,
    pub max: i32,
}

impl HoldingRange {
    pub const fn is_exact(&self) -> bool {
        self.min == self.max
    }

    fn label(&self) -> String {
        if self.is_exact() {
            self.min.to_string()
        } else {
            format!("{}-{}", self.min, self.max)
        }
    }
}

impl PlayerReport {
    fn has_open_hypotheses(&self) -> bool {
        self.hypotheses.gained != [0] || self.hypotheses.lost != [0]
    }
}

impl ReplaySummary {
    pub fn collect<C: PlayerContext>(
        tracker: &Tracker<C>,
        batch: BatchReport,
        source: impl Into<String>,
    ) -> Self {
        let snapshot = tracker.ledger_snapshot();
        let players = snapshot
            .players
            .into_iter()
            .map(|entry| {
                let ranges = ResourceKind::ALL
                    .iter()
                    .filter_map(|&kind| {
                        tracker
                            .holding_bounds(&entry.player, kind)
                            .ok()
                            .map(|(min, max)| HoldingRange { kind, min, max })
                    })
                    .collect();
                let hypotheses = tracker.player_hypothesis_summary(&entry.player);
                PlayerReport {
                    player: entry.player,
                    holdings: entry.holdings,
                    ranges,
                    hypotheses,
                }
            })
            .collect();
        Self {
            source: source.into(),
            generated_at: Utc::now(),
            current_player: tracker.current_player().map(ToString::to_string),
            players,
            outstanding_hypotheses: tracker.outstanding_hypotheses().len(),
            batch,
            audit: tracker.audit_trail(),
        }
    }
}

fn severity_color(entry: &AuditEntry) -> ColoredString {
    let label = format!("{:<8}", entry.severity.label());
    match entry.severity {
        Severity::Debug => label.dimmed(),
        Severity::Info => label.normal(),
        Severity::Warning => label.yellow(),
        Severity::Critical => label.red().bold(),
    }
}

fn join(values: &[i32]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn generate_console_report(writer: &mut dyn Write, summary: &ReplaySummary) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "📊 Catan Ledger Summary".bright_cyan().bold())?;
    writeln!(writer, "{}", "=======================".cyan())?;
    writeln!(writer, "Log: {}", summary.source)?;
    writeln!(
        writer,
        "Viewing player: {}",
        summary.current_player.as_deref().unwrap_or("unknown")
    )?;
    let batch = &summary.batch;
    writeln!(
        writer,
        "Records: {} processed, {} applied, {} hidden steals, {} skipped, {} incomplete, {} ignored",
        batch.processed, batch.applied, batch.deferred, batch.skipped, batch.incomplete, batch.ignored
    )?;
    writeln!(
        writer,
        "Steals resolved: {}  Infeasible: {}",
        batch.commits.to_string().green(),
        batch.infeasible.to_string().yellow()
    )?;
    writeln!(writer)?;

    write!(writer, "{:<16}", "Player".bold())?;
    for kind in ResourceKind::ALL {
        write!(writer, "{:>8}", kind.key().bold())?;
    }
    writeln!(writer)?;
    for report in &summary.players {
        write!(writer, "{:<16}", report.player)?;
        for range in &report.ranges {
            let cell = format!("{:>8}", range.label());
            if range.is_exact() {
                write!(writer, "{cell}")?;
            } else {
                write!(writer, "{}", cell.yellow())?;
            }
        }
        writeln!(writer)?;
    }
    writeln!(writer)?;

    if summary.outstanding_hypotheses > 0 {
        writeln!(
            writer,
            "{}",
            format!("🔍 Open hypotheses: {}", summary.outstanding_hypotheses)
                .bright_yellow()
                .bold()
        )?;
        for report in summary.players.iter().filter(|r| r.has_open_hypotheses()) {
            writeln!(
                writer,
                "   {} may have gained [{}] and lost [{}]",
                report.player.bold(),
                join(&report.hypotheses.gained),
                join(&report.hypotheses.lost)
            )?;
        }
        writeln!(writer)?;
    }

    for violation in &batch.fatal {
        writeln!(writer, "{} {}", "❌".red(), violation.to_string().red())?;
    }

    if !summary.audit.is_empty() {
        writeln!(writer, "{}", "📜 Audit Trail".bright_cyan().bold())?;
        writeln!(writer, "{}", "==============".cyan())?;
        for entry in &summary.audit {
            writeln!(
                writer,
                "[{}] {} {}",
                entry.timestamp.format("%H:%M:%S"),
                severity_color(entry),
                entry.message
            )?;
        }
    }
    Ok(())
}

pub fn generate_json_report(writer: &mut dyn Write, summary: &ReplaySummary) -> Result<()> {
    let json_output = serde_json::to_string_pretty(summary)?;
    writeln!(writer, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report(writer: &mut dyn Write, summary: &ReplaySummary) -> Result<()> {
    writeln!(writer, "# Catan Ledger Replay\n")?;

    let batch = &summary.batch;
    writeln!(writer, "## Summary\n")?;
    writeln!(writer, "- **Log**: {}", summary.source)?;
    writeln!(
        writer,
        "- **Generated**: {}",
        summary.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(
        writer,
        "- **Viewing player**: {}",
        summary.current_player.as_deref().unwrap_or("unknown")
    )?;
    writeln!(writer, "- **Records**: {}", batch.processed)?;
    writeln!(writer, "- **Applied**: {}", batch.applied)?;
    writeln!(writer, "- **Hidden steals**: {}", batch.deferred)?;
    writeln!(writer, "- **Steals resolved**: {}", batch.commits)?;
    writeln!(writer, "- **Infeasible**: {}", batch.infeasible)?;
    writeln!(writer, "- **Open hypotheses**: {}\n", summary.outstanding_hypotheses)?;

    writeln!(writer, "## Holdings\n")?;
    write!(writer, "| Player |")?;
    for kind in ResourceKind::ALL {
        write!(writer, " {} |", kind.key())?;
    }
    writeln!(writer)?;
    writeln!(writer, "|---|---|---|---|---|---|")?;
    for report in &summary.players {
        write!(writer, "| {} |", report.player)?;
        for range in &report.ranges {
            write!(writer, " {} |", range.label())?;
        }
        writeln!(writer)?;
    }
    writeln!(writer)?;

    if !batch.fatal.is_empty() {
        writeln!(writer, "## Failures\n")?;
        for violation in &batch.fatal {
            writeln!(writer, "- {violation}")?;
        }
        writeln!(writer)?;
    }

    if !summary.audit.is_empty() {
        writeln!(writer, "## Audit Trail\n")?;
        for entry in &summary.audit {
            writeln!(
                writer,
                "- `{}` **{}**: {}",
                entry.timestamp.format("%H:%M:%S"),
                entry.severity.label(),
                entry.message
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use catan_ledger::{Icon, LogRecord, TrackerConfig};

    fn replay() -> ReplaySummary {
        let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();
        let records = [
            LogRecord::by("Ann")
                .with_text("got:")
                .with_icon(ResourceKind::Wood),
            LogRecord::by("Ben")
                .with_text("got:")
                .with_icon(ResourceKind::Ore)
                .with_icon(ResourceKind::Brick),
            LogRecord::by("Cat").with_text("got:"),
            LogRecord::by("Ann")
                .with_text("stole:")
                .with_icon(Icon::parse("card_rescardback"))
                .with_text("from Ben"),
        ];
        let batch = tracker.process_batch(&records).unwrap();
        ReplaySummary::collect(&tracker, batch, "game.txt")
    }

    fn render(generate: fn(&mut dyn Write, &ReplaySummary) -> Result<()>) -> String {
        let mut buffer = Vec::new();
        generate(&mut buffer, &replay()).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn summary_reports_ranges_for_open_steals() {
        let summary = replay();
        assert_eq!(summary.outstanding_hypotheses, 2);
        let ann = &summary.players[0];
        assert_eq!(ann.player, "Ann");
        assert!(ann.has_open_hypotheses());
        let ore = ann.ranges[ResourceKind::Ore.index()];
        assert_eq!((ore.min, ore.max), (0, 1));
        assert_eq!(ore.label(), "0-1");
        let wood = ann.ranges[ResourceKind::Wood.index()];
        assert!(wood.is_exact());
        assert!(!summary.players[2].has_open_hypotheses());
    }

    #[test]
    fn json_report_is_parseable() {
        let value: serde_json::Value = serde_json::from_str(&render(generate_json_report)).unwrap();
        assert_eq!(value["source"], "game.txt");
        assert_eq!(value["players"][1]["player"], "Ben");
        assert_eq!(value["batch"]["deferred"], 1);
    }

    #[test]
    fn markdown_report_has_holdings_table() {
        let output = render(generate_markdown_report);
        assert!(output.starts_with("# Catan Ledger Replay"));
        assert!(output.contains("| Player | lumber | brick | wool | grain | ore |"));
        assert!(output.contains("| Ben | 0 | 0-1 | 0 | 0 | 0-1 |"));
        assert!(output.contains("- **Hidden steals**: 1"));
        assert!(output.contains("## Audit Trail"));
    }

    #[test]
    fn console_report_lists_players_and_hypotheses() {
        let output = render(generate_console_report);
        assert!(output.contains("Catan Ledger Summary"));
        assert!(output.contains("Log: game.txt"));
        assert!(output.contains("Viewing player: unknown"));
        assert!(output.contains("Cat"));
        assert!(output.contains("Open hypotheses: 2"));
    }
}
