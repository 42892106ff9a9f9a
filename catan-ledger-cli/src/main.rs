mod context;
mod reports;
mod settings;
mod source;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;

use catan_ledger::{FatalPolicy, Tracker, TrackerConfig, constants::DEFAULT_AUDIT_CAPACITY};
use context::LogContext;
use reports::ReplaySummary;
use settings::Settings;
use source::{LogFormat, load_records};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Record a resolved steal that leaves a negative holding and keep going
    Continue,
    /// Stop the replay at that record
    Halt,
}

impl From<PolicyArg> for FatalPolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Continue => Self::Continue,
            PolicyArg::Halt => Self::Halt,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "catan-ledger", version)]
#[command(about = "Replay a recorded Catan game log and report every player's resources")]
struct Args {
    /// Game log to replay
    #[arg(required_unless_present = "list_kinds")]
    input: Option<PathBuf>,

    /// Log layout: JSON Lines records or plain text with [icon] tokens
    #[arg(long, value_enum, default_value_t = LogFormat::Auto)]
    format: LogFormat,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Name the log's "you" refers to
    #[arg(long)]
    player: Option<String>,

    /// Settings file holding the remembered player and display flags
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Store --player in the settings file
    #[arg(long, requires_all = ["player", "settings"])]
    remember_player: bool,

    /// What to do when a resolved steal leaves a negative holding
    #[arg(long, value_enum, default_value_t = PolicyArg::Continue)]
    fatal_policy: PolicyArg,

    /// Leave debug notes out of the audit trail
    #[arg(long)]
    no_debug: bool,

    /// Audit entries to keep
    #[arg(long, default_value_t = DEFAULT_AUDIT_CAPACITY)]
    audit_capacity: usize,

    /// List the tracked resource kinds and exit
    #[arg(long)]
    list_kinds: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if maybe_list_kinds(&args)? {
        return Ok(());
    }

    let summary = replay(&args)?;
    write_reports(&args, &summary)?;

    if !summary.batch.fatal.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn maybe_list_kinds(args: &Args) -> Result<bool> {
    if !args.list_kinds {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Resource kinds:")?;
    for info in catan_ledger::resource_kinds() {
        writeln!(output_target.writer(), "  {:8} {}", info.key, info.symbol)?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn load_settings(args: &Args) -> Result<Settings> {
    let Some(path) = args.settings.as_deref() else {
        return Ok(Settings::default());
    };
    let mut settings = Settings::load(path)?;
    if args.remember_player {
        if let Some(player) = args.player.as_deref() {
            settings.remember_username(player);
            settings.save(path)?;
        }
    }
    Ok(settings)
}

fn tracker_config(args: &Args, settings: &Settings) -> TrackerConfig {
    TrackerConfig {
        audit_capacity: args.audit_capacity,
        username: args.player.clone().or_else(|| settings.username.clone()),
        fatal_policy: args.fatal_policy.into(),
        debug_mode: settings.debug_mode && !args.no_debug,
    }
}

fn replay(args: &Args) -> Result<ReplaySummary> {
    let input = args
        .input
        .as_deref()
        .context("no game log given")?;
    let settings = load_settings(args)?;
    let records = load_records(input, args.format)?;
    let context = LogContext::from_records(&records);

    let mut tracker = Tracker::with_context(tracker_config(args, &settings), context)
        .context("invalid tracker settings")?;
    let batch = tracker
        .process_batch(&records)
        .with_context(|| format!("replay of {} stopped", input.display()))?;
    log::info!(
        "replayed {} records, {} hypotheses outstanding",
        batch.processed,
        tracker.outstanding_hypotheses().len()
    );

    Ok(ReplaySummary::collect(
        &tracker,
        batch,
        input.display().to_string(),
    ))
}

fn write_reports(args: &Args, summary: &ReplaySummary) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => reports::generate_json_report(&mut output_target, summary)?,
        "markdown" => reports::generate_markdown_report(&mut output_target, summary)?,
        _ => {
            if summary.players.is_empty() {
                writeln!(&mut output_target, "No players found in {}.", summary.source)?;
            } else {
                reports::generate_console_report(&mut output_target, summary)?;
            }
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
