//! tsinspect - find what changed under a directory during a time window.
//!
//! Usage:
//!   tsinspect --start 2024-05-01T00:00:00Z --window 2h [PATH]
//!   tsinspect --end 1714521600 --window 30m [PATH]
//!   tsinspect --start <TIME> --end <TIME> --format json [PATH]

use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local, Utc};
use clap::{ArgAction, Parser, ValueEnum};
use color_eyre::eyre::{Context, Result, bail, eyre};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tsinspect_core::{InspectConfig, InspectReport, TimestampKind};
use tsinspect_scan::Inspector;

#[derive(Parser)]
#[command(
    name = "tsinspect",
    version,
    about = "Find files and directories touched inside a time window",
    long_about = "tsinspect walks a directory tree and reports every entry whose \
                  creation, access or modification time falls strictly inside \
                  the window. Each directory is reported with the newest match \
                  found anywhere beneath it.\n\n\
                  Give --start and --end, or one of them together with --window."
)]
struct Cli {
    /// Directory to inspect (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Window start (RFC 3339 or Unix seconds)
    #[arg(short, long)]
    start: Option<String>,

    /// Window end (RFC 3339 or Unix seconds)
    #[arg(short, long)]
    end: Option<String>,

    /// Window length (e.g., "90s", "15m", "2h", "3d", "1w"; bare number is seconds)
    #[arg(short, long)]
    window: Option<String>,

    /// Worker threads for probing (0 = one per CPU)
    #[arg(short = 'j', long, default_value = "0")]
    threads: usize,

    /// Maximum depth to descend
    #[arg(short = 'd', long)]
    max_depth: Option<u32>,

    /// Follow symbolic links
    #[arg(short = 'L', long)]
    follow_symlinks: bool,

    /// Skip hidden files and directories
    #[arg(long)]
    no_hidden: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Maximum entries to show per section (text output only)
    #[arg(short = 'n', long)]
    limit: Option<usize>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = InspectConfig::new(&cli.path);
    config.follow_symlinks = cli.follow_symlinks;
    config.include_hidden = !cli.no_hidden;
    config.max_depth = cli.max_depth;
    config.threads = cli.threads;
    if let Some(start) = &cli.start {
        config = config.with_start(parse_time(start)?);
    }
    if let Some(end) = &cli.end {
        config = config.with_end(parse_time(end)?);
    }
    if let Some(window) = &cli.window {
        config = config.with_window(parse_window(window)?);
    }

    let inspector = Inspector::new(config).context("Invalid arguments")?;
    info!(
        root = %inspector.root().display(),
        start = %format_time(inspector.window().start),
        end = %format_time(inspector.window().end),
        "arguments resolved"
    );
    let report = inspector.inspect();
    if report.has_errors() {
        info!(count = report.errors().len(), "some entries could not be probed");
    }

    match cli.format {
        OutputFormat::Text => print!("{}", render_text(&report, cli.limit)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

/// Install the stderr log subscriber; `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Render the report as plain text, one section per timestamp kind.
fn render_text(report: &InspectReport, limit: Option<usize>) -> String {
    let mut out = String::new();
    let limit = limit.unwrap_or(usize::MAX);

    let _ = writeln!(out, "{}", "─".repeat(70));
    let _ = writeln!(out, " {}", report.root.display());
    let _ = writeln!(
        out,
        " window: {} .. {}",
        format_time(report.window.start),
        format_time(report.window.end)
    );
    let _ = writeln!(
        out,
        " {} directories, {} entries, {} matches, {} errors in {:.2}s",
        report.stats.dirs_scanned,
        report.stats.entries_probed,
        report.stats.matches,
        report.stats.errors,
        report.duration.as_secs_f64()
    );
    if report.cancelled {
        let _ = writeln!(out, " (cancelled, results are partial)");
    }
    let _ = writeln!(out, "{}", "─".repeat(70));

    if !report.results.has_matches() {
        let _ = writeln!(out);
        let _ = writeln!(out, " Nothing was touched inside the window.");
    }

    for kind in TimestampKind::ALL {
        let entries = report.results.map(kind).sorted();
        let _ = writeln!(out);
        let _ = writeln!(out, " {} ({}):", kind.label(), entries.len());
        if entries.is_empty() {
            let _ = writeln!(out, "   none");
            continue;
        }
        for (path, stamp) in entries.iter().take(limit) {
            let _ = writeln!(out, "   {}  {}", format_time(*stamp), path);
        }
        let remaining = entries.len().saturating_sub(limit);
        if remaining > 0 {
            let _ = writeln!(out, "   ... and {} more", remaining);
        }
    }

    if report.has_errors() {
        let _ = writeln!(out);
        let _ = writeln!(out, " Errors ({}):", report.errors().len());
        for (path, err) in report.results.sorted_errors() {
            let _ = writeln!(out, "   {}: {}", path.display(), err);
        }
    }

    out
}

/// Format a timestamp in local time.
fn format_time(t: SystemTime) -> String {
    DateTime::<Local>::from(t)
        .format("%Y-%m-%d %H:%M:%S%.3f")
        .to_string()
}

/// Parse a point in time: integer Unix seconds or an RFC 3339 timestamp.
fn parse_time(s: &str) -> Result<SystemTime> {
    let s = s.trim();

    if let Ok(secs) = s.parse::<i64>() {
        let dt = DateTime::<Utc>::from_timestamp(secs, 0)
            .ok_or_else(|| eyre!("Timestamp out of range: {}", s))?;
        return Ok(dt.into());
    }

    let dt = DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("Invalid time '{}': expected RFC 3339 or Unix seconds", s))?;
    Ok(dt.into())
}

/// Parse a window length (e.g., "90s", "15m", "2h", "3d", "1w").
fn parse_window(s: &str) -> Result<Duration> {
    let s = s.trim().to_lowercase();

    let (num, multiplier) = if s.ends_with('w') {
        let num: f64 = s.trim_end_matches('w').parse()?;
        (num, 7.0 * 24.0 * 60.0 * 60.0)
    } else if s.ends_with('d') {
        let num: f64 = s.trim_end_matches('d').parse()?;
        (num, 24.0 * 60.0 * 60.0)
    } else if s.ends_with('h') {
        let num: f64 = s.trim_end_matches('h').parse()?;
        (num, 60.0 * 60.0)
    } else if s.ends_with('m') {
        let num: f64 = s.trim_end_matches('m').parse()?;
        (num, 60.0)
    } else if s.ends_with('s') {
        let num: f64 = s.trim_end_matches('s').parse()?;
        (num, 1.0)
    } else {
        let num: f64 = s.parse()?;
        (num, 1.0)
    };

    if !num.is_finite() || num < 0.0 {
        bail!("Window length must be a non-negative number: {}", s);
    }
    Duration::try_from_secs_f64(num * multiplier)
        .map_err(|_| eyre!("Window length out of range: {}", s))
}
