use std::path::PathBuf;

use anyhow::bail;
use clap::{Parser, Subcommand};
use replaylocate::{
    config::Config,
    locate::{Query, locate},
    logging,
    normalize::DefaultUrlNormalizer,
    timeline::Timeline,
};

#[derive(Debug, Parser)]
#[command(name = "replaylocate")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve a URL (and optional capture timestamp) to a position in the index.
    Locate {
        /// Optional path to config TOML. If omitted, default discovery is used.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Capture index JSON; overrides `[timeline].index` from config.
        #[arg(long)]
        index: Option<PathBuf>,
        /// URL being revisited.
        #[arg(long)]
        url: String,
        /// Capture timestamp to aim for.
        #[arg(long)]
        timestamp: Option<u64>,
        /// Override log level (trace, debug, info, warn, error, off).
        #[arg(long)]
        log_level: Option<String>,
    },
    /// List the captures in an index in timeline order.
    Inspect {
        /// Optional path to config TOML. If omitted, default discovery is used.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Capture index JSON; overrides `[timeline].index` from config.
        #[arg(long)]
        index: Option<PathBuf>,
        /// Override log level (trace, debug, info, warn, error, off).
        #[arg(long)]
        log_level: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LocateOutcome {
    Located {
        index: usize,
        timestamp_raw: String,
        url: String,
    },
    Fallback {
        index: usize,
        timestamp_raw: String,
        url: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct InspectRow {
    index: usize,
    timestamp_raw: String,
    url: String,
}

fn resolve_index_path(
    config: &Config,
    index_override: Option<PathBuf>,
) -> anyhow::Result<PathBuf> {
    if let Some(path) = index_override {
        return Ok(path);
    }
    match config.index_path() {
        Some(path) => Ok(path.to_path_buf()),
        None => bail!("no capture index; pass `--index` or set `[timeline].index` in config"),
    }
}

fn run_locate(
    config: &Config,
    index_override: Option<PathBuf>,
    url: String,
    timestamp: Option<u64>,
) -> anyhow::Result<LocateOutcome> {
    let index_path = resolve_index_path(config, index_override)?;
    let timeline = Timeline::from_path(&index_path)?;
    if timeline.is_empty() {
        bail!("capture index {} is empty", index_path.display());
    }

    let query = Query::new(url, timestamp);
    let resolved = locate(&timeline, &query, &DefaultUrlNormalizer);
    tracing::debug!(
        position = resolved.index(),
        found = resolved.is_found(),
        captures = timeline.len(),
        "resolved replay query"
    );

    let position = resolved.index();
    let Some(capture) = timeline.get(position) else {
        bail!("resolved position {position} is outside the capture index");
    };

    let outcome = if resolved.is_found() {
        LocateOutcome::Located {
            index: position,
            timestamp_raw: capture.timestamp_raw.clone(),
            url: capture.url.clone(),
        }
    } else {
        LocateOutcome::Fallback {
            index: position,
            timestamp_raw: capture.timestamp_raw.clone(),
            url: capture.url.clone(),
        }
    };
    Ok(outcome)
}

fn run_inspect(
    config: &Config,
    index_override: Option<PathBuf>,
) -> anyhow::Result<Vec<InspectRow>> {
    let index_path = resolve_index_path(config, index_override)?;
    let timeline = Timeline::from_path(&index_path)?;
    tracing::debug!(captures = timeline.len(), "loaded capture index");

    Ok(timeline
        .captures()
        .iter()
        .enumerate()
        .map(|(index, capture)| InspectRow {
            index,
            timestamp_raw: capture.timestamp_raw.clone(),
            url: capture.url.clone(),
        })
        .collect())
}

fn print_locate_outcome(outcome: &LocateOutcome) {
    match outcome {
        LocateOutcome::Located {
            index,
            timestamp_raw,
            url,
        } => {
            println!("matched capture {index}: {timestamp_raw} {url}");
        }
        LocateOutcome::Fallback {
            index,
            timestamp_raw,
            url,
        } => {
            println!("no capture matched; defaulting to {index}: {timestamp_raw} {url}");
        }
    }
}

fn print_inspect_rows(rows: &[InspectRow]) {
    for row in rows {
        println!("{}\t{}\t{}", row.index, row.timestamp_raw, row.url);
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Locate {
            config,
            index,
            url,
            timestamp,
            log_level,
        } => {
            let config = Config::load(config.as_deref())?;
            logging::init(&config, log_level.as_deref())?;
            let outcome = run_locate(&config, index, url, timestamp)?;
            print_locate_outcome(&outcome);
        }
        Command::Inspect {
            config,
            index,
            log_level,
        } => {
            let config = Config::load(config.as_deref())?;
            logging::init(&config, log_level.as_deref())?;
            let rows = run_inspect(&config, index)?;
            print_inspect_rows(&rows);
        }
    }

    Ok(())
}
