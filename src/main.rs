//! chordsync - diagnostics CLI for the chord synchronization engine
//!
//! Subcommands:
//! - `chordsync prepare <payload.json>` - Normalize, repair and validate a payload
//! - `chordsync resolve <payload.json> --at <secs>` - Chord sounding at a time
//! - `chordsync generate --song-duration <secs> <labels...>` - Synthesize a progression
//!
//! All output is JSON on stdout; logs go to stderr (`RUST_LOG` controls them).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use chordsync::{
    generate, prepare_json, resolve, summarize, upcoming, ActiveChord, PreparedProgression,
    ProgressionSummary, SyncConfig, TimingOffset,
};

#[derive(Parser)]
#[command(name = "chordsync")]
#[command(about = "Repair, validate and query chord progressions against playback time")]
#[command(version)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize, repair and validate an analysis payload
    Prepare {
        /// JSON payload: {"songDuration": .., "chords": [..]}
        payload: PathBuf,
    },

    /// Resolve the chord sounding at a playback time
    Resolve {
        /// JSON payload
        payload: PathBuf,

        /// Player position in seconds
        #[arg(short, long)]
        at: f64,

        /// Timing offset in seconds added to the position
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        offset: f64,
    },

    /// Generate a progression from bare chord labels
    Generate {
        /// Song duration in seconds
        #[arg(short, long)]
        song_duration: f64,

        /// Chord labels in order
        #[arg(required = true)]
        labels: Vec<String>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PrepareOutput<'a> {
    #[serde(flatten)]
    prepared: &'a PreparedProgression,
    summary: ProgressionSummary,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResolveOutput<'a> {
    time: f64,
    offset: f64,
    active: Option<ActiveChord<'a>>,
    upcoming: Option<ActiveChord<'a>>,
    repaired: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = match &cli.config {
        Some(path) => SyncConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SyncConfig::default(),
    };

    match cli.command {
        Commands::Prepare { payload } => {
            let prepared = load_and_prepare(&payload, &config)?;
            print_json(&PrepareOutput {
                summary: summarize(&prepared.progression),
                prepared: &prepared,
            })?;
        }
        Commands::Resolve { payload, at, offset } => {
            let prepared = load_and_prepare(&payload, &config)?;
            let offset = TimingOffset::new(offset);
            print_json(&ResolveOutput {
                time: at,
                offset: offset.seconds(),
                active: resolve(&prepared.progression, at, offset),
                upcoming: upcoming(&prepared.progression, at, offset),
                repaired: prepared.repaired,
            })?;
        }
        Commands::Generate {
            song_duration,
            labels,
        } => {
            let prepared = generate(&labels, song_duration, &config)?;
            print_json(&PrepareOutput {
                summary: summarize(&prepared.progression),
                prepared: &prepared,
            })?;
        }
    }

    Ok(())
}

fn load_and_prepare(path: &Path, config: &SyncConfig) -> Result<PreparedProgression> {
    let payload = fs::read_to_string(path)
        .with_context(|| format!("reading payload {}", path.display()))?;
    let prepared = prepare_json(&payload, config)
        .with_context(|| format!("preparing payload {}", path.display()))?;
    Ok(prepared)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
