//! # chordsync
//!
//! Chord-timing synchronization engine for chord-along playback.
//!
//! ## Purpose
//! Given a chord analysis of a song and the song's duration, this crate:
//! 1. **Normalizes** untrusted analysis data into an ordered `Progression`
//! 2. **Detects** degenerate placeholder timing (uniform, unrealistically long chords)
//! 3. **Repairs** degenerate progressions with a realistic song structure
//! 4. **Validates** coverage (no overlaps, no overrun, silence accounted for)
//! 5. **Resolves** the chord sounding at any playback time
//!
//! The engine is pure: no I/O, no audio, no UI state. A progression is built once
//! and then only read.
//!
//! ## Modules
//! - `model` - ChordEvent, Progression, SongDuration, TimingOffset, raw payload types
//! - `chord` - Chord symbol parsing and no-chord markers
//! - `normalize` - Raw payload to progression
//! - `anomaly` - Uniform-interval anomaly detection
//! - `synth` - Progression generation and repair
//! - `coverage` - Gap/overlap/coverage validation
//! - `resolve` - Active-chord lookup
//! - `display` - Caller-held display state for silence periods
//! - `summary` - Key and tempo estimates
//! - `config` - Tunable parameters (YAML)
//! - `api` - The preparation pipeline

pub mod anomaly;
pub mod api;
pub mod chord;
pub mod config;
pub mod coverage;
pub mod display;
pub mod error;
pub mod model;
pub mod normalize;
pub mod resolve;
pub mod summary;
pub mod synth;

pub use anomaly::{detect_anomaly, AnomalyReport};
pub use api::{generate, prepare, prepare_json, prepare_with_config, PreparedProgression};
pub use config::{DetectorParams, SyncConfig, SynthesisParams};
pub use coverage::{validate_coverage, CoverageReport, Gap, Overlap};
pub use display::{displayed_chord, ChordDisplay, SilencePolicy};
pub use error::SyncError;
pub use model::{
    ChordEvent, ChordSource, Progression, RawAnalysis, RawChord, SongDuration, TimingOffset,
};
pub use normalize::normalize;
pub use resolve::{resolve, upcoming, ActiveChord};
pub use summary::{summarize, ProgressionSummary};
pub use synth::{repair, synthesize};
