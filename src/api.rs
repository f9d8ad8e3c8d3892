//! # Public API
//!
//! Entry points that run the whole preparation pipeline.
//!
//! ## Pipeline
//! ```text
//! RawAnalysis ──> normalize ──> detect_anomaly ──┬── authentic ──────────┬──> validate_coverage ──> PreparedProgression
//!                                                └── degenerate ─> repair ┘
//! ```
//!
//! With `repair-invalid` set, a progression that fails coverage validation is
//! also sent through `repair` (and validated again).
//!
//! ## Functions
//! - [`prepare()`] - Default configuration
//! - [`prepare_with_config()`] - Custom configuration
//! - [`prepare_json()`] - Parse a JSON payload, then prepare
//! - [`generate()`] - Fresh progression from bare chord labels
//!
//! ## Typical Usage
//!
//! ```rust
//! use chordsync::{prepare_json, resolve, SyncConfig, TimingOffset};
//!
//! let payload = r#"{
//!   "songDuration": 120,
//!   "chords": [
//!     {"chord": "Em", "startTime": 0,  "duration": 15},
//!     {"chord": "Am", "startTime": 15, "duration": 15},
//!     {"chord": "Dm", "startTime": 30, "duration": 15},
//!     {"chord": "G",  "startTime": 45, "duration": 15}
//!   ]
//! }"#;
//!
//! let prepared = prepare_json(payload, &SyncConfig::default())?;
//! assert!(prepared.anomaly.degenerate);
//! assert!(prepared.repaired);
//! assert!(prepared.coverage.valid);
//!
//! // Intro silence, then the first chord
//! assert!(resolve(&prepared.progression, 2.0, TimingOffset::ZERO).is_none());
//! assert_eq!(resolve(&prepared.progression, 8.0, TimingOffset::ZERO).unwrap().event.chord, "Em");
//! # Ok::<(), chordsync::SyncError>(())
//! ```

use serde::Serialize;
use tracing::{info, warn};

use crate::anomaly::{detect_anomaly, AnomalyReport};
use crate::config::SyncConfig;
use crate::coverage::{validate_coverage, CoverageReport};
use crate::error::SyncError;
use crate::model::{Progression, RawAnalysis, SongDuration};
use crate::normalize::normalize;
use crate::synth::{repair, synthesize};

/// A progression ready for playback, with the diagnostics that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedProgression {
    pub progression: Progression,
    /// Classification of the normalized input (before any repair)
    pub anomaly: AnomalyReport,
    /// Validation of `progression` (after any repair)
    pub coverage: CoverageReport,
    /// Whether `progression` was regenerated by the synthesizer
    pub repaired: bool,
}

/// Prepare a raw payload with the default configuration.
///
/// # Errors
/// Returns `SyncError::InvalidSongDuration` if the song duration is not positive.
pub fn prepare(raw: &RawAnalysis) -> Result<PreparedProgression, SyncError> {
    prepare_with_config(raw, &SyncConfig::default())
}

/// Prepare a raw payload: normalize, detect, repair if degenerate, validate.
///
/// # Errors
/// Returns `SyncError::InvalidSongDuration` if the song duration is not
/// positive. Every other problem in the payload degrades instead of failing.
pub fn prepare_with_config(
    raw: &RawAnalysis,
    config: &SyncConfig,
) -> Result<PreparedProgression, SyncError> {
    let normalized = normalize(raw, config)?;
    let anomaly = detect_anomaly(&normalized, &config.detector, config.tolerance);

    let (progression, repaired) = if anomaly.degenerate {
        info!(
            chords = normalized.len(),
            uniform_duration = anomaly.uniform_duration,
            "uniform-interval anomaly detected, repairing"
        );
        (repair(&normalized, &config.synthesis), true)
    } else {
        (normalized, false)
    };

    let mut coverage = validate_coverage(&progression, config.tolerance);
    let (progression, repaired) = if !coverage.valid && config.repair_invalid && !repaired {
        info!(
            overlaps = coverage.overlaps.len(),
            overrun = coverage.overrun,
            "coverage invalid, repairing"
        );
        let fixed = repair(&progression, &config.synthesis);
        coverage = validate_coverage(&fixed, config.tolerance);
        (fixed, true)
    } else {
        (progression, repaired)
    };

    if !coverage.valid {
        warn!(
            overlaps = coverage.overlaps.len(),
            overrun = coverage.overrun,
            "progression failed coverage validation"
        );
    }

    Ok(PreparedProgression {
        progression,
        anomaly,
        coverage,
        repaired,
    })
}

/// Parse a JSON analysis payload and prepare it.
///
/// # Errors
/// `SyncError::Payload` for malformed JSON, otherwise as [`prepare_with_config`].
pub fn prepare_json(payload: &str, config: &SyncConfig) -> Result<PreparedProgression, SyncError> {
    let raw: RawAnalysis = serde_json::from_str(payload)?;
    prepare_with_config(&raw, config)
}

/// Generate a fresh progression from bare chord labels and validate it.
///
/// # Example
/// ```rust
/// use chordsync::{generate, SyncConfig};
///
/// let prepared = generate(&["C", "G", "Am", "F"], 200.0, &SyncConfig::default())?;
/// assert_eq!(prepared.progression.len(), 4);
/// assert!(prepared.coverage.valid);
/// # Ok::<(), chordsync::SyncError>(())
/// ```
pub fn generate<S: AsRef<str>>(
    labels: &[S],
    song_duration: f64,
    config: &SyncConfig,
) -> Result<PreparedProgression, SyncError> {
    let song_duration = SongDuration::new(song_duration)?;
    let progression = synthesize(labels, song_duration, &config.synthesis);
    let anomaly = detect_anomaly(&progression, &config.detector, config.tolerance);
    let coverage = validate_coverage(&progression, config.tolerance);
    Ok(PreparedProgression {
        progression,
        anomaly,
        coverage,
        repaired: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChordSource, RawChord};

    fn uniform(labels: &[&str], duration: f64, song_duration: f64) -> RawAnalysis {
        RawAnalysis {
            song_duration,
            chords: labels
                .iter()
                .enumerate()
                .map(|(i, c)| RawChord::new(*c, i as f64 * duration, duration))
                .collect(),
        }
    }

    #[test]
    fn test_authentic_input_passes_through() {
        let raw = RawAnalysis {
            song_duration: 60.0,
            chords: vec![
                RawChord::new("Em", 8.0, 4.0),
                RawChord::new("Am", 12.0, 4.0),
                RawChord::new("Dm", 16.0, 3.0),
                RawChord::new("G", 19.0, 5.0),
            ],
        };
        let prepared = prepare(&raw).unwrap();
        assert!(!prepared.repaired);
        assert!(!prepared.anomaly.degenerate);
        assert!(prepared.coverage.valid);
        assert_eq!(prepared.progression.events()[2].start_time, 16.0);
        assert!(prepared
            .progression
            .iter()
            .all(|e| e.source == ChordSource::Detected));
    }

    #[test]
    fn test_degenerate_input_is_repaired() {
        let raw = uniform(&["Em", "Am", "Dm", "G", "Em", "Am", "Dm", "G"], 15.0, 120.0);
        let prepared = prepare(&raw).unwrap();
        assert!(prepared.repaired);
        assert_eq!(prepared.anomaly.uniform_duration, Some(15.0));
        assert!(prepared
            .progression
            .iter()
            .all(|e| e.source == ChordSource::Repaired));
        assert!(prepared.coverage.valid);
    }

    #[test]
    fn test_invalid_coverage_reported_not_repaired_by_default() {
        let raw = RawAnalysis {
            song_duration: 10.0,
            chords: vec![RawChord::new("C", 0.0, 4.0), RawChord::new("G", 2.0, 4.0)],
        };
        let prepared = prepare(&raw).unwrap();
        assert!(!prepared.repaired);
        assert!(!prepared.coverage.valid);
        assert_eq!(prepared.coverage.overlaps.len(), 1);
    }

    #[test]
    fn test_repair_invalid_option() {
        let raw = RawAnalysis {
            song_duration: 60.0,
            chords: vec![RawChord::new("C", 0.0, 4.0), RawChord::new("G", 2.0, 4.0)],
        };
        let config = SyncConfig {
            repair_invalid: true,
            ..SyncConfig::default()
        };
        let prepared = prepare_with_config(&raw, &config).unwrap();
        assert!(prepared.repaired);
        assert!(prepared.coverage.valid);
        assert_eq!(prepared.progression.labels().collect::<Vec<_>>(), vec!["C", "G"]);
    }

    #[test]
    fn test_bad_json() {
        let result = prepare_json("{\"chords\": []}", &SyncConfig::default());
        assert!(matches!(result, Err(SyncError::Payload(_))));
    }

    #[test]
    fn test_generate_rejects_bad_song_duration() {
        let result = generate(&["C"], -5.0, &SyncConfig::default());
        assert!(matches!(result, Err(SyncError::InvalidSongDuration(_))));
    }
}
