//! # Anomaly Detection
//!
//! Classifies a progression as authentic or degenerate before it is trusted
//! for playback.
//!
//! ## Uniform-Interval Anomaly
//! Upstream analysis sometimes falls back to placeholder timing: every chord
//! stamped with the same long duration (15 s is typical), laid end to end.
//! Real chord changes rarely last longer than 8 seconds, and real songs have
//! silences between sections.
//!
//! A progression is **degenerate** only when both hold:
//! 1. **Uniform duration** - all durations round to one value, and that value
//!    exceeds `unrealistic-duration`
//! 2. **Continuity** - every chord starts where the previous one ended (within
//!    tolerance)
//!
//! A uniform progression with real gaps may be an authentic sparse sampling
//! and is left alone.
//!
//! ## Related Modules
//! - `synth` - Regenerates degenerate progressions
//! - `api` - Runs detection on every inbound payload

use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::DetectorParams;
use crate::model::Progression;

/// Result of anomaly detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyReport {
    /// Uniform unrealistic durations AND continuous timing
    pub degenerate: bool,
    /// The shared duration, when every chord has the same unrealistic one
    pub uniform_duration: Option<f64>,
    /// Every chord starts where the previous one ended
    pub continuous: bool,
}

impl AnomalyReport {
    const AUTHENTIC: AnomalyReport = AnomalyReport {
        degenerate: false,
        uniform_duration: None,
        continuous: true,
    };
}

/// Classify a progression.
///
/// # Example
/// ```rust
/// use chordsync::{detect_anomaly, ChordEvent, ChordSource, DetectorParams, Progression, SongDuration};
///
/// let events = ["Em", "Am", "Dm", "G"]
///     .iter()
///     .enumerate()
///     .map(|(i, chord)| ChordEvent::new(*chord, i as f64 * 15.0, 15.0, 1.0, ChordSource::Detected))
///     .collect::<Result<Vec<_>, _>>()?;
/// let progression = Progression::new(events, SongDuration::new(60.0)?)?;
///
/// let report = detect_anomaly(&progression, &DetectorParams::default(), 0.05);
/// assert!(report.degenerate);
/// assert_eq!(report.uniform_duration, Some(15.0));
/// # Ok::<(), chordsync::SyncError>(())
/// ```
pub fn detect_anomaly(
    progression: &Progression,
    params: &DetectorParams,
    tolerance: f64,
) -> AnomalyReport {
    if progression.is_empty() {
        return AnomalyReport::AUTHENTIC;
    }

    let uniform_duration = uniform_duration(progression, params);
    let continuous = is_continuous(progression, tolerance);

    AnomalyReport {
        degenerate: uniform_duration.is_some() && continuous,
        uniform_duration,
        continuous,
    }
}

/// The single shared duration, if every event has it and it is unrealistic.
fn uniform_duration(progression: &Progression, params: &DetectorParams) -> Option<f64> {
    let resolution = params.duration_resolution;
    let buckets: BTreeSet<i64> = progression
        .iter()
        .map(|e| (e.duration / resolution).round() as i64)
        .collect();

    match buckets.iter().next() {
        Some(&bucket) if buckets.len() == 1 => {
            let duration = bucket as f64 * resolution;
            (duration > params.unrealistic_duration).then_some(duration)
        }
        _ => None,
    }
}

/// Every event starts at the previous event's end, strictly within tolerance.
fn is_continuous(progression: &Progression, tolerance: f64) -> bool {
    progression
        .events()
        .windows(2)
        .all(|pair| (pair[1].start_time - pair[0].end_time()).abs() < tolerance)
}
