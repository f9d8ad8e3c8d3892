//! # Coverage Validation
//!
//! Checks a progression's structural invariants before it is handed to playback.
//!
//! ## Checks
//! Each check reports independently; one failing does not hide another.
//!
//! ### Gaps
//! `gap = next.start_time - current.end_time()`. A positive gap is silence and is
//! recorded for accounting, never flagged.
//!
//! ### Overlaps
//! A gap below `-tolerance` is an overlap: two chords sounding at once. Each one
//! is reported with both chord labels and the overlap size.
//!
//! ### Coverage
//! `coverage_delta = song_duration - last_end`. Positive means trailing silence
//! (fine); a last chord ending more than `tolerance` past the song end is an
//! overrun (error).
//!
//! Ordering needs no check here: `Progression` sorts on construction.
//!
//! ## Entry Point
//! `validate_coverage(progression: &Progression, tolerance: f64) -> CoverageReport`
//!
//! The validator is advisory and never mutates. Callers that want a hard
//! failure use `CoverageReport::ensure_valid`.

use serde::Serialize;

use crate::error::SyncError;
use crate::model::Progression;

/// Two consecutive chords that sound at the same time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overlap {
    /// Index of the earlier chord of the pair
    pub index: usize,
    pub first: String,
    pub second: String,
    /// Seconds of overlap (positive)
    pub magnitude: f64,
}

/// Silence between two consecutive chords.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gap {
    /// Index of the chord before the silence
    pub after_index: usize,
    pub start: f64,
    pub duration: f64,
}

/// Outcome of coverage validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    /// No overlaps and no overrun
    pub valid: bool,
    pub overlaps: Vec<Overlap>,
    /// Interior silences longer than the tolerance
    pub gaps: Vec<Gap>,
    /// `song_duration - last_end`; the whole song for an empty progression
    pub coverage_delta: f64,
    /// Seconds the last chord runs past the song end, when beyond tolerance
    pub overrun: Option<f64>,
    /// Seconds of song time covered by at least one chord
    pub covered_seconds: f64,
    /// `covered_seconds / song_duration`
    pub coverage_ratio: f64,
}

impl CoverageReport {
    /// Seconds of silence (leading, interior and trailing) within the song.
    pub fn silence_seconds(&self, progression: &Progression) -> f64 {
        (progression.song_duration().seconds() - self.covered_seconds).max(0.0)
    }

    /// Turn an invalid report into an error, for callers that reject rather than repair.
    pub fn ensure_valid(self) -> Result<Self, SyncError> {
        if self.valid {
            Ok(self)
        } else {
            Err(SyncError::Coverage {
                overlaps: self.overlaps.len(),
                overrun: self.overrun.unwrap_or(0.0),
            })
        }
    }
}

/// Validate a progression.
///
/// # Example
/// ```rust
/// use chordsync::{validate_coverage, ChordEvent, ChordSource, Progression, SongDuration};
///
/// let events = vec![
///     ChordEvent::new("C", 0.0, 4.0, 1.0, ChordSource::Detected)?,
///     ChordEvent::new("G", 3.0, 4.0, 1.0, ChordSource::Detected)?, // 1s overlap
/// ];
/// let progression = Progression::new(events, SongDuration::new(30.0)?)?;
///
/// let report = validate_coverage(&progression, 0.05);
/// assert!(!report.valid);
/// assert_eq!(report.overlaps[0].first, "C");
/// assert_eq!(report.coverage_delta, 23.0);
/// # Ok::<(), chordsync::SyncError>(())
/// ```
pub fn validate_coverage(progression: &Progression, tolerance: f64) -> CoverageReport {
    let song_end = progression.song_duration().seconds();
    let events = progression.events();

    let mut overlaps = Vec::new();
    let mut gaps = Vec::new();
    for (index, pair) in events.windows(2).enumerate() {
        let (current, next) = (&pair[0], &pair[1]);
        let gap = next.start_time - current.end_time();
        if gap < -tolerance {
            overlaps.push(Overlap {
                index,
                first: current.chord.clone(),
                second: next.chord.clone(),
                magnitude: -gap,
            });
        } else if gap > tolerance {
            gaps.push(Gap {
                after_index: index,
                start: current.end_time(),
                duration: gap,
            });
        }
    }

    let last_end = progression.end_time().unwrap_or(0.0);
    let coverage_delta = song_end - last_end;
    let overrun = (coverage_delta < -tolerance).then_some(-coverage_delta);

    let covered_seconds = covered_seconds(progression);

    CoverageReport {
        valid: overlaps.is_empty() && overrun.is_none(),
        overlaps,
        gaps,
        coverage_delta,
        overrun,
        covered_seconds,
        coverage_ratio: covered_seconds / song_end,
    }
}

/// Union length of all events, clipped to the song.
fn covered_seconds(progression: &Progression) -> f64 {
    let song_end = progression.song_duration().seconds();
    let mut covered = 0.0;
    // Events are sorted by start, so the union can be swept in one pass
    let mut reach = 0.0_f64;
    for event in progression {
        let start = event.start_time.max(reach).min(song_end);
        let end = event.end_time().min(song_end);
        if end > start {
            covered += end - start;
        }
        reach = reach.max(event.end_time());
    }
    covered
}
