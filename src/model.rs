//! # Progression Model
//!
//! Data types shared by every stage of the engine.
//!
//! ## Type Hierarchy
//! ```text
//! Progression (immutable once built)
//!   ├── song_duration: SongDuration
//!   └── Vec<ChordEvent> (ascending start_time)
//!         ├── chord: String ("Em", "F#m7", ...)
//!         ├── start_time / duration: seconds
//!         ├── confidence: 0.0 ..= 1.0
//!         └── source: ChordSource (detected | synthesized | repaired)
//!
//! RawAnalysis (untrusted inbound payload)
//!   ├── song_duration: f64
//!   └── Vec<RawChord> (start, optional duration/confidence)
//! ```
//!
//! ## Key Concepts
//!
//! ### Ordering
//! `Progression::new` stable-sorts events by start time. Insertion order equals
//! temporal order from then on, and the resolver's search depends on it.
//!
//! ### Silence
//! Time not covered by any event is silence. Gaps between events and the tail
//! after the last event are expected, not errors.
//!
//! ### Immutability
//! There is no API that edits a progression in place. Repair and re-analysis
//! build a new `Progression`, so a playback session holding a reference keeps
//! seeing consistent data.
//!
//! ## Related Modules
//! - `normalize` - Builds a `Progression` from a `RawAnalysis`
//! - `synth` - Builds a `Progression` from a chord label cycle
//! - `resolve` - Queries a `Progression` by playback time

use serde::{Deserialize, Serialize};

use crate::error::SyncError;

/// Where a chord event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChordSource {
    /// Reported by upstream analysis
    #[default]
    Detected,
    /// Generated from a bare label sequence
    Synthesized,
    /// Regenerated because the upstream timing was degenerate
    Repaired,
}

fn default_confidence() -> f64 {
    1.0
}

/// One labeled chord with a start time and duration, in seconds.
///
/// Events are half-open intervals: an event covers `start_time` but not
/// `start_time + duration`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChordEvent {
    pub chord: String,
    pub start_time: f64,
    pub duration: f64,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default)]
    pub source: ChordSource,
}

impl ChordEvent {
    /// Create an event, rejecting impossible timing.
    ///
    /// Confidence is clamped to `0.0..=1.0`; a non-finite confidence becomes `1.0`.
    ///
    /// # Example
    /// ```
    /// use chordsync::{ChordEvent, ChordSource};
    ///
    /// let event = ChordEvent::new("Am", 8.0, 4.0, 1.3, ChordSource::Detected).unwrap();
    /// assert_eq!(event.end_time(), 12.0);
    /// assert_eq!(event.confidence, 1.0);
    ///
    /// assert!(ChordEvent::new("Am", 8.0, 0.0, 1.0, ChordSource::Detected).is_err());
    /// ```
    pub fn new(
        chord: impl Into<String>,
        start_time: f64,
        duration: f64,
        confidence: f64,
        source: ChordSource,
    ) -> Result<Self, SyncError> {
        let event = ChordEvent {
            chord: chord.into(),
            start_time,
            duration,
            confidence: clamp_confidence(confidence),
            source,
        };
        event.check()?;
        Ok(event)
    }

    /// End of the event (exclusive).
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// Whether `time` falls in `[start_time, end_time)`.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start_time && time < self.end_time()
    }

    fn check(&self) -> Result<(), SyncError> {
        let invalid = |message: String| SyncError::InvalidEvent {
            chord: self.chord.clone(),
            message,
        };
        if !self.start_time.is_finite() || self.start_time < 0.0 {
            return Err(invalid(format!(
                "start time must be a non-negative number, got {}",
                self.start_time
            )));
        }
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(invalid(format!(
                "duration must be positive, got {}",
                self.duration
            )));
        }
        Ok(())
    }
}

pub(crate) fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_finite() {
        confidence.clamp(0.0, 1.0)
    } else {
        1.0
    }
}

/// Length of the song in seconds. Always positive and finite.
///
/// Owned by the caller (usually from media metadata); the engine never changes it.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct SongDuration(f64);

impl SongDuration {
    pub fn new(seconds: f64) -> Result<Self, SyncError> {
        if seconds.is_finite() && seconds > 0.0 {
            Ok(SongDuration(seconds))
        } else {
            Err(SyncError::InvalidSongDuration(seconds))
        }
    }

    pub fn seconds(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for SongDuration {
    type Error = SyncError;

    fn try_from(seconds: f64) -> Result<Self, Self::Error> {
        SongDuration::new(seconds)
    }
}

/// Calibration correction added to a query time before resolution.
///
/// Positive offsets look further ahead in the progression than the player
/// position; negative offsets look behind.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimingOffset(f64);

impl TimingOffset {
    pub const ZERO: TimingOffset = TimingOffset(0.0);
    /// Increment used by manual nudge controls
    pub const STEP: f64 = 0.5;
    /// Nudge controls never move the offset past +/- this many seconds
    pub const LIMIT: f64 = 10.0;

    pub fn new(seconds: f64) -> Self {
        TimingOffset(seconds)
    }

    pub fn seconds(self) -> f64 {
        self.0
    }

    /// Move the offset by `steps` nudge increments, clamped to `[-LIMIT, LIMIT]`.
    ///
    /// # Example
    /// ```
    /// use chordsync::TimingOffset;
    ///
    /// let offset = TimingOffset::ZERO.nudged(3);
    /// assert_eq!(offset.seconds(), 1.5);
    /// assert_eq!(offset.nudged(-100).seconds(), -10.0);
    /// ```
    pub fn nudged(self, steps: i32) -> Self {
        let moved = self.0 + f64::from(steps) * Self::STEP;
        TimingOffset(moved.clamp(-Self::LIMIT, Self::LIMIT))
    }

    /// The progression time corresponding to a player position.
    pub fn apply(self, time: f64) -> f64 {
        time + self.0
    }
}

impl From<f64> for TimingOffset {
    fn from(seconds: f64) -> Self {
        TimingOffset(seconds)
    }
}

/// A temporally ordered chord sequence for one song.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progression {
    song_duration: SongDuration,
    events: Vec<ChordEvent>,
    #[serde(skip)]
    max_duration: f64,
}

impl Progression {
    /// Build a progression, ordering events by start time.
    ///
    /// Every event is checked; the first impossible one is reported as
    /// `SyncError::InvalidEvent`. Use `normalize::normalize` for untrusted input
    /// that should degrade instead of failing.
    pub fn new(events: Vec<ChordEvent>, song_duration: SongDuration) -> Result<Self, SyncError> {
        for event in &events {
            event.check()?;
        }
        Ok(Self::from_checked(events, song_duration))
    }

    /// A progression with no chords (e.g. an instrumental track).
    pub fn empty(song_duration: SongDuration) -> Self {
        Progression {
            song_duration,
            events: Vec::new(),
            max_duration: 0.0,
        }
    }

    /// Build from events whose timing has already been checked.
    pub(crate) fn from_checked(mut events: Vec<ChordEvent>, song_duration: SongDuration) -> Self {
        // sort_by is stable, equal starts keep insertion order
        events.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        let max_duration = events.iter().map(|e| e.duration).fold(0.0, f64::max);
        Progression {
            song_duration,
            events,
            max_duration,
        }
    }

    pub fn events(&self) -> &[ChordEvent] {
        &self.events
    }

    pub fn get(&self, index: usize) -> Option<&ChordEvent> {
        self.events.get(index)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn song_duration(&self) -> SongDuration {
        self.song_duration
    }

    /// Longest single event, 0.0 when empty
    pub fn max_duration(&self) -> f64 {
        self.max_duration
    }

    /// End of the last event, if any.
    pub fn end_time(&self) -> Option<f64> {
        self.events.last().map(ChordEvent::end_time)
    }

    /// Chord labels in temporal order.
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.events.iter().map(|e| e.chord.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChordEvent> {
        self.events.iter()
    }
}

impl<'a> IntoIterator for &'a Progression {
    type Item = &'a ChordEvent;
    type IntoIter = std::slice::Iter<'a, ChordEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

/// One chord as reported by upstream analysis. Nothing here is trusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChord {
    pub chord: String,
    #[serde(alias = "time")]
    pub start_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl RawChord {
    pub fn new(chord: impl Into<String>, start_time: f64, duration: f64) -> Self {
        RawChord {
            chord: chord.into(),
            start_time,
            duration: Some(duration),
            confidence: None,
        }
    }
}

/// The inbound analysis payload: chords plus the song duration.
///
/// # Example
/// ```
/// use chordsync::RawAnalysis;
///
/// let raw: RawAnalysis = serde_json::from_str(
///     r#"{"songDuration": 60, "chords": [{"chord": "Am", "time": 8, "duration": 4}]}"#,
/// ).unwrap();
/// assert_eq!(raw.chords[0].start_time, 8.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAnalysis {
    pub song_duration: f64,
    #[serde(default)]
    pub chords: Vec<RawChord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(seconds: f64) -> SongDuration {
        SongDuration::new(seconds).unwrap()
    }

    fn event(chord: &str, start: f64, duration: f64) -> ChordEvent {
        ChordEvent::new(chord, start, duration, 1.0, ChordSource::Detected).unwrap()
    }

    #[test]
    fn test_event_rejects_bad_timing() {
        assert!(ChordEvent::new("C", -1.0, 2.0, 1.0, ChordSource::Detected).is_err());
        assert!(ChordEvent::new("C", 0.0, -2.0, 1.0, ChordSource::Detected).is_err());
        assert!(ChordEvent::new("C", f64::NAN, 2.0, 1.0, ChordSource::Detected).is_err());
        assert!(ChordEvent::new("C", 0.0, f64::INFINITY, 1.0, ChordSource::Detected).is_err());
    }

    #[test]
    fn test_event_half_open_interval() {
        let c = event("C", 0.0, 3.5);
        assert!(c.contains(0.0));
        assert!(c.contains(3.49));
        assert!(!c.contains(3.5));
    }

    #[test]
    fn test_song_duration_must_be_positive() {
        assert!(SongDuration::new(0.0).is_err());
        assert!(SongDuration::new(-3.0).is_err());
        assert!(SongDuration::new(f64::NAN).is_err());
        assert_eq!(SongDuration::new(120.0).unwrap().seconds(), 120.0);
    }

    #[test]
    fn test_progression_sorts_stably() {
        let p = Progression::new(
            vec![event("G", 4.0, 2.0), event("C", 0.0, 2.0), event("F", 0.0, 2.0)],
            song(10.0),
        )
        .unwrap();
        let labels: Vec<&str> = p.labels().collect();
        assert_eq!(labels, vec!["C", "F", "G"]);
        assert_eq!(p.end_time(), Some(6.0));
        assert_eq!(p.max_duration(), 2.0);
    }

    #[test]
    fn test_progression_rejects_invalid_event() {
        let mut bad = event("C", 0.0, 2.0);
        bad.duration = 0.0;
        let result = Progression::new(vec![bad], song(10.0));
        assert!(matches!(result, Err(SyncError::InvalidEvent { .. })));
    }

    #[test]
    fn test_timing_offset_nudge_clamps() {
        assert_eq!(TimingOffset::ZERO.nudged(-1).seconds(), -0.5);
        assert_eq!(TimingOffset::new(9.8).nudged(1).seconds(), 10.0);
        assert_eq!(TimingOffset::new(2.0).apply(3.0), 5.0);
    }

    #[test]
    fn test_raw_chord_accepts_time_alias() {
        let raw: RawChord = serde_json::from_str(r#"{"chord": "G", "time": 2.5}"#).unwrap();
        assert_eq!(raw.start_time, 2.5);
        assert_eq!(raw.duration, None);
        assert_eq!(raw.confidence, None);
    }

    #[test]
    fn test_progression_serializes_camel_case() {
        let p = Progression::new(vec![event("Am", 8.0, 4.0)], song(60.0)).unwrap();
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["songDuration"], 60.0);
        assert_eq!(json["events"][0]["startTime"], 8.0);
        assert_eq!(json["events"][0]["source"], "detected");
        assert!(json.get("maxDuration").is_none());
    }
}
