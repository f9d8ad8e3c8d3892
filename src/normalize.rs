//! # Input Normalization
//!
//! Turns an untrusted analysis payload into a `Progression`.
//!
//! Upstream analysis is not trusted. Instead of failing on a bad chord, this
//! module drops it or re-derives its timing, so the listener still gets a
//! usable progression.
//!
//! ## Rules
//! - Blank labels and no-chord markers (`N`, `N.C.`) are silence: they end
//!   the chord before them and are then dropped
//! - Negative or non-finite start times: dropped
//! - A given duration that is non-positive or non-finite: dropped
//! - Chords whose onsets fall within `group-window` of the first onset of a
//!   group are one detection: the most confident label is kept, at the
//!   group's first onset (ties go to the earlier chord)
//! - A missing duration runs until the next later onset (or the song ends,
//!   for the last chord), capped at `max-chord-duration`; the rest is silence.
//!   If that leaves nothing, dropped
//! - Confidence defaults to 1.0 and is clamped to `0.0..=1.0`; chords below
//!   `min-confidence` are dropped
//! - Unordered input is stable-sorted by start time
//!
//! The only hard error is an invalid song duration, which belongs to the caller.

use tracing::{debug, warn};

use crate::chord::is_no_chord;
use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::model::{
    clamp_confidence, ChordEvent, ChordSource, Progression, RawAnalysis, RawChord, SongDuration,
};

/// A surviving detection and the onset it is placed at.
struct Onset<'a> {
    chord: &'a RawChord,
    start_time: f64,
}

/// Build a progression from a raw analysis payload.
///
/// # Example
/// ```rust
/// use chordsync::{normalize, RawAnalysis, RawChord, SyncConfig};
///
/// let raw = RawAnalysis {
///     song_duration: 20.0,
///     chords: vec![
///         RawChord::new("G", 4.0, 4.0),
///         RawChord::new("C", 0.0, 4.0),
///         RawChord::new("N", 8.0, 2.0),   // no-chord marker
///         RawChord::new("D", 10.0, -1.0), // impossible duration
///     ],
/// };
///
/// let progression = normalize(&raw, &SyncConfig::default())?;
/// assert_eq!(progression.labels().collect::<Vec<_>>(), vec!["C", "G"]);
/// # Ok::<(), chordsync::SyncError>(())
/// ```
///
/// # Errors
/// Returns `SyncError::InvalidSongDuration` if the payload's song duration is
/// not positive.
pub fn normalize(raw: &RawAnalysis, config: &SyncConfig) -> Result<Progression, SyncError> {
    let song_duration = SongDuration::new(raw.song_duration)?;
    let max_derived = config.synthesis.max_chord_duration;
    let mut dropped = 0usize;

    let mut candidates: Vec<&RawChord> = raw
        .chords
        .iter()
        .enumerate()
        .filter(|(index, chord)| {
            let reason = if !chord.start_time.is_finite() || chord.start_time < 0.0 {
                "invalid start time"
            } else if !is_no_chord(&chord.chord) && confidence(chord) < config.min_confidence {
                "below confidence floor"
            } else {
                return true;
            };
            debug!(index, chord = %chord.chord, start = chord.start_time, reason, "dropping chord");
            dropped += 1;
            false
        })
        .map(|(_, chord)| chord)
        .collect();
    candidates.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

    let onsets = group_onsets(&candidates, config.group_window);

    let mut events = Vec::with_capacity(onsets.len());
    for (i, onset) in onsets.iter().enumerate() {
        let chord = onset.chord;
        // No-chord markers only bound the chord before them
        if is_no_chord(&chord.chord) {
            continue;
        }

        let duration = match chord.duration {
            Some(d) if d.is_finite() && d > 0.0 => d,
            Some(d) => {
                debug!(chord = %chord.chord, start = onset.start_time, duration = d, "dropping chord with invalid duration");
                dropped += 1;
                continue;
            }
            None => {
                let next_start = onsets[i + 1..]
                    .iter()
                    .map(|o| o.start_time)
                    .find(|&start| start > onset.start_time)
                    .unwrap_or(song_duration.seconds());
                let derived = (next_start - onset.start_time).min(max_derived);
                if derived <= 0.0 {
                    debug!(chord = %chord.chord, start = onset.start_time, "dropping chord with no room to derive a duration");
                    dropped += 1;
                    continue;
                }
                derived
            }
        };

        events.push(ChordEvent {
            chord: chord.chord.trim().to_string(),
            start_time: onset.start_time,
            duration,
            confidence: confidence(chord),
            source: ChordSource::Detected,
        });
    }

    if dropped > 0 {
        warn!(dropped, kept = events.len(), "discarded malformed chords from analysis payload");
    }

    Ok(Progression::from_checked(events, song_duration))
}

fn confidence(chord: &RawChord) -> f64 {
    clamp_confidence(chord.confidence.unwrap_or(1.0))
}

/// Collapse near-simultaneous detections in start-sorted input.
///
/// No-chord markers never join a group; they close the open one.
fn group_onsets<'a>(sorted: &[&'a RawChord], window: f64) -> Vec<Onset<'a>> {
    let mut onsets: Vec<Onset<'a>> = Vec::with_capacity(sorted.len());
    // First onset of the open group, if the last onset pushed is a chord
    let mut group_start: Option<f64> = None;

    for &chord in sorted {
        if is_no_chord(&chord.chord) {
            onsets.push(Onset {
                chord,
                start_time: chord.start_time,
            });
            group_start = None;
            continue;
        }

        let in_group = group_start.is_some_and(|start| chord.start_time < start + window);
        if let Some(last) = onsets.last_mut().filter(|_| in_group) {
            let (kept, merged) = if confidence(chord) > confidence(last.chord) {
                (chord, last.chord)
            } else {
                (last.chord, chord)
            };
            debug!(kept = %kept.chord, merged = %merged.chord, start = last.start_time, "merging simultaneous detections");
            last.chord = kept;
            continue;
        }

        group_start = Some(chord.start_time);
        onsets.push(Onset {
            chord,
            start_time: chord.start_time,
        });
    }

    onsets
}
