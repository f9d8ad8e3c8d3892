//! # Active-Chord Resolution
//!
//! The one function that answers "which chord, if any, is sounding at time T".
//!
//! ## Purpose
//! Both the "start playback" action and every periodic time-update tick call
//! [`resolve`]. Keeping a single implementation is what prevents the two paths
//! from disagreeing about the current chord.
//!
//! ## Semantics
//! - The query time is shifted by the caller's `TimingOffset` first
//! - Events are half-open: `[start_time, start_time + duration)`. At the exact
//!   end of a chord the next chord (or silence) is returned, never the chord
//!   being exited
//! - No match is silence (`None`). The resolver does not guess a nearest chord;
//!   whether to keep showing the previous one is a display decision (see
//!   `display`)
//!
//! ## Search
//! Events are ordered by start and no event is longer than
//! `Progression::max_duration`, so only events starting in
//! `(t - max_duration, t]` can contain `t`. Two binary searches bound that
//! window and a forward scan picks the first match, giving the same answer as
//! a full linear scan.
//!
//! Stateless and idempotent: same arguments, same answer.

use serde::Serialize;

use crate::model::{ChordEvent, Progression, TimingOffset};

/// A chord found by a query, with its position in the progression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveChord<'a> {
    pub index: usize,
    pub event: &'a ChordEvent,
}

/// Find the chord sounding at `time + offset`.
///
/// Returns `None` during silence, outside the progression's span, for an empty
/// progression, or for a non-finite time.
///
/// # Example
/// ```rust
/// use chordsync::{resolve, ChordEvent, ChordSource, Progression, SongDuration, TimingOffset};
///
/// let events = vec![
///     ChordEvent::new("C", 0.0, 3.5, 1.0, ChordSource::Detected)?,
///     ChordEvent::new("G", 3.5, 4.0, 1.0, ChordSource::Detected)?,
/// ];
/// let progression = Progression::new(events, SongDuration::new(60.0)?)?;
///
/// let active = resolve(&progression, 3.5, TimingOffset::ZERO).unwrap();
/// assert_eq!(active.index, 1);
/// assert_eq!(active.event.chord, "G");
///
/// // Player clock runs half a second behind the progression
/// let active = resolve(&progression, 3.0, TimingOffset::new(0.5)).unwrap();
/// assert_eq!(active.event.chord, "G");
///
/// assert!(resolve(&progression, 7.5, TimingOffset::ZERO).is_none());
/// # Ok::<(), chordsync::SyncError>(())
/// ```
pub fn resolve(progression: &Progression, time: f64, offset: TimingOffset) -> Option<ActiveChord<'_>> {
    let t = offset.apply(time);
    if !t.is_finite() {
        return None;
    }

    let events = progression.events();
    // Events starting after t cannot contain it
    let upper = events.partition_point(|e| e.start_time <= t);
    // Events starting at or before t - max_duration end at or before t
    let reach = progression.max_duration();
    let lower = events[..upper].partition_point(|e| e.start_time + reach <= t);

    events[lower..upper]
        .iter()
        .position(|e| e.contains(t))
        .map(|i| ActiveChord {
            index: lower + i,
            event: &events[lower + i],
        })
}

/// Find the first chord starting strictly after `time + offset`.
///
/// Used for "next chord" previews; works during silence too.
///
/// ```rust
/// use chordsync::{upcoming, ChordEvent, ChordSource, Progression, SongDuration, TimingOffset};
///
/// let events = vec![ChordEvent::new("Am", 8.0, 4.0, 1.0, ChordSource::Detected)?];
/// let progression = Progression::new(events, SongDuration::new(60.0)?)?;
///
/// assert_eq!(upcoming(&progression, 5.0, TimingOffset::ZERO).unwrap().event.chord, "Am");
/// assert!(upcoming(&progression, 8.0, TimingOffset::ZERO).is_none());
/// # Ok::<(), chordsync::SyncError>(())
/// ```
pub fn upcoming(progression: &Progression, time: f64, offset: TimingOffset) -> Option<ActiveChord<'_>> {
    let t = offset.apply(time);
    if t.is_nan() {
        return None;
    }
    let events = progression.events();
    let index = events.partition_point(|e| e.start_time <= t);
    events.get(index).map(|event| ActiveChord { index, event })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChordSource, SongDuration};

    fn progression(events: &[(&str, f64, f64)], song_duration: f64) -> Progression {
        let events = events
            .iter()
            .map(|(chord, start, duration)| {
                ChordEvent::new(*chord, *start, *duration, 1.0, ChordSource::Detected).unwrap()
            })
            .collect();
        Progression::new(events, SongDuration::new(song_duration).unwrap()).unwrap()
    }

    fn index_at(p: &Progression, time: f64) -> Option<usize> {
        resolve(p, time, TimingOffset::ZERO).map(|a| a.index)
    }

    /// Reference implementation: first event containing t, by linear scan.
    fn linear(p: &Progression, t: f64) -> Option<usize> {
        p.iter().position(|e| e.contains(t))
    }

    #[test]
    fn test_boundary_returns_next_chord() {
        let p = progression(&[("C", 0.0, 3.5), ("G", 3.5, 4.0)], 60.0);
        assert_eq!(index_at(&p, 0.0), Some(0));
        assert_eq!(index_at(&p, 3.4999), Some(0));
        assert_eq!(index_at(&p, 3.5), Some(1));
        assert_eq!(index_at(&p, 7.5), None);
    }

    #[test]
    fn test_silence_before_and_after() {
        let p = progression(&[("Am", 8.0, 4.0)], 60.0);
        assert_eq!(index_at(&p, 5.0), None);
        assert_eq!(index_at(&p, 8.0), Some(0));
        assert_eq!(index_at(&p, 11.99), Some(0));
        assert_eq!(index_at(&p, 12.0), None);
        assert_eq!(index_at(&p, 50.0), None);
    }

    #[test]
    fn test_interior_gap_is_silence() {
        let p = progression(&[("C", 8.0, 4.0), ("G", 14.0, 4.0)], 60.0);
        assert_eq!(index_at(&p, 13.0), None);
        assert_eq!(index_at(&p, 14.0), Some(1));
    }

    #[test]
    fn test_empty_progression() {
        let p = Progression::empty(SongDuration::new(60.0).unwrap());
        for t in [-1.0, 0.0, 30.0, 1e9] {
            assert!(resolve(&p, t, TimingOffset::ZERO).is_none());
        }
    }

    #[test]
    fn test_negative_and_non_finite_times() {
        let p = progression(&[("C", 0.0, 4.0)], 60.0);
        assert_eq!(index_at(&p, -0.1), None);
        assert_eq!(index_at(&p, f64::NAN), None);
        assert_eq!(index_at(&p, f64::INFINITY), None);
    }

    #[test]
    fn test_offset_shifts_query() {
        let p = progression(&[("C", 0.0, 4.0), ("G", 4.0, 4.0)], 60.0);
        assert_eq!(resolve(&p, 4.5, TimingOffset::new(-1.0)).unwrap().index, 0);
        assert_eq!(resolve(&p, 3.0, TimingOffset::new(1.0)).unwrap().index, 1);
    }

    #[test]
    fn test_idempotent() {
        let p = progression(&[("C", 0.0, 4.0), ("G", 4.0, 4.0)], 60.0);
        let offset = TimingOffset::new(0.25);
        assert_eq!(resolve(&p, 3.8, offset), resolve(&p, 3.8, offset));
    }

    #[test]
    fn test_overlap_returns_first_match() {
        // A long chord overlapping a later short one: the earlier event wins,
        // exactly as a linear scan would decide
        let p = progression(&[("C", 0.0, 10.0), ("G", 2.0, 1.0), ("F", 10.0, 2.0)], 60.0);
        assert_eq!(index_at(&p, 2.5), Some(0));
        assert_eq!(index_at(&p, 10.0), Some(2));
    }

    #[test]
    fn test_matches_linear_scan() {
        let p = progression(
            &[
                ("Em", 8.0, 4.0),
                ("Am", 12.0, 4.0),
                ("Dm", 16.0, 3.0),
                ("G", 19.0, 5.0),
                ("C", 26.0, 2.0),
                ("F", 28.0, 4.0),
                ("G", 31.98, 6.0),
            ],
            60.0,
        );
        let mut t = -1.0;
        while t < 45.0 {
            assert_eq!(index_at(&p, t), linear(&p, t), "mismatch at t={}", t);
            t += 0.125;
        }
    }

    #[test]
    fn test_upcoming() {
        let p = progression(&[("C", 0.0, 3.5), ("G", 3.5, 4.0)], 60.0);
        assert_eq!(upcoming(&p, 0.0, TimingOffset::ZERO).unwrap().index, 1);
        assert_eq!(upcoming(&p, -2.0, TimingOffset::ZERO).unwrap().index, 0);
        assert!(upcoming(&p, 3.5, TimingOffset::ZERO).is_none());
    }
}
