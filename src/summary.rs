//! Descriptive statistics for a progression.
//!
//! Cheap heuristics for display ("probably in Em, ~120 BPM"), not analysis:
//! the key is the most frequent chord root, minor when most chords on that
//! root are minor, and the tempo assumes one chord per 4/4 bar.

use serde::Serialize;

use crate::chord::ChordSymbol;
use crate::model::Progression;

const DEFAULT_BPM: u16 = 120;
const MIN_BPM: f64 = 60.0;
const MAX_BPM: f64 = 200.0;
const BEATS_PER_BAR: f64 = 4.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionSummary {
    pub event_count: usize,
    pub distinct_chords: usize,
    /// Most frequent chord root, spelled as in the first chord that used it,
    /// with an `m` suffix when most of its chords are minor
    pub likely_key: Option<String>,
    pub estimated_bpm: u16,
    /// Sum of chord durations
    pub chord_seconds: f64,
}

/// Summarize a progression.
///
/// ```rust
/// use chordsync::{summarize, synthesize, SongDuration, SynthesisParams};
///
/// let progression = synthesize(&["E", "D", "E", "A"], SongDuration::new(120.0)?, &SynthesisParams::default());
/// let summary = summarize(&progression);
///
/// assert_eq!(summary.likely_key.as_deref(), Some("E"));
/// assert_eq!(summary.distinct_chords, 3);
/// # Ok::<(), chordsync::SyncError>(())
/// ```
pub fn summarize(progression: &Progression) -> ProgressionSummary {
    let mut distinct: Vec<&str> = Vec::new();
    let mut roots: Vec<RootCount> = Vec::new();

    for label in progression.labels() {
        if !distinct.contains(&label) {
            distinct.push(label);
        }
        if let Some(symbol) = ChordSymbol::parse(label) {
            let minor = usize::from(symbol.quality.is_minor());
            match roots.iter().position(|r| r.pitch_class == symbol.pitch_class) {
                Some(i) => {
                    roots[i].count += 1;
                    roots[i].minor += minor;
                }
                None => roots.push(RootCount {
                    pitch_class: symbol.pitch_class,
                    spelling: symbol.root,
                    count: 1,
                    minor,
                }),
            }
        }
    }

    // max_by_key keeps the last maximum; reverse so ties go to the earliest root
    let likely_key = roots
        .into_iter()
        .rev()
        .max_by_key(|r| r.count)
        .map(|r| {
            if r.minor * 2 > r.count {
                format!("{}m", r.spelling)
            } else {
                r.spelling
            }
        });

    let chord_seconds: f64 = progression.iter().map(|e| e.duration).sum();

    ProgressionSummary {
        event_count: progression.len(),
        distinct_chords: distinct.len(),
        likely_key,
        estimated_bpm: estimate_bpm(progression.len(), chord_seconds),
        chord_seconds,
    }
}

/// Chords sharing a root, in order of first appearance
struct RootCount {
    pitch_class: u8,
    spelling: String,
    count: usize,
    minor: usize,
}

fn estimate_bpm(event_count: usize, chord_seconds: f64) -> u16 {
    if event_count < 2 || chord_seconds <= 0.0 {
        return DEFAULT_BPM;
    }
    let mean = chord_seconds / event_count as f64;
    let bpm = (BEATS_PER_BAR * 60.0 / mean).clamp(MIN_BPM, MAX_BPM);
    bpm.round() as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChordEvent, ChordSource, SongDuration};
    use pretty_assertions::assert_eq;

    fn progression(events: &[(&str, f64, f64)]) -> Progression {
        let events = events
            .iter()
            .map(|(chord, start, duration)| {
                ChordEvent::new(*chord, *start, *duration, 1.0, ChordSource::Detected).unwrap()
            })
            .collect();
        Progression::new(events, SongDuration::new(120.0).unwrap()).unwrap()
    }

    #[test]
    fn test_summary() {
        let p = progression(&[("Am", 0.0, 2.0), ("F", 2.0, 2.0), ("C", 4.0, 2.0), ("A7", 6.0, 2.0)]);
        assert_eq!(
            summarize(&p),
            ProgressionSummary {
                event_count: 4,
                distinct_chords: 4,
                likely_key: Some("A".to_string()),
                estimated_bpm: 120,
                chord_seconds: 8.0,
            }
        );
    }

    #[test]
    fn test_key_tie_goes_to_earliest_root() {
        let p = progression(&[("G", 0.0, 2.0), ("C", 2.0, 2.0), ("C", 4.0, 2.0), ("G", 6.0, 2.0)]);
        assert_eq!(summarize(&p).likely_key.as_deref(), Some("G"));
    }

    #[test]
    fn test_minor_key() {
        let p = progression(&[("Em", 0.0, 2.0), ("C", 2.0, 2.0), ("Em7", 4.0, 2.0), ("D", 6.0, 2.0)]);
        assert_eq!(summarize(&p).likely_key.as_deref(), Some("Em"));
    }

    #[test]
    fn test_enharmonic_roots_share_a_count() {
        let p = progression(&[("Db", 0.0, 2.0), ("C#m", 2.0, 2.0), ("E", 4.0, 2.0)]);
        assert_eq!(summarize(&p).likely_key.as_deref(), Some("Db"));
    }

    #[test]
    fn test_bpm_clamped() {
        // 15s chords would be 16 BPM
        let p = progression(&[("C", 0.0, 15.0), ("G", 15.0, 15.0)]);
        assert_eq!(summarize(&p).estimated_bpm, 60);
        // 0.5s chords would be 480 BPM
        let p = progression(&[("C", 0.0, 0.5), ("G", 0.5, 0.5)]);
        assert_eq!(summarize(&p).estimated_bpm, 200);
    }

    #[test]
    fn test_empty_and_unparseable() {
        let p = Progression::empty(SongDuration::new(60.0).unwrap());
        let summary = summarize(&p);
        assert_eq!(summary.likely_key, None);
        assert_eq!(summary.estimated_bpm, DEFAULT_BPM);

        let p = progression(&[("???", 0.0, 2.0)]);
        assert_eq!(summarize(&p).likely_key, None);
    }
}
