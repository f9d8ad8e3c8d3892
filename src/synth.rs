//! # Progression Synthesis
//!
//! Builds a musically plausible progression from a chord label cycle and a song
//! duration. Fresh generation and repair of degenerate input share one code path;
//! only the provenance tag differs.
//!
//! ## Song Structure
//! Songs are not wall-to-wall chords. The generated layout is:
//!
//! ```text
//! |-- intro silence --|-- section 1 --|brk|-- section 2 --|brk|-- section 3 --|-- outro silence --|
//! 0                  8.0             22.0 24.0           38.0 40.0           54.0             song end
//! ```
//!
//! - **Intro**: leading silence (`intro-silence`, default 8 s)
//! - **Sections**: `section-size` chords each (default 4), at most `max-sections`
//!   (default 3) and at most `labels / section-size`
//! - **Breaks**: `section-break` silence between sections (default 2 s)
//! - **Chords**: `chord-duration` each (default 3.5 s), clamped to
//!   `[min-chord-duration, max-chord-duration]`
//! - **Outro**: whatever is left of the song stays silent
//!
//! ## Edge Cases
//! - Empty label cycle: empty progression
//! - Fewer labels than one section: a single partial section
//! - Song too short for the intro plus one chord: generation starts at 0
//! - Generation stops before any chord would end past the song
//!
//! Synthesis never fails; the worst case is an empty progression.

use tracing::{debug, info, warn};

use crate::config::SynthesisParams;
use crate::model::{ChordEvent, ChordSource, Progression, SongDuration};

/// Generate a fresh progression from bare chord labels.
///
/// Events are tagged `ChordSource::Synthesized` with full confidence.
///
/// # Example
/// ```rust
/// use chordsync::{synthesize, SongDuration, SynthesisParams};
///
/// let labels = ["C", "G", "Am", "F"];
/// let progression = synthesize(&labels, SongDuration::new(180.0)?, &SynthesisParams::default());
///
/// assert_eq!(progression.len(), 4);
/// assert_eq!(progression.events()[0].start_time, 8.0);
/// assert_eq!(progression.events()[3].end_time(), 22.0);
/// # Ok::<(), chordsync::SyncError>(())
/// ```
pub fn synthesize<S: AsRef<str>>(
    labels: &[S],
    song_duration: SongDuration,
    params: &SynthesisParams,
) -> Progression {
    let cycle: Vec<(&str, f64)> = labels.iter().map(|l| (l.as_ref(), 1.0)).collect();
    generate(&cycle, song_duration, params, ChordSource::Synthesized)
}

/// Regenerate a degenerate progression with realistic structure.
///
/// The chord order (and each chord's confidence) is kept; all timing is
/// discarded and re-derived. Events are tagged `ChordSource::Repaired`. The
/// source progression is untouched; a new one is returned.
pub fn repair(progression: &Progression, params: &SynthesisParams) -> Progression {
    let cycle: Vec<(&str, f64)> = progression
        .iter()
        .map(|e| (e.chord.as_str(), e.confidence))
        .collect();
    let repaired = generate(&cycle, progression.song_duration(), params, ChordSource::Repaired);
    info!(
        original = progression.len(),
        repaired = repaired.len(),
        "regenerated progression timing"
    );
    repaired
}

fn generate(
    cycle: &[(&str, f64)],
    song_duration: SongDuration,
    params: &SynthesisParams,
    source: ChordSource,
) -> Progression {
    if cycle.is_empty() {
        return Progression::empty(song_duration);
    }

    let song_end = song_duration.seconds();
    let chord_duration = params.effective_chord_duration();
    if !(chord_duration.is_finite() && chord_duration > 0.0) {
        warn!(chord_duration, "unusable chord duration, generating nothing");
        return Progression::empty(song_duration);
    }

    let section_size = params.section_size.max(1);
    let sections = (cycle.len() / section_size).min(params.max_sections).max(1);
    let intro = params.intro_silence.max(0.0);
    let section_break = params.section_break.max(0.0);

    let mut clock = if intro + chord_duration <= song_end { intro } else { 0.0 };
    let mut events = Vec::with_capacity(cycle.len().min(sections.saturating_mul(section_size)));

    'sections: for (section, chords) in cycle.chunks(section_size).take(sections).enumerate() {
        for &(label, confidence) in chords {
            if clock + chord_duration > song_end {
                debug!(clock, song_end, "song end reached, truncating generation");
                break 'sections;
            }
            events.push(ChordEvent {
                chord: label.to_string(),
                start_time: clock,
                duration: chord_duration,
                confidence,
                source,
            });
            clock += chord_duration;
        }
        if section + 1 < sections {
            clock += section_break;
        }
    }

    Progression::from_checked(events, song_duration)
}
