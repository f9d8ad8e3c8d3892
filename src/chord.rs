//! Chord symbol parsing
//!
//! Parses chord labels (C, Am, G7, F#m7/C#, etc.) into a root and quality, and
//! recognizes the "no chord" markers that chord recognizers emit for silence.

/// Chord quality, as far as the engine cares to distinguish it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    Major,
    Minor,
    Dominant7,
    Major7,
    Minor7,
    Diminished,
    Augmented,
    Sus2,
    Sus4,
    Dominant9,
    Major9,
    Minor9,
    /// Anything else (6ths, 11ths, altered chords); the root is still valid
    Other,
}

impl Quality {
    /// Whether the chord has a minor third over its root.
    pub fn is_minor(self) -> bool {
        matches!(self, Quality::Minor | Quality::Minor7 | Quality::Minor9 | Quality::Diminished)
    }
}

/// A parsed chord label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordSymbol {
    /// Root as spelled in the label ("Bb", "F#", "E")
    pub root: String,
    /// Root pitch class, C = 0 through B = 11
    pub pitch_class: u8,
    pub quality: Quality,
}

impl ChordSymbol {
    /// Parse a chord label.
    ///
    /// Returns `None` when the label does not start with a note name A-G.
    /// A slash-chord bass note (`D/F#`) is ignored.
    ///
    /// # Supported Qualities
    /// - **Major**: `C`, `maj`, `M`
    /// - **Minor**: `m`, `min`, `-`
    /// - **Dominant 7th**: `7`
    /// - **Major 7th**: `maj7`, `M7`
    /// - **Minor 7th**: `m7`, `min7`, `-7`
    /// - **Diminished**: `dim`, `°`
    /// - **Augmented**: `aug`, `+`
    /// - **Sus**: `sus2`, `sus4`
    /// - **9th chords**: `9`, `maj9`, `m9`
    ///
    /// # Examples
    /// ```
    /// use chordsync::chord::{ChordSymbol, Quality};
    ///
    /// let chord = ChordSymbol::parse("Bbm7").unwrap();
    /// assert_eq!(chord.root, "Bb");
    /// assert_eq!(chord.pitch_class, 10);
    /// assert_eq!(chord.quality, Quality::Minor7);
    ///
    /// let slash = ChordSymbol::parse("Em7/D").unwrap();
    /// assert_eq!(slash.root, "E");
    /// assert!(slash.quality.is_minor());
    ///
    /// assert!(ChordSymbol::parse("N").is_none());
    /// ```
    pub fn parse(label: &str) -> Option<ChordSymbol> {
        let label = label.trim();
        let head = label.split_once('/').map_or(label, |(head, _)| head);

        let mut chars = head.chars();
        let root_name = chars.next()?;
        let base: i8 = match root_name {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return None,
        };

        // Check for accidental
        let mut idx = root_name.len_utf8();
        let accidental: i8 = match head[idx..].chars().next() {
            Some('#') | Some('♯') => 1,
            Some('b') | Some('♭') => -1,
            _ => 0,
        };
        if accidental != 0 {
            idx += head[idx..].chars().next().map_or(0, char::len_utf8);
        }

        let pitch_class = (base + accidental).rem_euclid(12) as u8;
        let quality = match &head[idx..] {
            "" | "maj" | "M" => Quality::Major,
            "m" | "min" | "-" => Quality::Minor,
            "7" => Quality::Dominant7,
            "maj7" | "M7" => Quality::Major7,
            "m7" | "min7" | "-7" => Quality::Minor7,
            "dim" | "°" => Quality::Diminished,
            "aug" | "+" => Quality::Augmented,
            "sus4" | "sus" => Quality::Sus4,
            "sus2" => Quality::Sus2,
            "9" => Quality::Dominant9,
            "maj9" | "M9" => Quality::Major9,
            "m9" | "min9" => Quality::Minor9,
            _ => Quality::Other,
        };

        Some(ChordSymbol {
            root: head[..idx].to_string(),
            pitch_class,
            quality,
        })
    }
}

/// Whether a label is a recognizer's "no chord" marker (or blank).
///
/// ```
/// use chordsync::chord::is_no_chord;
///
/// assert!(is_no_chord("N"));
/// assert!(is_no_chord("N.C."));
/// assert!(is_no_chord("  "));
/// assert!(!is_no_chord("Am"));
/// ```
pub fn is_no_chord(label: &str) -> bool {
    let label = label.trim();
    label.is_empty()
        || ["N", "NC", "N.C.", "N.C", "X"]
            .iter()
            .any(|marker| label.eq_ignore_ascii_case(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chord_parsing() {
        let c_major = ChordSymbol::parse("C").unwrap();
        assert_eq!(c_major.pitch_class, 0);
        assert_eq!(c_major.quality, Quality::Major);

        let d_minor = ChordSymbol::parse("Dm").unwrap();
        assert_eq!(d_minor.pitch_class, 2);
        assert_eq!(d_minor.quality, Quality::Minor);

        let g7 = ChordSymbol::parse("G7").unwrap();
        assert_eq!(g7.quality, Quality::Dominant7);

        let cmaj7 = ChordSymbol::parse("Cmaj7").unwrap();
        assert_eq!(cmaj7.quality, Quality::Major7);

        // Accidentals wrap around the octave
        let f_sharp = ChordSymbol::parse("F#").unwrap();
        assert_eq!(f_sharp.root, "F#");
        assert_eq!(f_sharp.pitch_class, 6);

        let c_flat = ChordSymbol::parse("Cb").unwrap();
        assert_eq!(c_flat.pitch_class, 11);

        let b_sharp = ChordSymbol::parse("B#m").unwrap();
        assert_eq!(b_sharp.pitch_class, 0);
        assert_eq!(b_sharp.quality, Quality::Minor);
    }

    #[test]
    fn test_minor_qualities() {
        assert!(ChordSymbol::parse("Am").unwrap().quality.is_minor());
        assert!(ChordSymbol::parse("F#m7").unwrap().quality.is_minor());
        assert!(ChordSymbol::parse("Bdim").unwrap().quality.is_minor());
        assert!(!ChordSymbol::parse("A7").unwrap().quality.is_minor());
        assert!(!ChordSymbol::parse("Csus4").unwrap().quality.is_minor());
    }

    #[test]
    fn test_unknown_quality_keeps_root() {
        let chord = ChordSymbol::parse("E7#9").unwrap();
        assert_eq!(chord.root, "E");
        assert_eq!(chord.quality, Quality::Other);
    }

    #[test]
    fn test_unparseable_labels() {
        assert!(ChordSymbol::parse("").is_none());
        assert!(ChordSymbol::parse("H7").is_none());
        assert!(ChordSymbol::parse("am").is_none());
    }

    #[test]
    fn test_no_chord_markers() {
        assert!(is_no_chord("nc"));
        assert!(is_no_chord("x"));
        assert!(!is_no_chord("Em"));
    }
}
