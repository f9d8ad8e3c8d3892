//! # Configuration
//!
//! Tunable parameters for detection, synthesis and validation.
//!
//! The repair heuristics (intro length, section size, break length, section cap)
//! are rules of thumb rather than domain truth, so every one of them is a field
//! here with a default. Configuration is YAML with kebab-case keys; any key may
//! be omitted.
//!
//! ## Example
//! ```rust
//! use chordsync::SyncConfig;
//!
//! let config = SyncConfig::from_yaml_str(r#"
//! tolerance: 0.05
//! synthesis:
//!   intro-silence: 4
//!   section-break: 1.5
//! "#).unwrap();
//!
//! assert_eq!(config.synthesis.intro_silence, 4.0);
//! assert_eq!(config.synthesis.section_size, 4); // default
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SyncError;

/// Upper bound for `section-size` and `max-sections`
pub const MAX_STRUCTURE_COUNT: usize = 64;

/// Engine-wide configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct SyncConfig {
    /// Floating-point slack (seconds) for gap, overlap and coverage checks
    pub tolerance: f64,
    /// Detected chords below this confidence are dropped during normalization
    pub min_confidence: f64,
    /// Onsets within this many seconds of a group's first onset are one detection
    pub group_window: f64,
    /// Also regenerate progressions that fail coverage validation
    pub repair_invalid: bool,
    pub detector: DetectorParams,
    pub synthesis: SynthesisParams,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            tolerance: 0.05,
            min_confidence: 0.0,
            group_window: 0.5,
            repair_invalid: false,
            detector: DetectorParams::default(),
            synthesis: SynthesisParams::default(),
        }
    }
}

/// Anomaly detector thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct DetectorParams {
    /// A uniform chord duration above this is treated as placeholder data
    pub unrealistic_duration: f64,
    /// Durations are compared after rounding to this resolution
    pub duration_resolution: f64,
}

impl Default for DetectorParams {
    fn default() -> Self {
        DetectorParams {
            unrealistic_duration: 8.0,
            duration_resolution: 0.01,
        }
    }
}

/// Song-structure parameters used when generating or repairing a progression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct SynthesisParams {
    /// Leading silence before the first chord
    pub intro_silence: f64,
    /// Chords per section
    pub section_size: usize,
    /// Silence between sections
    pub section_break: f64,
    /// Target duration of each generated chord
    pub chord_duration: f64,
    /// Upper bound on generated sections
    pub max_sections: usize,
    pub min_chord_duration: f64,
    pub max_chord_duration: f64,
}

impl Default for SynthesisParams {
    fn default() -> Self {
        SynthesisParams {
            intro_silence: 8.0,
            section_size: 4,
            section_break: 2.0,
            chord_duration: 3.5,
            max_sections: 3,
            min_chord_duration: 2.0,
            max_chord_duration: 6.0,
        }
    }
}

impl SynthesisParams {
    /// Target chord duration clamped to the allowed range.
    pub fn effective_chord_duration(&self) -> f64 {
        // max/min instead of clamp, unvalidated params must not panic
        self.chord_duration
            .max(self.min_chord_duration)
            .min(self.max_chord_duration)
    }
}

impl SyncConfig {
    /// Parse and validate a YAML configuration.
    pub fn from_yaml_str(content: &str) -> Result<Self, SyncError> {
        let config: SyncConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SyncError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Check that every value is usable.
    ///
    /// Rules:
    /// 1. Tolerances, resolutions and durations are finite
    /// 2. `tolerance`, `duration-resolution`, `unrealistic-duration` and
    ///    `min-chord-duration` are positive; silences and `group-window` are
    ///    non-negative
    /// 3. `min-confidence` lies in `0.0..=1.0`
    /// 4. `section-size` and `max-sections` are between 1 and `MAX_STRUCTURE_COUNT`
    /// 5. `min-chord-duration <= max-chord-duration`
    pub fn validate(&self) -> Result<(), SyncError> {
        positive("tolerance", self.tolerance)?;
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(invalid(
                "min-confidence",
                format!("must be between 0 and 1, got {}", self.min_confidence),
            ));
        }
        non_negative("group-window", self.group_window)?;

        positive("detector.unrealistic-duration", self.detector.unrealistic_duration)?;
        positive("detector.duration-resolution", self.detector.duration_resolution)?;

        let synth = &self.synthesis;
        non_negative("synthesis.intro-silence", synth.intro_silence)?;
        non_negative("synthesis.section-break", synth.section_break)?;
        positive("synthesis.chord-duration", synth.chord_duration)?;
        positive("synthesis.min-chord-duration", synth.min_chord_duration)?;
        positive("synthesis.max-chord-duration", synth.max_chord_duration)?;
        count("synthesis.section-size", synth.section_size)?;
        count("synthesis.max-sections", synth.max_sections)?;
        if synth.min_chord_duration > synth.max_chord_duration {
            return Err(invalid(
                "synthesis.min-chord-duration",
                format!(
                    "{} exceeds max-chord-duration {}",
                    synth.min_chord_duration, synth.max_chord_duration
                ),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &str, message: String) -> SyncError {
    SyncError::InvalidConfig {
        field: field.to_string(),
        message,
    }
}

fn positive(field: &str, value: f64) -> Result<(), SyncError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be a positive number, got {}", value)))
    }
}

fn count(field: &str, value: usize) -> Result<(), SyncError> {
    if (1..=MAX_STRUCTURE_COUNT).contains(&value) {
        Ok(())
    } else {
        Err(invalid(
            field,
            format!("must be between 1 and {}, got {}", MAX_STRUCTURE_COUNT, value),
        ))
    }
}

fn non_negative(field: &str, value: f64) -> Result<(), SyncError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be zero or more, got {}", value)))
    }
}
