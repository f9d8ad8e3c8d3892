//! # Error Types
//!
//! This module defines all error types for the chord synchronization engine.
//!
//! Most failure modes in this crate degrade instead of erroring: malformed chord
//! events are dropped or re-derived, empty input becomes an empty progression.
//! The variants below cover the cases a caller has to decide about.
//!
//! ## Error Types
//! - `InvalidEvent` - A `ChordEvent` was constructed with impossible timing
//! - `InvalidSongDuration` - The caller-supplied song duration is not a positive number
//! - `InvalidConfig` - A configuration value is out of range
//! - `Config` - The YAML configuration could not be parsed
//! - `Payload` - The JSON analysis payload could not be parsed
//! - `Coverage` - A coverage report was rejected via `CoverageReport::ensure_valid`
//! - `Io` - Reading a configuration or payload file failed
//!
//! ## Usage
//! ```rust
//! use chordsync::{prepare_json, SyncConfig, SyncError};
//!
//! match prepare_json("not json", &SyncConfig::default()) {
//!     Ok(prepared) => println!("{} chords", prepared.progression.len()),
//!     Err(SyncError::Payload(e)) => eprintln!("Bad payload: {}", e),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    /// A chord event with non-finite values, a negative start, or a non-positive duration.
    ///
    /// # Example
    /// ```
    /// # use chordsync::SyncError;
    /// let err = SyncError::InvalidEvent {
    ///     chord: "Am".to_string(),
    ///     message: "duration must be positive, got 0".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Invalid chord event 'Am': duration must be positive, got 0");
    /// ```
    #[error("Invalid chord event '{chord}': {message}")]
    InvalidEvent { chord: String, message: String },

    /// The song duration must be a positive, finite number of seconds.
    #[error("Invalid song duration: {0} (must be a positive number of seconds)")]
    InvalidSongDuration(f64),

    /// A configuration field holds a value the engine cannot work with.
    ///
    /// # Example
    /// ```
    /// # use chordsync::SyncError;
    /// let err = SyncError::InvalidConfig {
    ///     field: "synthesis.section-size".to_string(),
    ///     message: "must be at least 1".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Invalid config value for synthesis.section-size: must be at least 1");
    /// ```
    #[error("Invalid config value for {field}: {message}")]
    InvalidConfig { field: String, message: String },

    #[error("Invalid config: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("Invalid analysis payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// Coverage validation failed and the caller asked for a hard rejection.
    #[error("Coverage check failed: {overlaps} overlap(s), overrun {overrun:.3}s")]
    Coverage { overlaps: usize, overrun: f64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
