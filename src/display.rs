//! Display policy for silence periods.
//!
//! The resolver answers "what is sounding now" and nothing else. What a player
//! should *show* when nothing is sounding is a separate, caller-owned decision:
//! clear the chord, keep the last one, or keep it for a short grace period.
//! [`ChordDisplay`] holds that "last displayed chord" state explicitly, and its
//! `start` and `tick` entry points both go through [`resolve`] and the same
//! policy function.

use serde::{Deserialize, Serialize};

use crate::model::{Progression, TimingOffset};
use crate::resolve::resolve;

/// What to show while no chord is sounding.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "mode")]
pub enum SilencePolicy {
    /// Show nothing
    #[default]
    Clear,
    /// Keep the last chord until another one starts
    Retain,
    /// Keep the last chord until `grace` seconds past its end
    Hold { grace: f64 },
}

/// Decide which chord index to display.
///
/// `previous` is the caller's last displayed index. A sounding chord always wins.
/// During silence the policy applies, except that a stale index (out of range,
/// or a chord that starts after the query time, as after seeking backwards) is
/// always dropped.
pub fn displayed_chord(
    policy: SilencePolicy,
    previous: Option<usize>,
    progression: &Progression,
    time: f64,
    offset: TimingOffset,
) -> Option<usize> {
    if let Some(active) = resolve(progression, time, offset) {
        return Some(active.index);
    }

    let t = offset.apply(time);
    let index = previous?;
    let last = progression.get(index)?;
    if t.is_nan() || t < last.start_time {
        return None;
    }

    match policy {
        SilencePolicy::Clear => None,
        SilencePolicy::Retain => Some(index),
        SilencePolicy::Hold { grace } => (t < last.end_time() + grace).then_some(index),
    }
}

/// Caller-held display state for one playback session.
///
/// # Example
/// ```rust
/// use chordsync::{ChordDisplay, ChordEvent, ChordSource, Progression, SilencePolicy, SongDuration, TimingOffset};
///
/// let events = vec![
///     ChordEvent::new("C", 0.0, 4.0, 1.0, ChordSource::Detected)?,
///     ChordEvent::new("G", 10.0, 4.0, 1.0, ChordSource::Detected)?,
/// ];
/// let progression = Progression::new(events, SongDuration::new(60.0)?)?;
/// let mut display = ChordDisplay::new(SilencePolicy::Hold { grace: 1.0 });
///
/// assert_eq!(display.start(&progression, 1.0, TimingOffset::ZERO), Some(0));
/// assert_eq!(display.tick(&progression, 4.5, TimingOffset::ZERO), Some(0)); // grace period
/// assert_eq!(display.tick(&progression, 6.0, TimingOffset::ZERO), None);
/// assert_eq!(display.tick(&progression, 10.0, TimingOffset::ZERO), Some(1));
/// # Ok::<(), chordsync::SyncError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ChordDisplay {
    policy: SilencePolicy,
    shown: Option<usize>,
}

impl ChordDisplay {
    pub fn new(policy: SilencePolicy) -> Self {
        ChordDisplay { policy, shown: None }
    }

    pub fn policy(&self) -> SilencePolicy {
        self.policy
    }

    /// Index currently displayed, if any.
    pub fn shown(&self) -> Option<usize> {
        self.shown
    }

    /// "Start playback": forget previous state, then resolve like a tick.
    pub fn start(&mut self, progression: &Progression, time: f64, offset: TimingOffset) -> Option<usize> {
        self.reset();
        self.tick(progression, time, offset)
    }

    /// Periodic time update.
    pub fn tick(&mut self, progression: &Progression, time: f64, offset: TimingOffset) -> Option<usize> {
        self.shown = displayed_chord(self.policy, self.shown, progression, time, offset);
        self.shown
    }

    /// Forget the displayed chord, e.g. when a new progression is loaded.
    pub fn reset(&mut self) {
        self.shown = None;
    }
}
