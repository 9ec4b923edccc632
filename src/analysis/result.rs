//! Tracker result types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Analysis window regime
///
/// The tracker starts in `FastLock` and moves to `StableLock` once the
/// configured fast-lock duration has elapsed. The move is one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockPhase {
    /// Short window, quicker initial convergence
    FastLock,
    /// Long window, steadier estimate
    StableLock,
}

impl fmt::Display for LockPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockPhase::FastLock => write!(f, "fast-lock"),
            LockPhase::StableLock => write!(f, "stable-lock"),
        }
    }
}

/// Why an update cycle left the lock untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkipReason {
    /// Input level below the gate threshold
    NoSignal,
    /// Not enough buffered audio yet
    InsufficientData,
    /// Estimator found no usable periodicity
    NoCandidate,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoSignal => write!(f, "no signal"),
            SkipReason::InsufficientData => write!(f, "insufficient data"),
            SkipReason::NoCandidate => write!(f, "no candidate"),
        }
    }
}

/// Snapshot of the tracker after a successful update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempoReading {
    /// Seconds since the tracker started
    pub elapsed_sec: f32,

    /// Raw estimate of this cycle (folded into range)
    pub candidate: f32,

    /// Normalised autocorrelation of the candidate (0.0-1.0)
    pub confidence: f32,

    /// Smoothed, displayed tempo
    pub lock: f32,

    /// Whether the candidate was within `close_bpm` of the previous lock
    pub following: bool,

    /// Window regime used for this estimate
    pub phase: LockPhase,

    /// Number of samples analysed
    pub window_samples: usize,
}

/// Result of one update cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpdateOutcome {
    /// The lock was updated (or bootstrapped)
    Updated(TempoReading),
    /// Nothing changed this cycle
    Skipped(SkipReason),
}

impl UpdateOutcome {
    /// The reading, if the cycle produced one
    pub fn reading(&self) -> Option<&TempoReading> {
        match self {
            UpdateOutcome::Updated(reading) => Some(reading),
            UpdateOutcome::Skipped(_) => None,
        }
    }
}

/// Rendering request handed to a display sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayFrame {
    /// Locked tempo, or `None` while the gate is closed
    pub bpm: Option<f32>,

    /// Level of the most recent block
    pub rms: f32,

    /// Device or channel identifier
    pub label: String,

    /// Most recent raw candidate (0.0 if none yet)
    pub candidate: f32,

    /// Confidence of the most recent candidate
    pub confidence: f32,

    /// Whether the lock is following the candidate closely
    pub following: bool,

    /// Current window regime
    pub phase: LockPhase,
}

impl DisplayFrame {
    /// The four text lines of the status panel
    ///
    /// # Example
    ///
    /// ```
    /// use stratum_live::analysis::result::{DisplayFrame, LockPhase};
    ///
    /// let frame = DisplayFrame {
    ///     bpm: Some(128.04),
    ///     rms: 0.0421,
    ///     label: "2".to_string(),
    ///     candidate: 128.1,
    ///     confidence: 0.9,
    ///     following: true,
    ///     phase: LockPhase::StableLock,
    /// };
    /// assert_eq!(frame.lines(), ["BPM (ACF)", " 128.0", "rms 0.042", "in[2]"]);
    /// ```
    pub fn lines(&self) -> [String; 4] {
        let value = match self.bpm {
            Some(bpm) => format!("{:6.1}", bpm),
            None => "NO SIGNAL".to_string(),
        };
        [
            "BPM (ACF)".to_string(),
            value,
            format!("rms {:.3}", self.rms),
            format!("in[{}]", self.label),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(bpm: Option<f32>) -> DisplayFrame {
        DisplayFrame {
            bpm,
            rms: 0.0012,
            label: "USB Audio CODEC".to_string(),
            candidate: 0.0,
            confidence: 0.0,
            following: false,
            phase: LockPhase::FastLock,
        }
    }

    #[test]
    fn test_no_signal_lines() {
        let lines = frame(None).lines();
        assert_eq!(lines[1], "NO SIGNAL");
        assert_eq!(lines[2], "rms 0.001");
        assert_eq!(lines[3], "in[USB Audio CODEC]");
    }

    #[test]
    fn test_unlocked_shows_zero() {
        let lines = frame(Some(0.0)).lines();
        assert_eq!(lines[1], "   0.0");
    }

    #[test]
    fn test_outcome_reading() {
        assert!(UpdateOutcome::Skipped(SkipReason::NoSignal).reading().is_none());
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(LockPhase::FastLock.to_string(), "fast-lock");
        assert_eq!(SkipReason::InsufficientData.to_string(), "insufficient data");
    }
}
