//! Period estimation modules
//!
//! Convert an amplitude envelope to a tempo candidate using:
//! - FFT-accelerated autocorrelation
//! - Peak picking with parabolic refinement and octave folding

pub mod autocorrelation;
pub mod peak_picking;

use serde::{Deserialize, Serialize};

/// BPM candidate with confidence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BpmCandidate {
    /// BPM estimate, folded into the configured range
    pub bpm: f32,

    /// Normalised autocorrelation at the chosen lag (0.0-1.0)
    pub confidence: f32,

    /// Refined lag in samples (before octave folding)
    pub lag: f32,
}
