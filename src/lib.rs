//! # Stratum Live
//!
//! Real-time tempo tracking for a live audio stream, producing a stable BPM
//! reading suitable for display.
//!
//! ## Features
//!
//! - **Envelope extraction**: rectification, one-pole smoothing and DC removal
//! - **Periodicity estimation**: FFT-accelerated autocorrelation with parabolic
//!   lag refinement and octave folding into a plausible tempo range
//! - **Tempo tracking**: fast-lock then stable-lock windowing, a fixed update
//!   cadence and hysteresis smoothing of the displayed value
//! - **Signal gate**: estimation is suspended while the input is silent
//!
//! ## Quick Start
//!
//! ```no_run
//! use stratum_live::{TempoConfig, TempoTracker};
//! use std::time::Duration;
//!
//! let mut tracker = TempoTracker::new(TempoConfig::default())?;
//!
//! // From the capture side: mono samples and the block level
//! let block = vec![0.0f32; 1024];
//! tracker.push_samples(&block, 0.0);
//!
//! // From the control loop, at any refresh rate
//! if let Some(outcome) = tracker.tick(Duration::from_millis(50)) {
//!     println!("{:?}", outcome);
//! }
//! println!("Locked tempo: {:.1}", tracker.lock());
//! # Ok::<(), stratum_live::TempoError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Audio source → downmix + RMS → block queue → sample ring
//!     → (every update_sec) window → envelope → autocorrelation → candidate
//!     → hysteresis smoothing → locked BPM → display sink
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod preprocessing;

// Re-export main types
pub use analysis::monitor::{DisplaySink, LogSink, Monitor};
pub use analysis::result::{DisplayFrame, LockPhase, SkipReason, TempoReading, UpdateOutcome};
pub use analysis::tracker::TempoTracker;
pub use config::TempoConfig;
pub use error::TempoError;
pub use features::period::BpmCandidate;

/// Estimate the tempo of a mono window in one call
///
/// Runs envelope extraction and autocorrelation estimation with the settings
/// in `config`.
///
/// # Arguments
///
/// * `samples` - Mono audio samples, at least `config.min_analysis_sec` long
/// * `sample_rate` - Sample rate in Hz
/// * `config` - Tempo range and envelope settings
///
/// # Returns
///
/// BPM in `[config.bpm_min, config.bpm_max]`, or 0.0 when there is no usable
/// estimate
///
/// # Example
///
/// ```no_run
/// use stratum_live::{estimate_window, TempoConfig};
///
/// let samples = vec![0.0f32; 44100 * 8];
/// let bpm = estimate_window(&samples, 44100, &TempoConfig::default());
/// assert_eq!(bpm, 0.0);
/// ```
pub fn estimate_window(samples: &[f32], sample_rate: u32, config: &TempoConfig) -> f32 {
    let envelope = features::envelope::extract_envelope(samples, sample_rate, config.env_lp_sec);
    features::period::autocorrelation::estimate_bpm(&envelope, sample_rate, config)
}
