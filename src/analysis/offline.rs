//! Offline replay
//!
//! Feeds a recorded mono buffer through a fresh tracker block by block, using
//! the sample clock as elapsed time. Gives the same readings the live loop
//! would produce with perfectly regular block delivery, without sleeping.

use std::time::Duration;

use super::result::{TempoReading, UpdateOutcome};
use super::tracker::TempoTracker;
use crate::config::TempoConfig;
use crate::error::TempoError;
use crate::preprocessing::silence::block_rms;

/// Replay `samples` through a tracker and collect every successful update
///
/// # Arguments
///
/// * `samples` - Mono samples at `config.sample_rate`
/// * `config` - Tracker configuration; `block_size` sets the replay block
///
/// # Returns
///
/// One [`TempoReading`] per update that produced a candidate, in time order
///
/// # Errors
///
/// Returns `TempoError::InvalidInput` if the configuration is invalid.
///
/// # Example
///
/// ```no_run
/// use stratum_live::analysis::offline::replay;
/// use stratum_live::TempoConfig;
///
/// let samples = vec![0.0f32; 44100 * 10];
/// let readings = replay(&samples, &TempoConfig::default())?;
/// if let Some(last) = readings.last() {
///     println!("Locked at {:.1} BPM", last.lock);
/// }
/// # Ok::<(), stratum_live::TempoError>(())
/// ```
pub fn replay(samples: &[f32], config: &TempoConfig) -> Result<Vec<TempoReading>, TempoError> {
    let mut tracker = TempoTracker::new(config.clone())?;
    let sample_rate = config.sample_rate as f64;

    let mut readings = Vec::new();
    let mut consumed = 0usize;

    for block in samples.chunks(config.block_size) {
        tracker.push_samples(block, block_rms(block));
        consumed += block.len();

        let elapsed = Duration::from_secs_f64(consumed as f64 / sample_rate);
        if let Some(UpdateOutcome::Updated(reading)) = tracker.tick(elapsed) {
            readings.push(reading);
        }
    }

    log::debug!(
        "Replayed {:.1}s of audio, {} updates",
        consumed as f64 / sample_rate,
        readings.len()
    );

    Ok(readings)
}
