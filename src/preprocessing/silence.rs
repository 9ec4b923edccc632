//! Level measurement and the signal gate
//!
//! The gate is a pure threshold on block RMS; it carries no state of its own.
//! The tracker consults it before spending any time on estimation, and the
//! display path uses it to show "no signal".

/// Root-mean-square level of a block of samples
///
/// Returns 0.0 for an empty block.
pub fn block_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum_sq / samples.len() as f64).sqrt() as f32
}

/// Whether a block level counts as signal
///
/// `rms >= threshold`. A NaN level is never treated as signal.
///
/// # Example
///
/// ```
/// use stratum_live::preprocessing::silence::is_signal_present;
///
/// assert!(is_signal_present(0.01, 0.003));
/// assert!(!is_signal_present(0.001, 0.003));
/// ```
pub fn is_signal_present(rms: f32, threshold: f32) -> bool {
    rms >= threshold
}
