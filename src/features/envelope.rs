//! Amplitude envelope extraction
//!
//! Turns a raw audio window into a smoothed, zero-mean amplitude curve whose
//! periodicity follows the rhythmic pulse of the input.
//!
//! # Algorithm
//!
//! 1. Full-wave rectification: `|x[n]|`
//! 2. One-pole low-pass: `y[n] = a * y[n-1] + (1 - a) * |x[n]|`,
//!    with `a = exp(-1 / (sample_rate * tau))`
//! 3. DC removal: subtract the mean of `y`
//!
//! The filter state starts at zero on every call. The recurrence is a strict
//! sequential scan and is kept that way.

/// Extract the DC-removed amplitude envelope of `samples`
///
/// # Arguments
///
/// * `samples` - Mono audio samples
/// * `sample_rate` - Sample rate in Hz
/// * `tau_sec` - Low-pass time constant in seconds (default 0.025)
///
/// # Returns
///
/// Envelope of the same length as `samples` (empty for empty input)
///
/// # Example
///
/// ```
/// use stratum_live::features::envelope::extract_envelope;
///
/// let env = extract_envelope(&[0.0; 16], 44100, 0.025);
/// assert!(env.iter().all(|&v| v == 0.0));
/// ```
pub fn extract_envelope(samples: &[f32], sample_rate: u32, tau_sec: f32) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }

    let decay = smoothing_coefficient(sample_rate, tau_sec);
    let gain = 1.0 - decay;

    let mut acc = 0.0f32;
    let mut envelope: Vec<f32> = samples
        .iter()
        .map(|&x| {
            acc = decay * acc + gain * x.abs();
            acc
        })
        .collect();

    let mean = (envelope.iter().map(|&v| v as f64).sum::<f64>() / envelope.len() as f64) as f32;
    for v in &mut envelope {
        *v -= mean;
    }

    envelope
}

/// Decay coefficient of the one-pole follower
///
/// A non-positive time constant or sample rate disables smoothing (`0.0`),
/// so the envelope degrades to the rectified signal.
pub fn smoothing_coefficient(sample_rate: u32, tau_sec: f32) -> f32 {
    let steps = sample_rate as f64 * tau_sec as f64;
    if !(steps.is_finite() && steps > 0.0) {
        return 0.0;
    }
    (-1.0 / steps).exp() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_stays_silent() {
        let env = extract_envelope(&vec![0.0f32; 44100], 44100, 0.025);
        assert_eq!(env.len(), 44100);
        assert!(env.iter().all(|&v| v == 0.0), "Silent input must give a zero envelope");
    }

    #[test]
    fn test_empty_input() {
        assert!(extract_envelope(&[], 44100, 0.025).is_empty());
    }

    #[test]
    fn test_zero_mean() {
        let samples: Vec<f32> = (0..22050)
            .map(|i| if i % 11025 < 441 { 0.9 } else { 0.01 })
            .collect();
        let env = extract_envelope(&samples, 44100, 0.025);
        let mean = env.iter().map(|&v| v as f64).sum::<f64>() / env.len() as f64;
        assert!(mean.abs() < 1e-4, "Envelope mean should be ~0, got {:.6}", mean);
    }

    #[test]
    fn test_rectifies_negative_input() {
        let pos = extract_envelope(&[0.5; 4410], 44100, 0.025);
        let neg = extract_envelope(&[-0.5; 4410], 44100, 0.025);
        for (a, b) in pos.iter().zip(neg.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_step_response_follows_time_constant() {
        // Mean removal shifts every value equally, so differences keep the raw shape:
        // y[n] = 1 - a^(n+1) for a unit step
        let sample_rate = 44100;
        let env = extract_envelope(&vec![1.0f32; 4410], sample_rate, 0.025);
        let a = smoothing_coefficient(sample_rate, 0.025) as f64;
        let tau_idx = 1102;

        let rise = (env[tau_idx] - env[0]) as f64;
        let expected = a - a.powi(tau_idx as i32 + 1);
        assert!(
            (rise - expected).abs() < 1e-3,
            "Step rise after one time constant: expected {:.4}, got {:.4}",
            expected,
            rise
        );
        assert!((expected - (1.0 - (-1.0f64).exp())).abs() < 2e-3);
    }

    #[test]
    fn test_coefficient() {
        let a = smoothing_coefficient(44100, 0.025);
        assert!((a - (-1.0f32 / 1102.5).exp()).abs() < 1e-7);
        assert_eq!(smoothing_coefficient(44100, 0.0), 0.0);
    }
}
