//! Autocorrelation-based tempo estimation
//!
//! Finds the dominant periodicity of an amplitude envelope using
//! FFT-accelerated autocorrelation.
//!
//! # Algorithm
//!
//! 1. Apply a Hann window to the envelope
//! 2. Zero-pad to the next power of two and compute `ACF = IFFT(|FFT(x)|²)`
//!    (Wiener–Khinchin), truncated to the envelope length
//! 3. Zero lag 0
//! 4. Search the lag band `[60·sr/bpm_max, 60·sr/bpm_min]` for the strongest lag
//!    (first occurrence wins ties)
//! 5. Refine the lag by parabolic interpolation
//! 6. Convert to BPM: `BPM = 60 · sample_rate / lag`
//! 7. Fold by octaves into `[bpm_min, bpm_max]`
//!
//! When no lag in the band correlates positively, the search is repeated over
//! one octave either side of the band before folding. This lets a pulse slower
//! than `bpm_min` report its double-time reading.
//!
//! Every degenerate outcome is reported as "no candidate" (`None`, or `0.0`
//! from [`estimate_bpm`]).
//!
//! # Example
//!
//! ```no_run
//! use stratum_live::features::envelope::extract_envelope;
//! use stratum_live::features::period::autocorrelation::estimate_bpm;
//! use stratum_live::TempoConfig;
//!
//! let config = TempoConfig::default();
//! let samples = vec![0.0f32; 44100 * 8];
//! let envelope = extract_envelope(&samples, 44100, config.env_lp_sec);
//! let bpm = estimate_bpm(&envelope, 44100, &config);
//! assert!(bpm == 0.0 || (config.bpm_min..=config.bpm_max).contains(&bpm));
//! ```

use std::f64::consts::PI;
use std::fmt;

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use super::peak_picking::{argmax_first, fold_octave, parabolic_refine};
use super::BpmCandidate;
use crate::config::TempoConfig;

/// Minimum number of lags a search band must span
const MIN_BAND_LAGS: usize = 11;

/// Reusable autocorrelation estimator
///
/// Holds the FFT planner so repeated estimations on equally sized windows
/// reuse the same plans.
pub struct AutocorrelationEstimator {
    planner: FftPlanner<f64>,
    bpm_min: f32,
    bpm_max: f32,
    min_analysis_sec: f32,
}

impl fmt::Debug for AutocorrelationEstimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutocorrelationEstimator")
            .field("bpm_min", &self.bpm_min)
            .field("bpm_max", &self.bpm_max)
            .field("min_analysis_sec", &self.min_analysis_sec)
            .finish()
    }
}

impl AutocorrelationEstimator {
    /// Create an estimator for the tempo range and data floor in `config`
    pub fn new(config: &TempoConfig) -> Self {
        Self {
            planner: FftPlanner::new(),
            bpm_min: config.bpm_min,
            bpm_max: config.bpm_max,
            min_analysis_sec: config.min_analysis_sec,
        }
    }

    /// Estimate tempo, returning 0.0 when there is no usable candidate
    pub fn estimate(&mut self, envelope: &[f32], sample_rate: u32) -> f32 {
        self.analyze(envelope, sample_rate)
            .map(|candidate| candidate.bpm)
            .unwrap_or(0.0)
    }

    /// Estimate tempo with its lag and correlation strength
    ///
    /// # Returns
    ///
    /// `None` when the envelope is shorter than the data floor, the lag band
    /// is degenerate, or the result is not a finite in-range tempo.
    pub fn analyze(&mut self, envelope: &[f32], sample_rate: u32) -> Option<BpmCandidate> {
        let n = envelope.len();
        let min_len = (self.min_analysis_sec as f64 * sample_rate as f64) as usize;
        if sample_rate == 0 || n < min_len.max(2) {
            log::debug!(
                "Envelope too short for estimation: {} samples (need {})",
                n,
                min_len
            );
            return None;
        }

        let windowed: Vec<f64> = envelope
            .iter()
            .zip(hann_window(n))
            .map(|(&x, w)| x as f64 * w)
            .collect();

        let mut acf = compute_autocorrelation_fft(&mut self.planner, &windowed);
        let energy = acf[0];
        acf[0] = 0.0;

        let sr = sample_rate as f64;
        let (lag_min, lag_max) = lag_band(sr, self.bpm_min as f64, self.bpm_max as f64, n)?;

        let (mut peak, mut value) = band_argmax(&acf, lag_min, lag_max)?;
        if value <= 0.0 {
            // No in-band periodicity: look one octave beyond each edge
            let (ext_min, ext_max) = lag_band(
                sr,
                self.bpm_min as f64 / 2.0,
                self.bpm_max as f64 * 2.0,
                n,
            )?;
            let (ext_peak, ext_value) = band_argmax(&acf, ext_min, ext_max)?;
            if ext_value <= 0.0 {
                log::debug!("No positive autocorrelation in extended band [{}, {}]", ext_min, ext_max);
                return None;
            }
            log::debug!("In-band ACF non-positive, using extended-band peak at lag {}", ext_peak);
            peak = ext_peak;
            value = ext_value;
        }

        let lag = parabolic_refine(&acf, peak);
        if !(lag.is_finite() && lag > 0.0) {
            return None;
        }

        let raw_bpm = (60.0 * sr / lag) as f32;
        let bpm = fold_octave(raw_bpm, self.bpm_min, self.bpm_max);

        log::debug!(
            "ACF peak: lag={} refined={:.2} raw={:.2} BPM folded={:.2} BPM",
            peak,
            lag,
            raw_bpm,
            bpm
        );

        if bpm <= 0.0 {
            return None;
        }

        let confidence = if energy > 0.0 && energy.is_finite() {
            (value / energy).clamp(0.0, 1.0) as f32
        } else {
            0.0
        };

        Some(BpmCandidate {
            bpm,
            confidence,
            lag: lag as f32,
        })
    }
}

/// Estimate tempo of an envelope with a one-off estimator
///
/// Convenience wrapper over [`AutocorrelationEstimator::estimate`]. Returns 0.0
/// when there is no usable candidate, otherwise a value in
/// `[config.bpm_min, config.bpm_max]`.
pub fn estimate_bpm(envelope: &[f32], sample_rate: u32, config: &TempoConfig) -> f32 {
    AutocorrelationEstimator::new(config).estimate(envelope, sample_rate)
}

/// Symmetric Hann window of length `n`
///
/// `w[i] = 0.5 - 0.5·cos(2πi / (n - 1))`; a single-point window is `[1.0]`.
pub fn hann_window(n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let denom = (n - 1) as f64;
            (0..n)
                .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / denom).cos())
                .collect()
        }
    }
}

/// Compute autocorrelation using FFT acceleration
///
/// Uses the identity: ACF = IFFT(|FFT(signal)|²). The signal is zero-padded
/// to the next power of two at or above its length and the result truncated
/// back to that length, normalised by the FFT size.
///
/// # Returns
///
/// Autocorrelation function indexed by lag (same length as input)
pub fn compute_autocorrelation_fft(planner: &mut FftPlanner<f64>, signal: &[f64]) -> Vec<f64> {
    let n = signal.len();
    if n == 0 {
        return Vec::new();
    }

    let fft_size = n.next_power_of_two();

    let mut buffer: Vec<Complex<f64>> = signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
    buffer.resize(fft_size, Complex::new(0.0, 0.0));

    let fft = planner.plan_fft_forward(fft_size);
    fft.process(&mut buffer);

    for x in &mut buffer {
        *x = *x * x.conj();
    }

    let ifft = planner.plan_fft_inverse(fft_size);
    ifft.process(&mut buffer);

    let scale = 1.0 / fft_size as f64;
    buffer[..n].iter().map(|x| x.re * scale).collect()
}

/// Inclusive lag band for a tempo range, clamped to `n - 1`
///
/// `None` when the band spans fewer than [`MIN_BAND_LAGS`] lags.
fn lag_band(sample_rate: f64, bpm_min: f64, bpm_max: f64, n: usize) -> Option<(usize, usize)> {
    let lag_min = ((sample_rate * 60.0 / bpm_max).round() as usize).max(1);
    let lag_max = ((sample_rate * 60.0 / bpm_min).round() as usize).min(n.saturating_sub(1));

    if lag_max < lag_min || lag_max - lag_min + 1 < MIN_BAND_LAGS {
        log::debug!("Degenerate lag band [{}, {}] for {} samples", lag_min, lag_max, n);
        return None;
    }

    Some((lag_min, lag_max))
}

fn band_argmax(acf: &[f64], lag_min: usize, lag_max: usize) -> Option<(usize, f64)> {
    argmax_first(&acf[lag_min..=lag_max]).map(|(i, value)| (lag_min + i, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::envelope::extract_envelope;

    /// Click track: 10 ms bursts of a 1 kHz tone every `60 / bpm` seconds
    fn click_track(bpm: f32, seconds: f32, sample_rate: u32) -> Vec<f32> {
        let len = (seconds * sample_rate as f32) as usize;
        let period = (60.0 * sample_rate as f64 / bpm as f64).round() as usize;
        let click_len = sample_rate as usize / 100;
        (0..len)
            .map(|i| {
                if i % period < click_len {
                    (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / sample_rate as f32).sin()
                } else {
                    0.0
                }
            })
            .collect()
    }

    #[test]
    fn test_120bpm_pulse_train() {
        let config = TempoConfig::default();
        let samples = click_track(120.0, 8.0, 44100);
        let envelope = extract_envelope(&samples, 44100, config.env_lp_sec);
        let bpm = estimate_bpm(&envelope, 44100, &config);
        assert!(
            (bpm - 120.0).abs() <= 1.0,
            "120 BPM pulse train should estimate ~120, got {:.2}",
            bpm
        );
    }

    #[test]
    fn test_60bpm_folds_to_120() {
        let config = TempoConfig::default();
        let samples = click_track(60.0, 8.0, 44100);
        let envelope = extract_envelope(&samples, 44100, config.env_lp_sec);
        let bpm = estimate_bpm(&envelope, 44100, &config);
        assert!(
            (bpm - 120.0).abs() <= 1.0,
            "60 BPM pulse train should fold to ~120, got {:.2}",
            bpm
        );
    }

    #[test]
    fn test_140bpm_short_window() {
        let config = TempoConfig::default();
        let samples = click_track(140.0, 4.0, 44100);
        let envelope = extract_envelope(&samples, 44100, config.env_lp_sec);
        let bpm = estimate_bpm(&envelope, 44100, &config);
        assert!(
            (bpm - 140.0).abs() <= 1.0,
            "140 BPM pulse train should estimate ~140, got {:.2}",
            bpm
        );
    }

    #[test]
    fn test_candidate_reports_lag_and_confidence() {
        let config = TempoConfig::default();
        let samples = click_track(120.0, 8.0, 44100);
        let envelope = extract_envelope(&samples, 44100, config.env_lp_sec);
        let mut estimator = AutocorrelationEstimator::new(&config);
        let candidate = estimator.analyze(&envelope, 44100).expect("candidate");
        assert!((candidate.lag - 22050.0).abs() < 50.0, "lag {:.1}", candidate.lag);
        assert!(candidate.confidence > 0.0 && candidate.confidence <= 1.0);
    }

    #[test]
    fn test_too_short_returns_zero() {
        let config = TempoConfig::default();
        let samples = click_track(120.0, 2.9, 44100);
        let envelope = extract_envelope(&samples, 44100, config.env_lp_sec);
        assert_eq!(estimate_bpm(&envelope, 44100, &config), 0.0);
        assert_eq!(estimate_bpm(&[], 44100, &config), 0.0);
    }

    #[test]
    fn test_silence_returns_zero() {
        let config = TempoConfig::default();
        let envelope = vec![0.0f32; 44100 * 4];
        assert_eq!(estimate_bpm(&envelope, 44100, &config), 0.0);
    }

    #[test]
    fn test_degenerate_band_returns_zero() {
        // 119-121 BPM at 1 kHz spans lags 496..504, fewer than the minimum
        let config = TempoConfig {
            bpm_min: 119.0,
            bpm_max: 121.0,
            ..Default::default()
        };
        let samples = click_track(120.0, 8.0, 1000);
        let envelope = extract_envelope(&samples, 1000, config.env_lp_sec);
        assert_eq!(estimate_bpm(&envelope, 1000, &config), 0.0);
    }

    #[test]
    fn test_output_always_in_range_or_zero() {
        let config = TempoConfig::default();
        // Deterministic pseudo-random noise
        let mut state = 0x1234_5678u32;
        let noise: Vec<f32> = (0..44100 * 4)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state as f32 / u32::MAX as f32) * 2.0 - 1.0
            })
            .collect();

        for signal in [noise, click_track(75.0, 5.0, 44100), click_track(200.0, 6.0, 44100)] {
            let envelope = extract_envelope(&signal, 44100, config.env_lp_sec);
            let bpm = estimate_bpm(&envelope, 44100, &config);
            assert!(bpm.is_finite());
            assert!(
                bpm == 0.0 || (config.bpm_min..=config.bpm_max).contains(&bpm),
                "Estimate {:.2} outside [{}, {}]",
                bpm,
                config.bpm_min,
                config.bpm_max
            );
        }
    }

    #[test]
    fn test_compute_autocorrelation_fft() {
        let mut planner = FftPlanner::new();
        let signal = vec![1.0, 0.0, 1.0, 0.0, 1.0, 0.0];
        let acf = compute_autocorrelation_fft(&mut planner, &signal);

        assert_eq!(acf.len(), signal.len());
        // Padded to 8 points the correlation is circular: lag 4 also sees
        // the pair (4, 0) wrapped around
        let expected = [3.0, 0.0, 2.0, 0.0, 2.0, 0.0];
        for (lag, (&got, &want)) in acf.iter().zip(expected.iter()).enumerate() {
            assert!((got - want).abs() < 1e-9, "ACF[{}] = {}, expected {}", lag, got, want);
        }
    }

    #[test]
    fn test_hann_window() {
        let w = hann_window(5);
        assert_eq!(w.len(), 5);
        assert!(w[0].abs() < 1e-12 && w[4].abs() < 1e-12);
        assert!((w[2] - 1.0).abs() < 1e-12);
        assert_eq!(hann_window(1), vec![1.0]);
        assert!(hann_window(0).is_empty());
    }
}
