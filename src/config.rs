//! Configuration parameters for live tempo tracking

use serde::{Deserialize, Serialize};

use crate::error::TempoError;

/// Tracker configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TempoConfig {
    // Capture
    /// Sample rate of the incoming stream in Hz (default: 44100)
    pub sample_rate: u32,

    /// Frames per block delivered by the audio source (default: 1024)
    pub block_size: usize,

    /// Channels per frame delivered by the audio source (default: 2)
    pub channels: u16,

    // Windowing
    /// Long analysis window used once stable-lock begins (default: 8.0 s)
    pub window_sec: f32,

    /// Short analysis window used during fast-lock (default: 4.0 s)
    pub fast_lock_window_sec: f32,

    /// Time since start during which fast-lock is active (default: 6.0 s)
    pub fast_lock_duration_sec: f32,

    /// Minimum time between two estimations (default: 0.5 s)
    pub update_sec: f32,

    /// Minimum buffered audio before any estimate is attempted (default: 3.0 s)
    pub min_analysis_sec: f32,

    // Gate
    /// Block RMS below which the input is treated as "no signal" (default: 0.003)
    pub no_signal_rms: f32,

    // Periodicity
    /// Lowest tempo reported (default: 90.0)
    pub bpm_min: f32,

    /// Highest tempo reported (default: 180.0)
    pub bpm_max: f32,

    /// Envelope follower time constant in seconds (default: 0.025)
    pub env_lp_sec: f32,

    // Smoothing
    /// Candidates within this distance of the lock count as "close" (default: 2.0)
    pub close_bpm: f32,

    /// Smoothing coefficient for close candidates (default: 0.25)
    pub alpha_close: f32,

    /// Smoothing coefficient for far candidates (default: 0.10)
    pub alpha_far: f32,

    // Control loop
    /// Display refresh period of the control loop (default: 0.05 s)
    pub refresh_sec: f32,

    /// Capacity of the block queue between capture and control loop (default: 64)
    pub queue_blocks: usize,
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            block_size: 1024,
            channels: 2,
            window_sec: 8.0,
            fast_lock_window_sec: 4.0,
            fast_lock_duration_sec: 6.0,
            update_sec: 0.5,
            min_analysis_sec: 3.0,
            no_signal_rms: 0.003,
            bpm_min: 90.0,
            bpm_max: 180.0,
            env_lp_sec: 0.025,
            close_bpm: 2.0,
            alpha_close: 0.25,
            alpha_far: 0.10,
            refresh_sec: 0.05,
            queue_blocks: 64,
        }
    }
}

impl TempoConfig {
    /// Check that every parameter is usable
    ///
    /// # Errors
    ///
    /// Returns `TempoError::InvalidInput` naming the first offending field.
    pub fn validate(&self) -> Result<(), TempoError> {
        if self.sample_rate == 0 {
            return Err(invalid("sample_rate must be non-zero"));
        }
        if self.block_size == 0 {
            return Err(invalid("block_size must be non-zero"));
        }
        if self.channels == 0 {
            return Err(invalid("channels must be non-zero"));
        }
        if self.queue_blocks == 0 {
            return Err(invalid("queue_blocks must be non-zero"));
        }

        for (name, value) in [
            ("window_sec", self.window_sec),
            ("fast_lock_window_sec", self.fast_lock_window_sec),
            ("update_sec", self.update_sec),
            ("min_analysis_sec", self.min_analysis_sec),
            ("env_lp_sec", self.env_lp_sec),
            ("refresh_sec", self.refresh_sec),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(&format!("{} must be positive, got {}", name, value)));
            }
        }

        if !(self.fast_lock_duration_sec.is_finite() && self.fast_lock_duration_sec >= 0.0) {
            return Err(invalid("fast_lock_duration_sec must be non-negative"));
        }
        if self.fast_lock_window_sec > self.window_sec {
            return Err(invalid(&format!(
                "fast_lock_window_sec ({}) exceeds window_sec ({})",
                self.fast_lock_window_sec, self.window_sec
            )));
        }
        if self.min_analysis_sec > self.window_sec {
            return Err(invalid(&format!(
                "min_analysis_sec ({}) exceeds window_sec ({})",
                self.min_analysis_sec, self.window_sec
            )));
        }
        if self.min_analysis_sec > self.fast_lock_window_sec {
            return Err(invalid(&format!(
                "min_analysis_sec ({}) exceeds fast_lock_window_sec ({})",
                self.min_analysis_sec, self.fast_lock_window_sec
            )));
        }

        if !(self.bpm_min.is_finite() && self.bpm_max.is_finite())
            || self.bpm_min <= 0.0
            || self.bpm_min >= self.bpm_max
        {
            return Err(invalid(&format!(
                "Invalid BPM range: [{:.1}, {:.1}]",
                self.bpm_min, self.bpm_max
            )));
        }

        for (name, value) in [("alpha_close", self.alpha_close), ("alpha_far", self.alpha_far)] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(invalid(&format!("{} must lie in (0, 1], got {}", name, value)));
            }
        }

        if !(self.close_bpm.is_finite() && self.close_bpm >= 0.0) {
            return Err(invalid("close_bpm must be non-negative"));
        }
        if !(self.no_signal_rms.is_finite() && self.no_signal_rms >= 0.0) {
            return Err(invalid("no_signal_rms must be non-negative"));
        }

        Ok(())
    }

    /// Number of samples covering `sec` seconds at the configured rate
    pub fn window_samples(&self, sec: f32) -> usize {
        (sec as f64 * self.sample_rate as f64) as usize
    }

    /// Capacity of the sample ring: the longest analysis window
    pub fn ring_capacity(&self) -> usize {
        self.window_samples(self.window_sec)
    }

    /// Minimum number of samples needed before estimating
    pub fn min_analysis_samples(&self) -> usize {
        self.window_samples(self.min_analysis_sec)
    }
}

fn invalid(msg: &str) -> TempoError {
    TempoError::InvalidInput(msg.to_string())
}
