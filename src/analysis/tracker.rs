//! Tempo tracker
//!
//! Owns the sample ring and the locked tempo. At a fixed cadence it takes the
//! most recent window of audio, estimates a raw tempo candidate and folds it
//! into the lock with hysteresis smoothing.
//!
//! # Windowing
//!
//! - **Fast-lock** (`elapsed < fast_lock_duration_sec`): `fast_lock_window_sec`
//!   of audio, for quick initial convergence
//! - **Stable-lock** (afterwards): `window_sec` of audio, for a steadier reading
//!
//! # Smoothing
//!
//! The first candidate sets the lock directly. Later candidates move it by
//! `lock = (1 - a)·lock + a·candidate`, with `a = alpha_close` when the
//! candidate is within `close_bpm` of the lock and `alpha_far` otherwise.
//!
//! Degenerate cycles (gate closed, too little audio, no candidate) leave the
//! lock untouched and are reported as [`UpdateOutcome::Skipped`].

use std::time::Duration;

use super::result::{DisplayFrame, LockPhase, SkipReason, TempoReading, UpdateOutcome};
use crate::config::TempoConfig;
use crate::error::TempoError;
use crate::features::envelope::extract_envelope;
use crate::features::period::autocorrelation::AutocorrelationEstimator;
use crate::features::period::BpmCandidate;
use crate::io::sample_buffer::SampleRing;
use crate::io::source::AudioBlock;
use crate::preprocessing::silence::is_signal_present;

/// Live tempo tracker
#[derive(Debug)]
pub struct TempoTracker {
    config: TempoConfig,
    ring: SampleRing,
    estimator: AutocorrelationEstimator,
    last_rms: f32,
    lock: f32,
    last_candidate: Option<BpmCandidate>,
    following: bool,
    last_update: Option<Duration>,
    phase: LockPhase,
}

impl TempoTracker {
    /// Create a tracker with an empty ring sized for `config.window_sec`
    ///
    /// # Errors
    ///
    /// Returns `TempoError::InvalidInput` if the configuration is invalid.
    pub fn new(config: TempoConfig) -> Result<Self, TempoError> {
        config.validate()?;
        log::debug!(
            "Tempo tracker: {} Hz, ring {} samples, range [{:.1}, {:.1}] BPM",
            config.sample_rate,
            config.ring_capacity(),
            config.bpm_min,
            config.bpm_max
        );
        Ok(Self {
            ring: SampleRing::new(config.ring_capacity()),
            estimator: AutocorrelationEstimator::new(&config),
            config,
            last_rms: 0.0,
            lock: 0.0,
            last_candidate: None,
            following: false,
            last_update: None,
            phase: LockPhase::FastLock,
        })
    }

    /// Append a captured block and record its level
    pub fn push_block(&mut self, block: &AudioBlock) {
        self.push_samples(&block.samples, block.rms);
    }

    /// Append mono samples and record the level of the block they came from
    pub fn push_samples(&mut self, samples: &[f32], rms: f32) {
        self.ring.push_slice(samples);
        self.last_rms = rms;
    }

    /// Window regime for a given time since start
    ///
    /// Once the tracker has reached stable-lock it stays there, whatever
    /// `elapsed` says.
    pub fn phase_at(&self, elapsed: Duration) -> LockPhase {
        if self.phase == LockPhase::StableLock {
            return LockPhase::StableLock;
        }
        if elapsed.as_secs_f64() < self.config.fast_lock_duration_sec as f64 {
            LockPhase::FastLock
        } else {
            LockPhase::StableLock
        }
    }

    /// Requested analysis length in samples for a given time since start
    pub fn window_samples_at(&self, elapsed: Duration) -> usize {
        let sec = match self.phase_at(elapsed) {
            LockPhase::FastLock => self.config.fast_lock_window_sec,
            LockPhase::StableLock => self.config.window_sec,
        };
        self.config.window_samples(sec)
    }

    /// Run an update if at least `update_sec` has passed since the last one
    ///
    /// Returns `None` when the cadence gate holds the update back. The first
    /// call always runs.
    pub fn tick(&mut self, elapsed: Duration) -> Option<UpdateOutcome> {
        if let Some(last) = self.last_update {
            let since = elapsed.saturating_sub(last);
            if since.as_secs_f64() < self.config.update_sec as f64 {
                return None;
            }
        }
        self.last_update = Some(elapsed);
        Some(self.update(elapsed))
    }

    /// Run one update cycle unconditionally
    pub fn update(&mut self, elapsed: Duration) -> UpdateOutcome {
        let phase = self.phase_at(elapsed);
        if phase != self.phase {
            log::info!("Switching to {} after {:.1}s", phase, elapsed.as_secs_f32());
            self.phase = phase;
        }

        if !self.is_signal_present() {
            return UpdateOutcome::Skipped(SkipReason::NoSignal);
        }
        if self.ring.len() < self.config.min_analysis_samples() {
            return UpdateOutcome::Skipped(SkipReason::InsufficientData);
        }

        let window = self.ring.latest(self.window_samples_at(elapsed));
        let envelope = extract_envelope(&window, self.config.sample_rate, self.config.env_lp_sec);

        let Some(candidate) = self.estimator.analyze(&envelope, self.config.sample_rate) else {
            return UpdateOutcome::Skipped(SkipReason::NoCandidate);
        };

        self.apply_candidate(candidate.bpm);
        self.last_candidate = Some(candidate);

        let reading = TempoReading {
            elapsed_sec: elapsed.as_secs_f32(),
            candidate: candidate.bpm,
            confidence: candidate.confidence,
            lock: self.lock,
            following: self.following,
            phase,
            window_samples: window.len(),
        };
        log::debug!(
            "Update at {:.2}s: candidate {:.2} BPM, lock {:.2} BPM ({} samples, {})",
            reading.elapsed_sec,
            reading.candidate,
            reading.lock,
            reading.window_samples,
            phase
        );
        UpdateOutcome::Updated(reading)
    }

    /// Fold a raw candidate into the lock and return the new lock
    ///
    /// Non-positive or non-finite candidates leave the lock unchanged.
    pub fn apply_candidate(&mut self, candidate: f32) -> f32 {
        if !(candidate.is_finite() && candidate > 0.0) {
            return self.lock;
        }

        if self.lock == 0.0 {
            log::info!("Tempo locked at {:.2} BPM", candidate);
            self.lock = candidate;
            self.following = true;
            return self.lock;
        }

        self.following = (candidate - self.lock).abs() <= self.config.close_bpm;
        let alpha = if self.following {
            self.config.alpha_close
        } else {
            self.config.alpha_far
        };
        self.lock = (1.0 - alpha) * self.lock + alpha * candidate;
        self.lock
    }

    /// Build the rendering request for the current state
    pub fn display_frame(&self, label: &str) -> DisplayFrame {
        DisplayFrame {
            bpm: self.is_signal_present().then_some(self.lock),
            rms: self.last_rms,
            label: label.to_string(),
            candidate: self.last_candidate.map_or(0.0, |c| c.bpm),
            confidence: self.last_candidate.map_or(0.0, |c| c.confidence),
            following: self.following,
            phase: self.phase,
        }
    }

    /// Whether the most recent block passed the gate
    pub fn is_signal_present(&self) -> bool {
        is_signal_present(self.last_rms, self.config.no_signal_rms)
    }

    /// Locked tempo (0.0 until the first candidate)
    pub fn lock(&self) -> f32 {
        self.lock
    }

    /// Level of the most recent block
    pub fn last_rms(&self) -> f32 {
        self.last_rms
    }

    /// Most recent raw candidate
    pub fn last_candidate(&self) -> Option<BpmCandidate> {
        self.last_candidate
    }

    /// Number of buffered samples
    pub fn buffered_samples(&self) -> usize {
        self.ring.len()
    }

    /// Active configuration
    pub fn config(&self) -> &TempoConfig {
        &self.config
    }
}
