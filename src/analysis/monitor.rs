//! Control loop and display sinks
//!
//! [`Monitor`] ties the pieces together: a capture thread feeds blocks through
//! a bounded queue, and the loop drains them into the tracker, runs the
//! cadence-gated update and hands a frame to the display sink at its own
//! refresh rate. Estimation runs on the loop's thread, never on the capture
//! thread.
//!
//! Shutdown is cooperative: setting the flag from [`Monitor::stop_handle`]
//! (e.g. from a signal handler) ends both the loop and the capture thread.
//!
//! # Example
//!
//! ```no_run
//! use stratum_live::analysis::monitor::{LogSink, Monitor};
//! use stratum_live::io::source::PulseSource;
//! use stratum_live::TempoConfig;
//!
//! let config = TempoConfig::default();
//! let source = PulseSource::new(128.0, 44100, 2, 1024).with_duration(20.0);
//! let monitor = Monitor::start(source, LogSink::default(), config, true)?;
//! let final_frame = monitor.run()?;
//! println!("Final tempo: {:?}", final_frame.bpm);
//! # Ok::<(), stratum_live::TempoError>(())
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, TryRecvError};

use super::result::{DisplayFrame, UpdateOutcome};
use super::tracker::TempoTracker;
use crate::config::TempoConfig;
use crate::error::TempoError;
use crate::io::source::{spawn_capture, AudioBlock, AudioSource};

/// Receiver of rendering requests
pub trait DisplaySink {
    /// Draw one frame
    fn render(&mut self, frame: &DisplayFrame) -> Result<(), TempoError>;

    /// Blank the display before exit
    fn clear(&mut self) -> Result<(), TempoError>;
}

/// Sink that writes each frame to the log
#[derive(Debug, Default)]
pub struct LogSink {
    tick: u64,
}

impl DisplaySink for LogSink {
    fn render(&mut self, frame: &DisplayFrame) -> Result<(), TempoError> {
        self.tick += 1;
        log::info!(
            "tick={} bpm_est={:.1} bpm_lock={:.1} rms={:.4} conf={:.2} {}",
            self.tick,
            frame.candidate,
            frame.bpm.unwrap_or(0.0),
            frame.rms,
            frame.confidence,
            frame.phase
        );
        Ok(())
    }

    fn clear(&mut self) -> Result<(), TempoError> {
        Ok(())
    }
}

/// Control loop owning the tracker, the block queue and the display sink
pub struct Monitor<K: DisplaySink> {
    tracker: TempoTracker,
    receiver: Receiver<AudioBlock>,
    sink: K,
    stop: Arc<AtomicBool>,
    capture: Option<JoinHandle<()>>,
    label: String,
    refresh: Duration,
}

impl<K: DisplaySink> Monitor<K> {
    /// Start capturing from `source` and prepare the loop
    ///
    /// The source's sample rate and channel count override the ones in
    /// `config`. With `paced` set the capture thread delivers blocks at
    /// real-time speed.
    ///
    /// # Errors
    ///
    /// Returns `TempoError::InvalidInput` for an invalid configuration and
    /// `TempoError::SourceError` if the capture thread cannot start.
    pub fn start<S: AudioSource + 'static>(
        source: S,
        sink: K,
        mut config: TempoConfig,
        paced: bool,
    ) -> Result<Self, TempoError> {
        if config.sample_rate != source.sample_rate() || config.channels != source.channels() {
            log::info!(
                "Using source format {} Hz / {} ch (configured {} Hz / {} ch)",
                source.sample_rate(),
                source.channels(),
                config.sample_rate,
                config.channels
            );
            config.sample_rate = source.sample_rate();
            config.channels = source.channels();
        }

        let tracker = TempoTracker::new(config)?;
        let (sender, receiver) = bounded(tracker.config().queue_blocks);
        let stop = Arc::new(AtomicBool::new(false));
        let label = source.label();
        let refresh = Duration::from_secs_f32(tracker.config().refresh_sec);

        let capture = spawn_capture(source, sender, Arc::clone(&stop), paced)?;
        log::info!("Capturing from {}", label);

        Ok(Self {
            tracker,
            receiver,
            sink,
            stop,
            capture: Some(capture),
            label,
            refresh,
        })
    }

    /// Shared stop flag; setting it ends the loop and the capture thread
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Run until stopped or the source is exhausted
    ///
    /// Returns the last frame rendered.
    ///
    /// # Errors
    ///
    /// Returns `TempoError::SinkError` if the display cannot be cleared and
    /// `TempoError::SourceError` if the capture thread panicked.
    pub fn run(mut self) -> Result<DisplayFrame, TempoError> {
        let start = Instant::now();
        let mut last_frame = self.tracker.display_frame(&self.label);

        while !self.stop.load(Ordering::Relaxed) {
            let disconnected = self.drain();
            last_frame = self.step(start.elapsed());
            if disconnected {
                log::info!("Audio source finished");
                break;
            }
            thread::sleep(self.refresh);
        }

        self.shutdown()?;
        Ok(last_frame)
    }

    /// Move pending blocks into the tracker; true once the producer is gone
    ///
    /// Takes at most one queue's worth per refresh, so a producer that keeps
    /// refilling the queue cannot starve the update and the stop check.
    fn drain(&mut self) -> bool {
        for _ in 0..self.tracker.config().queue_blocks {
            match self.receiver.try_recv() {
                Ok(block) => self.tracker.push_block(&block),
                Err(TryRecvError::Empty) => return false,
                Err(TryRecvError::Disconnected) => return true,
            }
        }
        false
    }

    /// One refresh: cadence-gated update, then render
    fn step(&mut self, elapsed: Duration) -> DisplayFrame {
        if let Some(UpdateOutcome::Skipped(reason)) = self.tracker.tick(elapsed) {
            log::trace!("Update skipped: {}", reason);
        }

        let frame = self.tracker.display_frame(&self.label);
        if let Err(e) = self.sink.render(&frame) {
            log::warn!("Render failed: {}", e);
        }
        frame
    }

    fn shutdown(&mut self) -> Result<(), TempoError> {
        self.stop.store(true, Ordering::Relaxed);
        let cleared = self.sink.clear();

        if let Some(handle) = self.capture.take() {
            handle
                .join()
                .map_err(|_| TempoError::SourceError("Capture thread panicked".to_string()))?;
        }
        cleared
    }

    /// The tracker driven by this loop
    pub fn tracker(&self) -> &TempoTracker {
        &self.tracker
    }
}

impl<K: DisplaySink> Drop for Monitor<K> {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}
