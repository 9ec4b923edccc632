//! Audio sources and the capture thread
//!
//! An [`AudioSource`] produces interleaved blocks at a fixed rate. The capture
//! thread started by [`spawn_capture`] downmixes each block, measures its level
//! and hands it to the control loop through a bounded queue. The audio side
//! never blocks on the consumer: when the queue is full the block is dropped.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Sender, TrySendError};

use super::decoder::{decode_audio, DecodedAudio};
use crate::error::TempoError;
use crate::preprocessing::channel_mixer::downmix_interleaved;
use crate::preprocessing::silence::block_rms;

/// One captured block, already downmixed
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBlock {
    /// Mono samples
    pub samples: Vec<f32>,
    /// RMS level of `samples`
    pub rms: f32,
}

impl AudioBlock {
    /// Downmix an interleaved block and measure its level
    pub fn from_interleaved(interleaved: &[f32], channels: usize) -> Self {
        let samples = downmix_interleaved(interleaved, channels);
        let rms = block_rms(&samples);
        Self { samples, rms }
    }
}

/// Producer of interleaved audio blocks
pub trait AudioSource: Send {
    /// Sample rate in Hz
    fn sample_rate(&self) -> u32;

    /// Channels per frame
    fn channels(&self) -> u16;

    /// Device or channel identifier shown on the display
    fn label(&self) -> String;

    /// Next interleaved block, or `None` once the source is exhausted
    fn next_block(&mut self) -> Option<Vec<f32>>;
}

/// Replays decoded audio block by block
#[derive(Debug, Clone)]
pub struct FileSource {
    audio: DecodedAudio,
    block_size: usize,
    position: usize,
    label: String,
}

impl FileSource {
    /// Decode `path` and prepare it for replay in `block_size`-frame blocks
    ///
    /// # Errors
    ///
    /// Returns `TempoError::DecodingError` if decoding fails, or
    /// `TempoError::InvalidInput` for a zero block size.
    pub fn open<P: AsRef<Path>>(path: P, block_size: usize) -> Result<Self, TempoError> {
        let label = path
            .as_ref()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        let audio = decode_audio(path)?;
        Self::from_decoded(audio, block_size, label)
    }

    /// Replay already decoded audio
    pub fn from_decoded(
        audio: DecodedAudio,
        block_size: usize,
        label: String,
    ) -> Result<Self, TempoError> {
        if block_size == 0 {
            return Err(TempoError::InvalidInput("block_size must be non-zero".to_string()));
        }
        Ok(Self {
            audio,
            block_size,
            position: 0,
            label,
        })
    }
}

impl AudioSource for FileSource {
    fn sample_rate(&self) -> u32 {
        self.audio.sample_rate
    }

    fn channels(&self) -> u16 {
        self.audio.channels
    }

    fn label(&self) -> String {
        self.label.clone()
    }

    fn next_block(&mut self) -> Option<Vec<f32>> {
        let step = self.block_size * self.audio.channels as usize;
        if step == 0 || self.position >= self.audio.samples.len() {
            return None;
        }
        let end = (self.position + step).min(self.audio.samples.len());
        let block = self.audio.samples[self.position..end].to_vec();
        self.position = end;
        Some(block)
    }
}

/// Synthetic click track: short 1 kHz bursts at a fixed tempo
///
/// The clicks sit on a quiet 110 Hz bed so that blocks between clicks still
/// pass the signal gate, as they would with real music.
#[derive(Debug, Clone)]
pub struct PulseSource {
    bpm: f32,
    sample_rate: u32,
    channels: u16,
    block_size: usize,
    amplitude: f32,
    bed: f32,
    frame: usize,
    total_frames: Option<usize>,
}

impl PulseSource {
    /// Endless click track at `bpm`
    pub fn new(bpm: f32, sample_rate: u32, channels: u16, block_size: usize) -> Self {
        Self {
            bpm,
            sample_rate,
            channels,
            block_size,
            amplitude: 0.8,
            bed: 0.05,
            frame: 0,
            total_frames: None,
        }
    }

    /// Stop after `seconds` of audio
    pub fn with_duration(mut self, seconds: f32) -> Self {
        self.total_frames = Some((seconds as f64 * self.sample_rate as f64) as usize);
        self
    }

    /// Peak amplitude of each click (default 0.8)
    pub fn with_amplitude(mut self, amplitude: f32) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Peak amplitude of the background bed (default 0.05)
    pub fn with_bed(mut self, bed: f32) -> Self {
        self.bed = bed;
        self
    }

    fn period_frames(&self) -> usize {
        if self.bpm <= 0.0 {
            return usize::MAX;
        }
        ((60.0 * self.sample_rate as f64 / self.bpm as f64).round() as usize).max(1)
    }
}

impl AudioSource for PulseSource {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn label(&self) -> String {
        format!("pulse {:.1}", self.bpm)
    }

    fn next_block(&mut self) -> Option<Vec<f32>> {
        let remaining = match self.total_frames {
            Some(total) if self.frame >= total => return None,
            Some(total) => total - self.frame,
            None => usize::MAX,
        };
        let frames = self.block_size.min(remaining);
        if frames == 0 || self.channels == 0 {
            return None;
        }

        let period = self.period_frames();
        let click_len = (self.sample_rate as usize / 100).max(1);
        let tau = 2.0 * std::f32::consts::PI / self.sample_rate as f32;

        let mut block = Vec::with_capacity(frames * self.channels as usize);
        for i in self.frame..self.frame + frames {
            let mut value = self.bed * (tau * 110.0 * i as f32).sin();
            if i % period < click_len {
                value += self.amplitude * (tau * 1000.0 * i as f32).sin();
            }
            block.extend(std::iter::repeat(value).take(self.channels as usize));
        }
        self.frame += frames;
        Some(block)
    }
}

/// Run `source` on its own thread, feeding downmixed blocks into `sender`
///
/// The thread exits when the source is exhausted, the stop flag is set, or the
/// receiver is gone. With `paced` set it sleeps one block duration between
/// blocks, replaying at real-time speed.
///
/// # Errors
///
/// Returns `TempoError::SourceError` if the thread cannot be spawned.
pub fn spawn_capture<S: AudioSource + 'static>(
    mut source: S,
    sender: Sender<AudioBlock>,
    stop: Arc<AtomicBool>,
    paced: bool,
) -> Result<JoinHandle<()>, TempoError> {
    let channels = source.channels() as usize;
    let sample_rate = source.sample_rate();

    thread::Builder::new()
        .name("audio-capture".to_string())
        .spawn(move || {
            let mut dropped = 0usize;
            while !stop.load(Ordering::Relaxed) {
                let Some(interleaved) = source.next_block() else {
                    log::debug!("Audio source exhausted");
                    break;
                };

                let block = AudioBlock::from_interleaved(&interleaved, channels);
                let block_frames = block.samples.len();

                match sender.try_send(block) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        dropped += 1;
                        log::warn!("Block queue full, dropped block ({} so far)", dropped);
                    }
                    Err(TrySendError::Disconnected(_)) => break,
                }

                if paced && sample_rate > 0 {
                    thread::sleep(Duration::from_secs_f64(
                        block_frames as f64 / sample_rate as f64,
                    ));
                }
            }
        })
        .map_err(|e| TempoError::SourceError(format!("Failed to spawn capture thread: {}", e)))
}
