//! Integration tests for live tempo tracking

use std::path::PathBuf;
use std::time::Duration;

use stratum_live::analysis::offline::replay;
use stratum_live::io::decoder::decode_audio;
use stratum_live::io::source::FileSource;
use stratum_live::preprocessing::channel_mixer::downmix_interleaved;
use stratum_live::{
    estimate_window, LockPhase, LogSink, Monitor, SkipReason, TempoConfig, TempoTracker,
    UpdateOutcome,
};

/// Mono click track over a quiet 110 Hz bed
fn click_track(bpm: f32, seconds: f32, sample_rate: u32) -> Vec<f32> {
    let len = (seconds * sample_rate as f32) as usize;
    let period = (60.0 * sample_rate as f64 / bpm as f64).round() as usize;
    let click_len = sample_rate as usize / 100;
    let tau = 2.0 * std::f32::consts::PI / sample_rate as f32;
    (0..len)
        .map(|i| {
            let bed = 0.05 * (tau * 110.0 * i as f32).sin();
            if i % period < click_len {
                bed + 0.6 * (tau * 1000.0 * i as f32).sin()
            } else {
                bed
            }
        })
        .collect()
}

/// Write a stereo 16-bit WAV fixture to the temp dir and return its path
fn write_stereo_fixture(name: &str, mono: &[f32], sample_rate: u32) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "stratum_live_{}_{}.wav",
        name,
        std::process::id()
    ));
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).expect("Failed to create fixture");
    for &s in mono {
        let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(v).unwrap();
        writer.write_sample(v).unwrap();
    }
    writer.finalize().expect("Failed to finalize fixture");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_window_120bpm() {
        let samples = click_track(120.0, 8.0, 44100);
        let bpm = estimate_window(&samples, 44100, &TempoConfig::default());
        assert!(
            (bpm - 120.0).abs() <= 1.0,
            "120 BPM pulse train should estimate ~120, got {:.2}",
            bpm
        );
    }

    #[test]
    fn test_estimate_window_folds_60bpm() {
        let samples = click_track(60.0, 8.0, 44100);
        let bpm = estimate_window(&samples, 44100, &TempoConfig::default());
        assert!(
            (bpm - 120.0).abs() <= 1.0,
            "60 BPM pulse train should fold to ~120, got {:.2}",
            bpm
        );
    }

    #[test]
    fn test_estimate_window_range_property() {
        let config = TempoConfig::default();
        for bpm in [70.0, 95.0, 133.0, 175.0, 240.0] {
            for seconds in [3.0, 4.0, 8.0] {
                let estimate = estimate_window(&click_track(bpm, seconds, 44100), 44100, &config);
                assert!(estimate.is_finite());
                assert!(
                    estimate == 0.0 || (config.bpm_min..=config.bpm_max).contains(&estimate),
                    "{} BPM over {}s gave {:.2}",
                    bpm,
                    seconds,
                    estimate
                );
            }
        }
    }

    #[test]
    fn test_tracker_gate_keeps_lock() {
        let mut tracker = TempoTracker::new(TempoConfig::default()).unwrap();
        tracker.push_samples(&click_track(120.0, 8.0, 44100), 0.2);
        let outcome = tracker.update(Duration::from_secs(8));
        let locked = outcome.reading().expect("should lock").lock;

        tracker.push_samples(&click_track(150.0, 8.0, 44100), 0.0005);
        assert_eq!(
            tracker.update(Duration::from_secs(16)),
            UpdateOutcome::Skipped(SkipReason::NoSignal)
        );
        assert_eq!(tracker.lock(), locked);
    }

    #[test]
    fn test_wav_fixture_replay_locks() {
        let sample_rate = 44100;
        let path = write_stereo_fixture("replay", &click_track(120.0, 10.0, sample_rate), sample_rate);

        let audio = decode_audio(&path).expect("Failed to decode fixture");
        assert_eq!(audio.sample_rate, sample_rate);
        assert_eq!(audio.channels, 2);
        assert!((audio.duration_seconds() - 10.0).abs() < 0.01);

        let mono = downmix_interleaved(&audio.samples, audio.channels as usize);
        let readings = replay(&mono, &TempoConfig::default()).unwrap();
        let _ = std::fs::remove_file(&path);

        let last = readings.last().expect("should produce readings");
        assert_eq!(last.phase, LockPhase::StableLock);
        assert!(
            (last.lock - 120.0).abs() <= 1.0,
            "Lock should settle near 120, got {:.2}",
            last.lock
        );
    }

    #[test]
    fn test_file_source_through_monitor() {
        let sample_rate = 44100;
        let path = write_stereo_fixture("monitor", &click_track(120.0, 2.0, sample_rate), sample_rate);

        let source = FileSource::open(&path, 1024).expect("Failed to open fixture");
        let config = TempoConfig {
            refresh_sec: 0.001,
            queue_blocks: 1024,
            ..Default::default()
        };
        let monitor = Monitor::start(source, LogSink::default(), config, false).unwrap();
        let frame = monitor.run().expect("Monitor should shut down cleanly");
        let _ = std::fs::remove_file(&path);

        assert!(frame.label.starts_with("stratum_live_monitor_"));
        assert!(frame.rms > 0.0);
    }
}
