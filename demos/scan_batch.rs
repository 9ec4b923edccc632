//! Demo: Replay many audio files offline, in parallel
//!
//! Usage:
//!   cargo run --release --example scan_batch -- [--json] <file1> <file2> ...
//!
//! Notes:
//! - Parallelism is across files. Each replay is single-threaded, exactly as
//!   the live tracker would see the audio.
//! - The reported tempo is the final lock after the whole file.

use std::env;
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use stratum_live::analysis::offline::replay;
use stratum_live::io::decoder::decode_audio;
use stratum_live::preprocessing::channel_mixer::downmix_interleaved;
use stratum_live::{TempoConfig, TempoError};

#[derive(Serialize)]
struct ScanResult {
    path: String,
    lock: Option<f32>,
    confidence: f32,
    updates: usize,
    elapsed_ms: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn scan(path: &str) -> Result<(Option<f32>, f32, usize), TempoError> {
    let audio = decode_audio(path)?;
    let config = TempoConfig {
        sample_rate: audio.sample_rate,
        channels: audio.channels,
        ..Default::default()
    };
    let mono = downmix_interleaved(&audio.samples, audio.channels as usize);
    let readings = replay(&mono, &config)?;
    let last = readings.last();
    Ok((
        last.map(|r| r.lock),
        last.map_or(0.0, |r| r.confidence),
        readings.len(),
    ))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut json = false;
    let mut paths = Vec::new();
    for arg in env::args().skip(1) {
        if arg == "--json" {
            json = true;
        } else {
            paths.push(arg);
        }
    }
    if paths.is_empty() {
        return Err("usage: scan_batch [--json] <file1> <file2> ...".into());
    }

    let results: Vec<ScanResult> = paths
        .par_iter()
        .map(|path| {
            let start = Instant::now();
            let outcome = scan(path);
            let elapsed_ms = start.elapsed().as_secs_f32() * 1000.0;
            match outcome {
                Ok((lock, confidence, updates)) => ScanResult {
                    path: path.clone(),
                    lock,
                    confidence,
                    updates,
                    elapsed_ms,
                    error: None,
                },
                Err(e) => ScanResult {
                    path: path.clone(),
                    lock: None,
                    confidence: 0.0,
                    updates: 0,
                    elapsed_ms,
                    error: Some(e.to_string()),
                },
            }
        })
        .collect();

    for r in &results {
        if json {
            println!("{}", serde_json::to_string(r)?);
        } else if let Some(err) = &r.error {
            println!("{}: error: {}", r.path, err);
        } else {
            match r.lock {
                Some(bpm) => println!(
                    "{}: {:.1} BPM (conf {:.2}, {} updates, {:.0} ms)",
                    r.path, bpm, r.confidence, r.updates, r.elapsed_ms
                ),
                None => println!("{}: no tempo ({:.0} ms)", r.path, r.elapsed_ms),
            }
        }
    }

    Ok(())
}
