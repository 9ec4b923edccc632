//! Demo: Replay an audio file through the live tracker in real time
//!
//! Usage:
//!   cargo run --release --example replay_file -- <file>
//!
//! Each display refresh is logged; set `RUST_LOG=debug` for estimation details.

use std::env;

use stratum_live::io::source::FileSource;
use stratum_live::{LogSink, Monitor, TempoConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = env::args()
        .nth(1)
        .ok_or("usage: replay_file <audio file>")?;

    let config = TempoConfig::default();
    let source = FileSource::open(&path, config.block_size)?;

    let monitor = Monitor::start(source, LogSink::default(), config, true)?;
    let frame = monitor.run()?;

    for line in frame.lines() {
        println!("{}", line);
    }

    Ok(())
}
