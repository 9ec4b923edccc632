//! Audio I/O modules
//!
//! Sample buffering, file decoding using Symphonia, and the audio sources
//! that feed the tracker from their own thread.

pub mod decoder;
pub mod sample_buffer;
pub mod source;
