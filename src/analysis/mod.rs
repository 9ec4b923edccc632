//! Tracking and control modules
//!
//! Turns per-window estimates into a stable displayed tempo:
//! - Tempo tracker (windowing, cadence, hysteresis smoothing)
//! - Control loop and display sinks
//! - Offline replay
//! - Result types

pub mod monitor;
pub mod offline;
pub mod result;
pub mod tracker;
