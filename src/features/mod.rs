//! Feature extraction modules
//!
//! This module contains the signal-processing stages of the tracker:
//! - Envelope extraction (rectify, smooth, remove DC)
//! - Period estimation (autocorrelation tempo candidate)

pub mod envelope;
pub mod period;
