//! Audio preprocessing modules
//!
//! This module contains utilities applied to each captured block before it
//! reaches the sample ring:
//! - Channel mixing (multi-channel to mono)
//! - Level measurement and the signal gate

pub mod channel_mixer;
pub mod silence;
