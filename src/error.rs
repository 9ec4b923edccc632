//! Error types for the live tempo tracker
//!
//! The signal path itself never fails: degenerate estimates collapse to the
//! `0.0` sentinel. These errors cover configuration and the collaborators
//! around the core (file decoding, capture thread, display sink).

use std::fmt;

/// Errors that can occur while setting up or running tempo tracking
#[derive(Debug, Clone)]
pub enum TempoError {
    /// Invalid input parameters or configuration
    InvalidInput(String),

    /// Audio decoding error
    DecodingError(String),

    /// Audio source failed to start or its thread died
    SourceError(String),

    /// Display sink failed to render or clear
    SinkError(String),
}

impl fmt::Display for TempoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TempoError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            TempoError::DecodingError(msg) => write!(f, "Decoding error: {}", msg),
            TempoError::SourceError(msg) => write!(f, "Audio source error: {}", msg),
            TempoError::SinkError(msg) => write!(f, "Display sink error: {}", msg),
        }
    }
}

impl std::error::Error for TempoError {}
