//! Fixed-capacity sample ring
//!
//! Holds the most recent audio covering the longest analysis window. New
//! samples evict the oldest ones; the length never exceeds the capacity.

use std::collections::VecDeque;

/// FIFO ring of mono samples
#[derive(Debug, Clone)]
pub struct SampleRing {
    /// Buffer data, oldest first
    data: VecDeque<f32>,
    /// Maximum number of samples retained
    capacity: usize,
}

impl SampleRing {
    /// Create an empty ring holding at most `capacity` samples
    pub fn new(capacity: usize) -> Self {
        Self {
            data: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append samples, evicting the oldest when full
    pub fn push_slice(&mut self, samples: &[f32]) {
        if self.capacity == 0 {
            return;
        }

        // Only the tail of an oversized block can survive
        let incoming = if samples.len() > self.capacity {
            &samples[samples.len() - self.capacity..]
        } else {
            samples
        };

        let overflow = (self.data.len() + incoming.len()).saturating_sub(self.capacity);
        self.data.drain(..overflow);
        self.data.extend(incoming.iter().copied());
    }

    /// Copy of the most recent `min(n, len)` samples, oldest first
    pub fn latest(&self, n: usize) -> Vec<f32> {
        let take = n.min(self.data.len());
        self.data.range(self.data.len() - take..).copied().collect()
    }

    /// Number of samples currently held
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the ring holds no samples
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Maximum number of samples retained
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop all samples
    pub fn clear(&mut self) {
        self.data.clear();
    }
}
