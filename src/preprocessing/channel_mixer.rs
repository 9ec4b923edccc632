//! Channel mixing utilities (multi-channel to mono conversion)

/// Downmix interleaved multi-channel samples to mono
///
/// Each output sample is the average of one frame's channels. A trailing
/// partial frame is ignored.
///
/// # Arguments
///
/// * `samples` - Interleaved samples (`[L, R, L, R, ...]` for stereo)
/// * `channels` - Number of channels per frame
///
/// # Returns
///
/// Mono samples, one per complete frame
///
/// # Example
///
/// ```
/// use stratum_live::preprocessing::channel_mixer::downmix_interleaved;
///
/// let mono = downmix_interleaved(&[1.0, 0.0, 0.5, 0.5], 2);
/// assert_eq!(mono, vec![0.5, 0.5]);
/// ```
pub fn downmix_interleaved(samples: &[f32], channels: usize) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => {
            let scale = 1.0 / n as f32;
            samples
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() * scale)
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downmix_stereo() {
        let interleaved = vec![1.0, -1.0, 0.2, 0.4, 0.8, 0.0];
        let mono = downmix_interleaved(&interleaved, 2);
        assert_eq!(mono.len(), 3);
        assert!((mono[0] - 0.0).abs() < 1e-6);
        assert!((mono[1] - 0.3).abs() < 1e-6);
        assert!((mono[2] - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_downmix_ignores_partial_frame() {
        let interleaved = vec![0.3, 0.3, 0.3, 0.9, 0.9];
        let mono = downmix_interleaved(&interleaved, 3);
        assert_eq!(mono.len(), 1);
        assert!((mono[0] - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_downmix_mono_passthrough() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(downmix_interleaved(&samples, 1), samples);
        assert!(downmix_interleaved(&samples, 0).is_empty());
    }
}
