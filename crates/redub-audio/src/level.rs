//! Loudness normalization.
//!
//! Clips synthesized by different voices arrive at wildly different levels.
//! Normalization measures a clip's mean-square level in dBFS and applies
//! the gain that brings it to the reference level, so dialogue sits
//! consistently above the background bed.

use redub_core::{RedubError, Result};

use crate::buffer::AudioBuffer;

/// Below this measured level a clip is treated as having no usable signal.
/// Normalizing it would amplify noise to clipping.
pub const SILENCE_FLOOR_DBFS: f32 = -80.0;

/// Rescale `clip` so its mean-square level matches `target_dbfs`.
///
/// Near-silent input fails with `DegenerateSignal`; callers keep the
/// unnormalized clip in that case rather than discarding it.
pub fn normalize_to(clip: &AudioBuffer, target_dbfs: f32) -> Result<AudioBuffer> {
    let current = clip.rms_dbfs();
    if !current.is_finite() || current < SILENCE_FLOOR_DBFS {
        return Err(RedubError::DegenerateSignal(format!(
            "measured level {current} dBFS is below the {SILENCE_FLOOR_DBFS} dBFS floor"
        )));
    }
    Ok(clip.gain(target_dbfs - current))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_raises_quiet_clip() {
        let clip = AudioBuffer::new(vec![0.01; 1000], 16_000, 1);
        let out = normalize_to(&clip, -16.0).unwrap();
        assert!((out.rms_dbfs() - -16.0).abs() < 0.1);
    }

    #[test]
    fn test_normalize_lowers_hot_clip() {
        let clip = AudioBuffer::new(vec![0.9; 1000], 16_000, 1);
        let out = normalize_to(&clip, -16.0).unwrap();
        assert!((out.rms_dbfs() - -16.0).abs() < 0.1);
    }

    #[test]
    fn test_at_target_is_noop() {
        let clip = AudioBuffer::new(vec![0.2; 1000], 16_000, 1);
        let normalized = normalize_to(&clip, clip.rms_dbfs()).unwrap();
        for (a, b) in clip.samples().iter().zip(normalized.samples()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_silence_rejected() {
        let clip = AudioBuffer::silence(1.0, 16_000, 1);
        let err = normalize_to(&clip, -16.0).unwrap_err();
        assert!(matches!(err, RedubError::DegenerateSignal(_)));
    }

    #[test]
    fn test_near_silence_rejected() {
        let clip = AudioBuffer::new(vec![1e-6; 1000], 16_000, 1);
        assert!(normalize_to(&clip, -16.0).is_err());
    }
}
