//! Duration matching for synthesized clips.
//!
//! A clip's duration is changed by resampling its sample stream and
//! restating the result at the nominal rate — the same trick as reading a
//! tape at a different speed. Pitch moves with the stretch factor, which is
//! perceptually small for the ratios dubbing produces (about 0.8 to 1.3);
//! outside that the quality falls off, so the applied ratio is clamped.
//! Phase-vocoder quality is not attempted.

use redub_core::Result;
use tracing::debug;

use crate::buffer::AudioBuffer;
use crate::resample;

/// Lowest stretch ratio applied before clamping.
pub const MIN_RATIO: f64 = 0.5;
/// Highest stretch ratio applied before clamping.
pub const MAX_RATIO: f64 = 2.0;

/// Stretches clips to fit their timeline windows.
///
/// A clip within `tolerance` of its target duration is passed through
/// untouched; correcting tiny mismatches costs more in resampling
/// artifacts than it buys in alignment.
#[derive(Debug, Clone)]
pub struct Stretcher {
    tolerance: f64,
}

impl Stretcher {
    /// Create a stretcher with the given tolerance band (e.g. 0.10 for ±10%).
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// The configured tolerance band.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Change a clip's duration by `ratio` (actual / desired duration).
    ///
    /// A ratio above 1 speeds the clip up (shorter output); below 1 slows
    /// it down. The nominal sample rate of the result is unchanged.
    pub fn stretch(&self, clip: &AudioBuffer, ratio: f64) -> Result<AudioBuffer> {
        let clamped = ratio.clamp(MIN_RATIO, MAX_RATIO);
        if clamped != ratio {
            debug!(ratio, clamped, "stretch ratio clamped");
        }
        let samples = resample::resample_frames(clip.samples(), clip.channels(), 1.0 / clamped)?;
        Ok(AudioBuffer::new(samples, clip.sample_rate(), clip.channels()))
    }

    /// Fit `clip` to a window of `target_secs`, honoring the tolerance band.
    ///
    /// Returns the (possibly stretched) clip and whether a stretch was
    /// actually applied.
    pub fn match_window(&self, clip: AudioBuffer, target_secs: f64) -> Result<(AudioBuffer, bool)> {
        let actual = clip.duration_secs();
        if actual <= 0.0 || target_secs <= 0.0 {
            return Ok((clip, false));
        }
        let ratio = actual / target_secs;
        if (ratio - 1.0).abs() <= self.tolerance {
            return Ok((clip, false));
        }
        let stretched = self.stretch(&clip, ratio)?;
        debug!(
            actual,
            target_secs,
            ratio,
            result = stretched.duration_secs(),
            "clip stretched to window"
        );
        Ok((stretched, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(duration_secs: f64, sample_rate: u32) -> AudioBuffer {
        let frames = (duration_secs * sample_rate as f64).round() as usize;
        let samples = (0..frames)
            .map(|i| (i as f32 / sample_rate as f32 * 440.0 * std::f32::consts::TAU).sin() * 0.5)
            .collect();
        AudioBuffer::new(samples, sample_rate, 1)
    }

    #[test]
    fn test_within_tolerance_untouched() {
        let stretcher = Stretcher::new(0.10);
        // 1.05s clip into a 1.0s window: ratio 1.05, inside ±10%.
        let clip = tone(1.05, 16_000);
        let frames_before = clip.frames();
        let (out, stretched) = stretcher.match_window(clip, 1.0).unwrap();
        assert!(!stretched);
        assert_eq!(out.frames(), frames_before);
    }

    #[test]
    fn test_long_clip_shortened() {
        let stretcher = Stretcher::new(0.10);
        // 1.5s clip into a 1.0s window: ratio 1.5 → sped up to ~1.0s.
        let clip = tone(1.5, 16_000);
        let (out, stretched) = stretcher.match_window(clip, 1.0).unwrap();
        assert!(stretched);
        assert!((out.duration_secs() - 1.0).abs() < 0.01);
        assert_eq!(out.sample_rate(), 16_000);
    }

    #[test]
    fn test_short_clip_lengthened() {
        let stretcher = Stretcher::new(0.10);
        // 0.3s clip into a 0.5s window: ratio 0.6 → slowed to ~0.5s.
        let clip = tone(0.3, 16_000);
        let (out, stretched) = stretcher.match_window(clip, 0.5).unwrap();
        assert!(stretched);
        assert!((out.duration_secs() - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_extreme_ratio_clamped() {
        let stretcher = Stretcher::new(0.10);
        // 4s into 1s would be ratio 4; clamped to 2 → ~2s output.
        let clip = tone(4.0, 16_000);
        let (out, stretched) = stretcher.match_window(clip, 1.0).unwrap();
        assert!(stretched);
        assert!((out.duration_secs() - 2.0).abs() < 0.02);
    }

    #[test]
    fn test_round_trip_duration() {
        let stretcher = Stretcher::new(0.10);
        let clip = tone(1.0, 16_000);
        let once = stretcher.stretch(&clip, 1.25).unwrap();
        let back = stretcher.stretch(&once, 1.0 / 1.25).unwrap();
        // Duration survives a there-and-back stretch within one frame of
        // rounding slack per pass.
        let diff = (back.frames() as i64 - clip.frames() as i64).abs();
        assert!(diff <= 2, "round trip drifted by {diff} frames");
    }
}
