//! Background track construction.
//!
//! The original program audio stays underneath the dubbed dialogue as a
//! continuous bed. The volume knob is a fraction in [0, 1] calibrated
//! against a 0-60 dB reduction range: `reduction_db = (1 - volume) * 60`.
//! At 1.0 the bed passes through untouched; at 0.0 it sits 60 dB down.

use redub_core::{RedubError, Result};
use tracing::info;

use crate::buffer::AudioBuffer;

/// Full attenuation applied when the volume fraction is zero, in dB.
pub const MAX_REDUCTION_DB: f32 = 60.0;

/// Builds the attenuated program-audio bed for a composition run.
#[derive(Debug, Clone)]
pub struct BackgroundBuilder {
    volume: f32,
}

impl BackgroundBuilder {
    /// Create a builder for the given volume fraction.
    pub fn new(volume: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&volume) {
            return Err(RedubError::Config(format!(
                "background volume must be in [0, 1], got {volume}"
            )));
        }
        Ok(Self { volume })
    }

    /// The decibel reduction this builder applies.
    pub fn reduction_db(&self) -> f32 {
        (1.0 - self.volume) * MAX_REDUCTION_DB
    }

    /// Derive the bed: a gain-reduced copy of `source`, silence-padded to
    /// at least `min_duration_secs`. Timing is never altered.
    pub fn build(&self, source: &AudioBuffer, min_duration_secs: f64) -> AudioBuffer {
        let reduction = self.reduction_db();
        let mut bed = source.gain(-reduction);
        let min_frames = (min_duration_secs * source.sample_rate() as f64).round() as usize;
        bed.pad_to(min_frames);
        info!(
            volume = self.volume,
            reduction_db = reduction,
            duration_secs = bed.duration_secs(),
            "background bed built"
        );
        bed
    }
}
