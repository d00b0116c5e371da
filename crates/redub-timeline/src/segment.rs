//! Segment types for the dubbing timeline.

use std::path::{Path, PathBuf};

use redub_core::{RedubError, Result};
use serde::{Deserialize, Serialize};

use crate::prosody::Emotion;

/// Reference to a segment's synthesized clip.
///
/// Synthesis can fail upstream; a segment without audio stays in the
/// timeline (keeping indices stable) and is skipped by the compositor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthAudio {
    Missing,
    Ready(PathBuf),
}

impl SynthAudio {
    /// Wrap an optional path, mapping `None` and empty paths to `Missing`.
    pub fn from_path(path: Option<PathBuf>) -> Self {
        match path {
            Some(p) if !p.as_os_str().is_empty() => SynthAudio::Ready(p),
            _ => SynthAudio::Missing,
        }
    }

    /// True when a clip reference is present.
    pub fn is_ready(&self) -> bool {
        matches!(self, SynthAudio::Ready(_))
    }

    /// The clip path, if present.
    pub fn path(&self) -> Option<&Path> {
        match self {
            SynthAudio::Ready(p) => Some(p),
            SynthAudio::Missing => None,
        }
    }
}

/// Detected gender of the original speaker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    #[default]
    Female,
}

/// Voice characteristics detected by upstream analysis.
///
/// Consumed by synthesis when choosing a voice; the compositor carries it
/// for traceability only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VoiceProfile {
    pub gender: Gender,
    pub emotion: Emotion,
}

/// A timestamped unit of dialogue on the master timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    /// Ordinal position, zero-based, stable across the run.
    pub index: usize,
    /// Window start on the master timeline, in seconds.
    pub start: f64,
    /// Window end on the master timeline, in seconds.
    pub end: f64,
    /// Original transcript text.
    pub source_text: String,
    /// Translated text fed to synthesis.
    pub target_text: String,
    /// Speaking-rate adjustment suggested upstream, signed percent.
    pub rate_hint: Option<f32>,
    /// Detected voice characteristics.
    pub voice: VoiceProfile,
    /// The synthesized clip, when synthesis succeeded.
    pub audio: SynthAudio,
}

impl Segment {
    /// Length of the target window in seconds.
    pub fn window_secs(&self) -> f64 {
        self.end - self.start
    }

    /// Check the timing invariant `0 <= start < end`.
    pub fn validate(&self) -> Result<()> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(RedubError::Timeline(format!(
                "segment {}: non-finite timing {}..{}",
                self.index, self.start, self.end
            )));
        }
        if self.start < 0.0 || self.start >= self.end {
            return Err(RedubError::Timeline(format!(
                "segment {}: invalid window {}..{}",
                self.index, self.start, self.end
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(start: f64, end: f64) -> Segment {
        Segment {
            index: 0,
            start,
            end,
            source_text: String::new(),
            target_text: String::new(),
            rate_hint: None,
            voice: VoiceProfile::default(),
            audio: SynthAudio::Missing,
        }
    }

    #[test]
    fn test_valid_window() {
        assert!(segment(0.0, 2.0).validate().is_ok());
        assert!((segment(1.0, 3.5).window_secs() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_inverted_window_rejected() {
        assert!(segment(2.0, 1.0).validate().is_err());
        assert!(segment(2.0, 2.0).validate().is_err());
        assert!(segment(-1.0, 2.0).validate().is_err());
    }

    #[test]
    fn test_synth_audio_from_path() {
        assert!(!SynthAudio::from_path(None).is_ready());
        assert!(!SynthAudio::from_path(Some(PathBuf::new())).is_ready());
        let ready = SynthAudio::from_path(Some(PathBuf::from("clips/0001.wav")));
        assert_eq!(ready.path(), Some(Path::new("clips/0001.wav")));
    }
}
