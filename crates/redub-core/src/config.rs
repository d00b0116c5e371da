//! Composition settings.

use serde::{Deserialize, Serialize};

use crate::{RedubError, Result};

/// Settings for one composition run.
///
/// Passed explicitly to the compositor constructor so concurrent runs can
/// use different settings without interference; there are no process-wide
/// mutable defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixConfig {
    /// Background volume fraction (0.0 to 1.0). The original program audio
    /// is attenuated by `(1.0 - background_volume) * 60` dB before dubbed
    /// speech is overlaid on top.
    pub background_volume: f32,
    /// Reference loudness for foreground speech, in dBFS.
    pub target_dbfs: f32,
    /// Duration-mismatch tolerance band. A clip whose duration is within
    /// this fraction of its target window is overlaid without stretching.
    pub stretch_tolerance: f64,
    /// Sample rate used when extracting program audio, in Hz.
    pub sample_rate: u32,
}

impl Default for MixConfig {
    fn default() -> Self {
        Self {
            background_volume: 0.25,
            target_dbfs: -16.0,
            stretch_tolerance: 0.10,
            sample_rate: 16_000,
        }
    }
}

impl MixConfig {
    /// Validate the settings.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.background_volume) {
            return Err(RedubError::Config(format!(
                "background_volume must be in [0, 1], got {}",
                self.background_volume
            )));
        }
        if self.target_dbfs > 0.0 {
            return Err(RedubError::Config(format!(
                "target_dbfs must be at or below full scale, got {}",
                self.target_dbfs
            )));
        }
        if !(0.0..1.0).contains(&self.stretch_tolerance) {
            return Err(RedubError::Config(format!(
                "stretch_tolerance must be in [0, 1), got {}",
                self.stretch_tolerance
            )));
        }
        if self.sample_rate == 0 {
            return Err(RedubError::Config("sample_rate must be nonzero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(MixConfig::default().validate().is_ok());
    }

    #[test]
    fn test_volume_out_of_range_rejected() {
        let cfg = MixConfig {
            background_volume: 1.5,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_positive_target_rejected() {
        let cfg = MixConfig {
            target_dbfs: 3.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
