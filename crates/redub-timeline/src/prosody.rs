//! Emotion-to-prosody lookup.
//!
//! Upstream voice analysis tags each segment with one of four emotion
//! labels; the synthesis stage turns a label into rate and pitch deltas.
//! The mapping is a fixed table kept as a pure function, so it can be
//! consulted (and tested) without touching any synthesis machinery.

use serde::{Deserialize, Serialize};

/// Emotion label detected from the original speaker's delivery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    #[default]
    Neutral,
    Excited,
    Calm,
    Urgent,
}

/// Rate and pitch adjustments for a synthesized voice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProsodyHints {
    /// Speaking-rate delta as a signed percentage.
    pub rate_delta_pct: f32,
    /// Pitch delta in Hz.
    pub pitch_delta_hz: f32,
}

impl Emotion {
    /// The rate/pitch deltas synthesis applies for this emotion.
    pub fn hints(self) -> ProsodyHints {
        match self {
            Emotion::Neutral => ProsodyHints {
                rate_delta_pct: 0.0,
                pitch_delta_hz: 0.0,
            },
            Emotion::Excited => ProsodyHints {
                rate_delta_pct: 15.0,
                pitch_delta_hz: 8.0,
            },
            Emotion::Calm => ProsodyHints {
                rate_delta_pct: -10.0,
                pitch_delta_hz: -5.0,
            },
            Emotion::Urgent => ProsodyHints {
                rate_delta_pct: 20.0,
                pitch_delta_hz: 3.0,
            },
        }
    }
}

/// Parse a rate-adjust annotation like `"+15%"` or `"-10%"`.
///
/// Returns `None` for anything that does not parse as a signed percentage.
pub fn parse_rate_adjust(s: &str) -> Option<f32> {
    s.trim().trim_end_matches('%').parse::<f32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_is_identity() {
        let hints = Emotion::Neutral.hints();
        assert_eq!(hints.rate_delta_pct, 0.0);
        assert_eq!(hints.pitch_delta_hz, 0.0);
    }

    #[test]
    fn test_excited_raises_rate_and_pitch() {
        let hints = Emotion::Excited.hints();
        assert!(hints.rate_delta_pct > 0.0);
        assert!(hints.pitch_delta_hz > 0.0);
    }

    #[test]
    fn test_calm_lowers_both() {
        let hints = Emotion::Calm.hints();
        assert!(hints.rate_delta_pct < 0.0);
        assert!(hints.pitch_delta_hz < 0.0);
    }

    #[test]
    fn test_emotion_deserializes_lowercase() {
        let e: Emotion = serde_json::from_str("\"urgent\"").unwrap();
        assert_eq!(e, Emotion::Urgent);
    }

    #[test]
    fn test_parse_rate_adjust() {
        assert_eq!(parse_rate_adjust("+15%"), Some(15.0));
        assert_eq!(parse_rate_adjust("-10%"), Some(-10.0));
        assert_eq!(parse_rate_adjust("0%"), Some(0.0));
        assert_eq!(parse_rate_adjust("fast"), None);
    }
}
