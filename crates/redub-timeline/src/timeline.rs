//! The ordered segment collection and its JSON side-table format.
//!
//! Upstream stages (recognition, translation, synthesis) communicate
//! through a JSON array of per-segment records. Loading turns that ledger
//! into a validated `SegmentTimeline`: records are sorted by start time,
//! indices assigned by position, and missing clip paths collapsed into the
//! `SynthAudio::Missing` variant.

use std::path::{Path, PathBuf};

use redub_core::{RedubError, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::prosody::{parse_rate_adjust, Emotion};
use crate::segment::{Gender, Segment, SynthAudio, VoiceProfile};

/// One side-table record as written by the synthesis stage.
#[derive(Debug, Serialize, Deserialize)]
struct SegmentRecord {
    start: f64,
    end: f64,
    #[serde(default)]
    text: String,
    #[serde(default)]
    translation: String,
    #[serde(default)]
    audio_path: Option<PathBuf>,
    #[serde(default)]
    voice_gender: Option<Gender>,
    #[serde(default)]
    voice_emotion: Option<Emotion>,
    #[serde(default)]
    rate_adjust: Option<String>,
}

/// The ordered collection of timed segments for one composition run.
#[derive(Debug, Clone)]
pub struct SegmentTimeline {
    segments: Vec<Segment>,
}

impl SegmentTimeline {
    /// Build a timeline, sorting by start time and re-assigning indices.
    ///
    /// Overlapping windows are allowed (the compositor resolves them by
    /// additive overlay); inverted or negative windows are not.
    pub fn new(mut segments: Vec<Segment>) -> Result<Self> {
        segments.sort_by(|a, b| a.start.total_cmp(&b.start));
        for (index, seg) in segments.iter_mut().enumerate() {
            seg.index = index;
            seg.validate()?;
        }
        Ok(Self { segments })
    }

    /// Load a timeline from a JSON side-table file.
    pub fn load_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let records: Vec<SegmentRecord> = serde_json::from_slice(&data)
            .map_err(|e| RedubError::Timeline(format!("{}: {}", path.display(), e)))?;

        let segments = records
            .into_iter()
            .map(|rec| Segment {
                index: 0,
                start: rec.start,
                end: rec.end,
                source_text: rec.text,
                target_text: rec.translation,
                rate_hint: rec.rate_adjust.as_deref().and_then(parse_rate_adjust),
                voice: VoiceProfile {
                    gender: rec.voice_gender.unwrap_or_default(),
                    emotion: rec.voice_emotion.unwrap_or_default(),
                },
                audio: SynthAudio::from_path(rec.audio_path),
            })
            .collect();

        let timeline = Self::new(segments)?;
        info!(
            path = %path.display(),
            segments = timeline.len(),
            with_audio = timeline.ready_count(),
            "segment timeline loaded"
        );
        Ok(timeline)
    }

    /// The segments in ascending index order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True when the timeline holds no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments that have a synthesized clip.
    pub fn ready_count(&self) -> usize {
        self.segments.iter().filter(|s| s.audio.is_ready()).count()
    }

    /// End of the last window in seconds; zero for an empty timeline.
    ///
    /// The composited track is never shorter than this.
    pub fn end_secs(&self) -> f64 {
        self.segments.iter().map(|s| s.end).fold(0.0, f64::max)
    }
}
