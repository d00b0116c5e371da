//! Redub Timeline - Segment data model
//!
//! The ordered collection of timed dialogue segments the compositor
//! consumes: timing windows, translated text, synthesized-clip references,
//! and the per-segment voice metadata produced by upstream analysis.

pub mod prosody;
pub mod segment;
pub mod timeline;

pub use prosody::{Emotion, ProsodyHints};
pub use segment::{Gender, Segment, SynthAudio, VoiceProfile};
pub use timeline::SegmentTimeline;
