//! Redub Compose - the timed audio compositor
//!
//! Takes the segment timeline, the per-segment synthesized clips and the
//! original program audio, and produces one continuous track: clips
//! time-aligned to their windows, stretched to fit where needed,
//! normalized against the attenuated background bed.

pub mod compositor;
pub mod report;

pub use compositor::Compositor;
pub use report::{CompositionReport, SegmentOutcome, SkipReason};
