//! The timed audio compositor.
//!
//! One run: derive the background bed from the program audio, then for
//! each segment load its clip, match its duration to the segment window,
//! match its level to the foreground reference, and overlay it onto the
//! shared timeline buffer at the segment's start offset.
//!
//! A bad clip never aborts the run — failures in per-segment steps mark
//! that segment skipped and processing continues. Only a missing source
//! track or a failed export is fatal.

use std::path::Path;

use rayon::prelude::*;
use redub_audio::{normalize_to, AudioBuffer, BackgroundBuilder, Stretcher};
use redub_core::{MixConfig, RedubError, Result};
use redub_media::decode_audio_file;
use redub_timeline::{Segment, SegmentTimeline};
use tracing::{debug, info, warn};

use crate::report::{CompositionReport, SegmentOutcome, SkipReason};

/// Composites synthesized segment clips over the background bed.
///
/// Holds only configuration; every `compose` call creates and exclusively
/// owns its timeline buffer, so one `Compositor` can serve concurrent runs
/// over different inputs.
#[derive(Debug, Clone)]
pub struct Compositor {
    config: MixConfig,
    stretcher: Stretcher,
    background: BackgroundBuilder,
}

impl Compositor {
    /// Create a compositor with validated settings.
    pub fn new(config: MixConfig) -> Result<Self> {
        config.validate()?;
        let background = BackgroundBuilder::new(config.background_volume)?;
        let stretcher = Stretcher::new(config.stretch_tolerance);
        Ok(Self {
            config,
            stretcher,
            background,
        })
    }

    /// The settings this compositor runs with.
    pub fn config(&self) -> &MixConfig {
        &self.config
    }

    /// Compose the full track in memory.
    ///
    /// `source` is the original program audio; the output inherits its
    /// sample rate and channel count, and is never shorter than either the
    /// source or the last segment window.
    pub fn compose(
        &self,
        timeline: &SegmentTimeline,
        source: &AudioBuffer,
    ) -> Result<(AudioBuffer, CompositionReport)> {
        let mut track = self.background.build(source, timeline.end_secs());
        let sample_rate = track.sample_rate();
        let channels = track.channels();

        // Load/stretch/normalize touch only per-segment buffers, so they
        // run in parallel. Overlays mutate the one shared track and are
        // applied serially in index order below.
        let prepared: Vec<(SegmentOutcome, Option<AudioBuffer>)> = timeline
            .segments()
            .par_iter()
            .map(|seg| self.prepare(seg, sample_rate, channels))
            .collect();

        let mut outcomes = Vec::with_capacity(prepared.len());
        for (seg, (outcome, clip)) in timeline.segments().iter().zip(prepared) {
            if let Some(clip) = clip {
                let at_frame = (seg.start * sample_rate as f64).round() as usize;
                track.overlay(&clip, at_frame)?;
            }
            outcomes.push(outcome);
        }

        let report = CompositionReport::new(outcomes, track.duration_secs());
        info!("{}", report.summary());
        Ok((track, report))
    }

    /// Compose and export as WAV. An unwritable destination is fatal.
    pub fn compose_to_file(
        &self,
        timeline: &SegmentTimeline,
        source: &AudioBuffer,
        out_wav: &Path,
    ) -> Result<CompositionReport> {
        let (track, report) = self.compose(timeline, source)?;
        track.export_wav(out_wav)?;
        info!(out = %out_wav.display(), "composited track exported");
        Ok(report)
    }

    /// Load, conform, duration-match and level-match one segment's clip.
    /// Returns the outcome plus the ready-to-overlay clip (None for skips).
    fn prepare(
        &self,
        seg: &Segment,
        sample_rate: u32,
        channels: u16,
    ) -> (SegmentOutcome, Option<AudioBuffer>) {
        let Some(path) = seg.audio.path() else {
            debug!(segment = seg.index, "no synthesized clip, skipping");
            return (
                SegmentOutcome::Skipped {
                    reason: SkipReason::NoAudio,
                },
                None,
            );
        };

        let clip = match decode_audio_file(path) {
            Ok(clip) => clip,
            Err(e) => {
                warn!(segment = seg.index, error = %e, "clip decode failed, skipping");
                return (
                    SegmentOutcome::Skipped {
                        reason: SkipReason::DecodeFailed(e.to_string()),
                    },
                    None,
                );
            }
        };

        // Conform to the track format first so all frame arithmetic below
        // happens at the output rate.
        let clip = match clip.resampled_to(sample_rate) {
            Ok(clip) => clip.with_channels(channels),
            Err(e) => {
                warn!(segment = seg.index, error = %e, "clip resample failed, skipping");
                return (
                    SegmentOutcome::Skipped {
                        reason: SkipReason::PrepareFailed(e.to_string()),
                    },
                    None,
                );
            }
        };

        let (clip, stretched) = match self.stretcher.match_window(clip, seg.window_secs()) {
            Ok(result) => result,
            Err(e) => {
                warn!(segment = seg.index, error = %e, "stretch failed, skipping");
                return (
                    SegmentOutcome::Skipped {
                        reason: SkipReason::PrepareFailed(e.to_string()),
                    },
                    None,
                );
            }
        };

        let (clip, normalized) = match normalize_to(&clip, self.config.target_dbfs) {
            Ok(normalized) => (normalized, true),
            Err(RedubError::DegenerateSignal(_)) => {
                // Too quiet to measure; overlay as-is rather than discard.
                debug!(segment = seg.index, "near-silent clip left unnormalized");
                (clip, false)
            }
            Err(e) => {
                warn!(segment = seg.index, error = %e, "normalize failed, skipping");
                return (
                    SegmentOutcome::Skipped {
                        reason: SkipReason::PrepareFailed(e.to_string()),
                    },
                    None,
                );
            }
        };

        (
            SegmentOutcome::Overlaid {
                stretched,
                normalized,
            },
            Some(clip),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redub_timeline::{SynthAudio, VoiceProfile};
    use std::path::PathBuf;

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("redub-compose-tests").join(name);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn tone(duration_secs: f64, amplitude: f32) -> AudioBuffer {
        let rate = 16_000u32;
        let frames = (duration_secs * rate as f64).round() as usize;
        let samples = (0..frames)
            .map(|i| (i as f32 / rate as f32 * 220.0 * std::f32::consts::TAU).sin() * amplitude)
            .collect();
        AudioBuffer::new(samples, rate, 1)
    }

    fn segment(index: usize, start: f64, end: f64, audio: SynthAudio) -> Segment {
        Segment {
            index,
            start,
            end,
            source_text: String::new(),
            target_text: String::new(),
            rate_hint: None,
            voice: VoiceProfile::default(),
            audio,
        }
    }

    #[test]
    fn test_zero_segments_yields_bed_only() {
        let compositor = Compositor::new(MixConfig::default()).unwrap();
        let source = tone(3.0, 0.5);
        let timeline = SegmentTimeline::new(Vec::new()).unwrap();

        let (track, report) = compositor.compose(&timeline, &source).unwrap();
        assert_eq!(report.total(), 0);
        assert_eq!(track.frames(), source.frames());

        // The bed is the source attenuated by (1 - 0.25) * 60 = 45 dB.
        let expected = source.gain(-45.0);
        for (a, b) in expected.samples().iter().zip(track.samples()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_missing_audio_skipped_without_abort() {
        let dir = test_dir("missing-audio");
        let clip_path = dir.join("clip0.wav");
        tone(1.0, 0.4).export_wav(&clip_path).unwrap();

        let timeline = SegmentTimeline::new(vec![
            segment(0, 0.0, 1.0, SynthAudio::Ready(clip_path)),
            segment(1, 1.0, 2.0, SynthAudio::Missing),
            segment(2, 2.0, 3.0, SynthAudio::Ready(dir.join("does-not-exist.wav"))),
        ])
        .unwrap();

        let compositor = Compositor::new(MixConfig::default()).unwrap();
        let source = tone(4.0, 0.3);
        let (_, report) = compositor.compose(&timeline, &source).unwrap();

        assert_eq!(report.total(), 3);
        assert_eq!(report.overlaid(), 1);
        assert_eq!(report.skipped(), 2);
        assert!(matches!(
            report.outcomes[1],
            SegmentOutcome::Skipped {
                reason: SkipReason::NoAudio
            }
        ));
        assert!(matches!(
            report.outcomes[2],
            SegmentOutcome::Skipped {
                reason: SkipReason::DecodeFailed(_)
            }
        ));
    }

    #[test]
    fn test_track_extends_to_last_segment() {
        let timeline =
            SegmentTimeline::new(vec![segment(0, 8.0, 12.0, SynthAudio::Missing)]).unwrap();
        let compositor = Compositor::new(MixConfig::default()).unwrap();
        let source = tone(5.0, 0.3);
        let (track, _) = compositor.compose(&timeline, &source).unwrap();
        assert!((track.duration_secs() - 12.0).abs() < 1e-3);
    }

    #[test]
    fn test_within_tolerance_clip_not_stretched() {
        let dir = test_dir("no-stretch");
        let clip_path = dir.join("exact.wav");
        tone(2.0, 0.4).export_wav(&clip_path).unwrap();

        let timeline =
            SegmentTimeline::new(vec![segment(0, 0.0, 2.0, SynthAudio::Ready(clip_path))])
                .unwrap();
        let compositor = Compositor::new(MixConfig::default()).unwrap();
        let source = tone(3.0, 0.3);
        let (_, report) = compositor.compose(&timeline, &source).unwrap();

        assert_eq!(report.overlaid(), 1);
        assert_eq!(report.stretched(), 0);
    }

    #[test]
    fn test_silent_clip_overlaid_unnormalized() {
        let dir = test_dir("silent-clip");
        let clip_path = dir.join("silent.wav");
        AudioBuffer::silence(1.0, 16_000, 1)
            .export_wav(&clip_path)
            .unwrap();

        let timeline =
            SegmentTimeline::new(vec![segment(0, 0.0, 1.0, SynthAudio::Ready(clip_path))])
                .unwrap();
        let compositor = Compositor::new(MixConfig::default()).unwrap();
        let source = tone(2.0, 0.3);
        let (_, report) = compositor.compose(&timeline, &source).unwrap();

        assert!(matches!(
            report.outcomes[0],
            SegmentOutcome::Overlaid {
                normalized: false,
                ..
            }
        ));
    }

    #[test]
    fn test_overlapping_segments_sum() {
        let dir = test_dir("overlap");
        let clip_a = dir.join("a.wav");
        let clip_b = dir.join("b.wav");
        // Constant-valued clips make the summed region easy to verify.
        AudioBuffer::new(vec![0.1; 16_000], 16_000, 1)
            .export_wav(&clip_a)
            .unwrap();
        AudioBuffer::new(vec![0.1; 16_000], 16_000, 1)
            .export_wav(&clip_b)
            .unwrap();

        let timeline = SegmentTimeline::new(vec![
            segment(0, 0.0, 1.0, SynthAudio::Ready(clip_a)),
            segment(1, 0.5, 1.5, SynthAudio::Ready(clip_b)),
        ])
        .unwrap();

        // Volume 1.0 keeps the bed at unity; silence source keeps the bed
        // contribution at zero so only the clips remain.
        let config = MixConfig {
            background_volume: 1.0,
            ..Default::default()
        };
        let compositor = Compositor::new(config).unwrap();
        let source = AudioBuffer::silence(2.0, 16_000, 1);
        let (track, report) = compositor.compose(&timeline, &source).unwrap();
        assert_eq!(report.overlaid(), 2);

        // Both clips normalize to the same -16 dBFS constant level; in the
        // overlapped half-second the samples are exactly twice one clip's.
        let lone = track.samples()[16_000 / 4];
        let summed = track.samples()[16_000 * 3 / 4];
        assert!((summed - 2.0 * lone).abs() < 1e-3);
    }
}
