//! End-to-end composition scenarios.
//!
//! Exercises the full pipeline across redub-timeline, redub-audio,
//! redub-media and redub-compose: side-table in, WAV out.

use std::path::PathBuf;

use redub_audio::AudioBuffer;
use redub_compose::{Compositor, SegmentOutcome};
use redub_core::MixConfig;
use redub_timeline::{Segment, SegmentTimeline, SynthAudio, VoiceProfile};

fn test_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("redub-int-compose").join(name);
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

fn segment(start: f64, end: f64, audio: SynthAudio) -> Segment {
    Segment {
        index: 0,
        start,
        end,
        source_text: String::new(),
        target_text: String::new(),
        rate_hint: None,
        voice: VoiceProfile::default(),
        audio,
    }
}

/// Max absolute difference between two tracks over a frame range.
fn max_diff(a: &AudioBuffer, b: &AudioBuffer, start: usize, end: usize) -> f32 {
    a.slice(start, end)
        .unwrap()
        .samples()
        .iter()
        .zip(b.slice(start, end).unwrap().samples())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f32::max)
}

#[test]
fn ten_second_scenario() {
    let dir = test_dir("scenario");
    let clip_ok = dir.join("clip_ok.wav");
    let clip_short = dir.join("clip_short.wav");
    tone(2.0, 0.4).export_wav(&clip_ok).unwrap();
    tone(0.3, 0.4).export_wav(&clip_short).unwrap();

    let timeline = SegmentTimeline::new(vec![
        segment(0.0, 2.0, SynthAudio::Ready(clip_ok)),
        segment(2.0, 4.0, SynthAudio::Missing),
        segment(4.0, 4.5, SynthAudio::Ready(clip_short)),
    ])
    .unwrap();

    let source = tone(10.0, 0.3);
    let compositor = Compositor::new(MixConfig::default()).unwrap();
    let (track, report) = compositor.compose(&timeline, &source).unwrap();

    // Output spans the full 10-second source.
    assert!((track.duration_secs() - 10.0).abs() < 1e-3);

    assert_eq!(report.total(), 3);
    assert_eq!(report.overlaid(), 2);
    assert_eq!(report.skipped(), 1);

    // The 2s clip fits its window exactly; the 0.3s clip is 40% short of
    // its 0.5s window and gets stretched.
    assert!(matches!(
        report.outcomes[0],
        SegmentOutcome::Overlaid {
            stretched: false,
            ..
        }
    ));
    assert!(matches!(
        report.outcomes[2],
        SegmentOutcome::Overlaid { stretched: true, .. }
    ));

    // Where nothing was overlaid, the track is exactly the attenuated bed:
    // default volume 0.25 -> 45 dB reduction.
    let bed = source.gain(-45.0);
    let rate = 16_000usize;
    assert!(max_diff(&track, &bed, 2 * rate + 100, 4 * rate - 100) < 1e-5);

    // The stretched clip covers ~0.5s from 4.0s: signal above the bed
    // until ~4.5s, bed-only after.
    assert!(max_diff(&track, &bed, 4 * rate, 4 * rate + 7_800) > 1e-3);
    assert!(max_diff(&track, &bed, 4 * rate + 8_100, 5 * rate) < 1e-5);
}

#[test]
fn zero_segments_exports_the_bed() {
    let dir = test_dir("empty");
    let out = dir.join("out.wav");

    let source = tone(3.0, 0.5);
    let timeline = SegmentTimeline::new(Vec::new()).unwrap();
    let compositor = Compositor::new(MixConfig::default()).unwrap();
    let report = compositor.compose_to_file(&timeline, &source, &out).unwrap();

    assert_eq!(report.total(), 0);
    assert!((report.output_duration_secs - 3.0).abs() < 1e-3);

    let exported = AudioBuffer::from_wav_file(&out).unwrap();
    assert_eq!(exported.frames(), source.frames());
    let bed = source.gain(-45.0);
    // 16-bit quantization is the only difference left.
    for (a, b) in bed.samples().iter().zip(exported.samples()) {
        assert!((a - b).abs() < 1e-3);
    }
    std::fs::remove_file(&out).ok();
}

#[test]
fn input_order_does_not_change_the_output() {
    let dir = test_dir("order");
    let clip_a = dir.join("a.wav");
    let clip_b = dir.join("b.wav");
    let clip_c = dir.join("c.wav");
    tone(1.0, 0.3).export_wav(&clip_a).unwrap();
    tone(1.0, 0.5).export_wav(&clip_b).unwrap();
    tone(1.0, 0.7).export_wav(&clip_c).unwrap();

    let windows = [(0.0, 1.0, &clip_a), (2.0, 3.0, &clip_b), (4.0, 5.0, &clip_c)];
    let source = tone(6.0, 0.3);
    let compositor = Compositor::new(MixConfig::default()).unwrap();

    let sorted: Vec<Segment> = windows
        .iter()
        .map(|(s, e, p)| segment(*s, *e, SynthAudio::Ready((*p).clone())))
        .collect();
    let shuffled: Vec<Segment> = [2usize, 0, 1]
        .iter()
        .map(|&i| {
            let (s, e, p) = windows[i];
            segment(s, e, SynthAudio::Ready(p.clone()))
        })
        .collect();

    let (track_a, _) = compositor
        .compose(&SegmentTimeline::new(sorted).unwrap(), &source)
        .unwrap();
    let (track_b, _) = compositor
        .compose(&SegmentTimeline::new(shuffled).unwrap(), &source)
        .unwrap();

    assert_eq!(track_a.samples(), track_b.samples());
}

#[test]
fn export_to_unwritable_destination_fails() {
    let source = tone(1.0, 0.5);
    let timeline = SegmentTimeline::new(Vec::new()).unwrap();
    let compositor = Compositor::new(MixConfig::default()).unwrap();

    let result = compositor.compose_to_file(
        &timeline,
        &source,
        std::path::Path::new("/proc/redub-cannot-write-here/out.wav"),
    );
    assert!(result.is_err());
}

#[test]
fn side_table_to_wav_pipeline() {
    let dir = test_dir("side-table");
    let clip = dir.join("0000.wav");
    tone(1.0, 0.4).export_wav(&clip).unwrap();

    let json = format!(
        r#"[
            {{"start": 0.0, "end": 1.0, "text": "hi", "translation": "hallo",
              "audio_path": {:?}, "voice_emotion": "calm", "rate_adjust": "-10%"}},
            {{"start": 1.0, "end": 2.0, "text": "bye", "translation": "tschuess"}}
        ]"#,
        clip
    );
    let table = dir.join("segments.json");
    std::fs::write(&table, json).unwrap();

    let timeline = SegmentTimeline::load_json_file(&table).unwrap();
    assert_eq!(timeline.len(), 2);
    assert_eq!(timeline.ready_count(), 1);
    assert_eq!(timeline.segments()[0].rate_hint, Some(-10.0));

    let out = dir.join("mix.wav");
    let source = tone(2.0, 0.3);
    let compositor = Compositor::new(MixConfig::default()).unwrap();
    let report = compositor.compose_to_file(&timeline, &source, &out).unwrap();

    assert_eq!(report.overlaid(), 1);
    assert_eq!(report.skipped(), 1);
    assert!(out.exists());
    std::fs::remove_file(&out).ok();
}
