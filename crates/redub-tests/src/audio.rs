//! Integration tests for the audio subsystem.

use redub_audio::{normalize_to, AudioBuffer, BackgroundBuilder, Stretcher};

fn tone(duration_secs: f64, amplitude: f32) -> AudioBuffer {
    let rate = 16_000u32;
    let frames = (duration_secs * rate as f64).round() as usize;
    let samples = (0..frames)
        .map(|i| (i as f32 / rate as f32 * 330.0 * std::f32::consts::TAU).sin() * amplitude)
        .collect();
    AudioBuffer::new(samples, rate, 1)
}

#[test]
fn stretch_round_trip_preserves_duration() {
    let stretcher = Stretcher::new(0.10);
    let clip = tone(2.0, 0.5);

    for ratio in [0.7, 0.85, 1.2, 1.5] {
        let there = stretcher.stretch(&clip, ratio).unwrap();
        let back = stretcher.stretch(&there, 1.0 / ratio).unwrap();
        let drift = (back.frames() as i64 - clip.frames() as i64).abs();
        assert!(drift <= 2, "ratio {ratio}: drifted {drift} frames");
    }
}

#[test]
fn stretch_keeps_nominal_sample_rate() {
    let stretcher = Stretcher::new(0.10);
    let clip = tone(1.0, 0.5);
    let stretched = stretcher.stretch(&clip, 1.4).unwrap();
    assert_eq!(stretched.sample_rate(), clip.sample_rate());
    assert!((stretched.duration_secs() - 1.0 / 1.4).abs() < 0.01);
}

#[test]
fn normalize_then_normalize_is_stable() {
    let clip = tone(1.0, 0.05);
    let once = normalize_to(&clip, -16.0).unwrap();
    let twice = normalize_to(&once, -16.0).unwrap();
    for (a, b) in once.samples().iter().zip(twice.samples()) {
        assert!((a - b).abs() < 1e-4);
    }
}

#[test]
fn different_input_levels_reach_the_same_level() {
    let quiet = normalize_to(&tone(1.0, 0.02), -16.0).unwrap();
    let loud = normalize_to(&tone(1.0, 0.8), -16.0).unwrap();
    assert!((quiet.rms_dbfs() - loud.rms_dbfs()).abs() < 0.1);
}

#[test]
fn background_endpoints_match_the_knob() {
    let source = tone(1.0, 0.5);

    let untouched = BackgroundBuilder::new(1.0).unwrap().build(&source, 0.0);
    for (a, b) in source.samples().iter().zip(untouched.samples()) {
        assert!((a - b).abs() < 1e-6);
    }

    let buried = BackgroundBuilder::new(0.0).unwrap().build(&source, 0.0);
    // 60 dB down: amplitude divided by 1000.
    for (a, b) in source.samples().iter().zip(buried.samples()) {
        assert!((a / 1000.0 - b).abs() < 1e-6);
    }
}

#[test]
fn decode_matches_direct_wav_read() {
    let dir = std::env::temp_dir().join("redub-int-audio");
    let path = dir.join("decode-me.wav");
    let clip = tone(0.25, 0.3);
    clip.export_wav(&path).unwrap();

    let via_decode = redub_media::decode_audio_file(&path).unwrap();
    let via_buffer = AudioBuffer::from_wav_file(&path).unwrap();
    assert_eq!(via_decode.samples(), via_buffer.samples());
    assert_eq!(via_decode.sample_rate(), via_buffer.sample_rate());
    std::fs::remove_file(&path).ok();
}

#[test]
fn overlay_through_wav_files_round_trips() {
    let dir = std::env::temp_dir().join("redub-int-audio");
    let path = dir.join("clip.wav");
    let clip = tone(0.5, 0.4);
    clip.export_wav(&path).unwrap();

    let mut track = AudioBuffer::silence(2.0, 16_000, 1);
    let loaded = AudioBuffer::from_wav_file(&path).unwrap();
    track.overlay(&loaded, 8_000).unwrap();

    assert_eq!(track.frames(), 32_000);
    // The clip region carries the tone, the rest stays silent.
    assert!(track.slice(8_000, 16_000).unwrap().rms_dbfs() > -20.0);
    assert_eq!(
        track.slice(0, 8_000).unwrap().rms_dbfs(),
        f32::NEG_INFINITY
    );
    std::fs::remove_file(&path).ok();
}
